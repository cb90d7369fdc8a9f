//! Text rendering helpers for the presentation layer

use burnout_core::Question;

/// Render report text as HTML. The text is untrusted: it is escaped before
/// newlines become `<br>` tags.
pub fn report_html(content: &str) -> String {
    let escaped = html_escape::encode_text(content);
    escaped.replace("\r\n", "\n").replace('\n', "<br>")
}

/// Numbered heading for a question, e.g. "1. How often ...?"
pub fn question_heading(index: usize, question: &Question) -> String {
    format!("{}. {}", index + 1, question.prompt)
}
