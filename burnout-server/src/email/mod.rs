//! Email sending abstractions

pub mod console;
pub mod smtp;

pub use console::ConsoleEmailSender;
pub use smtp::{SmtpConfig, SmtpEmailSender};

/// Trait for sending codes and reports by email
pub trait EmailSender: Send + Sync {
    /// Send a one-time verification code
    fn send_code(&self, email: &str, name: &str, code: &str) -> Result<(), String>;

    /// Send the full report
    fn send_report(&self, email: &str, name: &str, report: &str) -> Result<(), String>;
}

/// Allow using Box<dyn EmailSender> as an EmailSender
impl EmailSender for Box<dyn EmailSender> {
    fn send_code(&self, email: &str, name: &str, code: &str) -> Result<(), String> {
        (**self).send_code(email, name, code)
    }

    fn send_report(&self, email: &str, name: &str, report: &str) -> Result<(), String> {
        (**self).send_report(email, name, report)
    }
}

/// Subject and plain-text body of the verification code email
pub fn code_message(name: &str, code: &str, expiry_minutes: i64) -> (&'static str, String) {
    let body = format!(
        "Hello {},\n\n\
         Your verification code for the Burnout Score Checker is: {}\n\n\
         This code will expire in {} minutes.\n\n\
         If you didn't request this code, please ignore this email.",
        name, code, expiry_minutes
    );
    ("Your Burnout Score Checker Verification Code", body)
}

/// Subject and plain-text body of the report email
pub fn report_message(name: &str, report: &str) -> (&'static str, String) {
    let body = format!(
        "Dear {},\n\n\
         Thank you for completing your burnout assessment. Below is your \
         personalized recovery report.\n\n\
         {}\n\n\
         Important: This report is for informational purposes only and is not a \
         substitute for professional medical or psychological advice.",
        name, report
    );
    ("Your Personalized Burnout Recovery Report", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_message_mentions_expiry() {
        let (subject, body) = code_message("Ada", "042042", 10);
        assert!(subject.contains("Verification Code"));
        assert!(body.starts_with("Hello Ada,"));
        assert!(body.contains("042042"));
        assert!(body.contains("expire in 10 minutes"));
    }

    #[test]
    fn test_report_message_embeds_report() {
        let (_, body) = report_message("Ada", "## 1. Introduction");
        assert!(body.contains("## 1. Introduction"));
        assert!(body.contains("not a substitute"));
    }
}
