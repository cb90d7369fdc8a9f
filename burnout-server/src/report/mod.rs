//! Full report generation
//!
//! A report is markdown with eight numbered sections, addressed to the
//! visitor by first name and built from their score, level and answers.

pub mod chat;
pub mod template;

use std::collections::BTreeMap;

use burnout_core::questions;
use burnout_core::registration::first_name;
use burnout_core::Level;

use crate::store::{AssessmentRecord, SessionRecord};

pub use chat::{ChatConfig, ChatReportGenerator};
pub use template::TemplateReportGenerator;

/// Section titles every report carries, in order
pub const SECTIONS: [&str; 8] = [
    "Introduction",
    "Understanding Your Burnout Level",
    "Key Burnout Drivers",
    "Your Recovery Focus",
    "14-Day Recovery Action Plan",
    "Work-Life Boundary Recommendations",
    "Sustainable Habits to Prevent Relapse",
    "Closing Message",
];

/// Short description of each question, by id
pub const TOPICS: [(u8, &str); 7] = [
    (1, "Mental exhaustion after work"),
    (2, "Thinking about work outside hours"),
    (3, "Morning motivation level"),
    (4, "Feeling overwhelmed by tasks"),
    (5, "Work-life balance satisfaction"),
    (6, "Sleep quality on workdays"),
    (7, "Sense of meaning in work"),
];

const MIN_REPORT_LENGTH: usize = 500;
const MIN_SECTIONS_PRESENT: usize = 6;

/// Everything a generator needs about one visitor
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInput {
    pub first_name: String,
    pub score: u8,
    pub level: Level,
    /// Chosen option label per question id
    pub answers: BTreeMap<u8, String>,
}

impl ReportInput {
    pub fn new(session: &SessionRecord, assessment: &AssessmentRecord) -> Self {
        Self {
            first_name: first_name(&session.full_name).to_string(),
            score: assessment.score,
            level: assessment.level,
            answers: assessment.answers.clone(),
        }
    }

    pub fn answer(&self, question_id: u8) -> &str {
        self.answers
            .get(&question_id)
            .map(String::as_str)
            .unwrap_or("Not answered")
    }

    /// Answers that point to burnout (option value 2 or 3), strongest first
    pub fn drivers(&self) -> Vec<(&'static str, &str)> {
        let mut drivers: Vec<(u8, &'static str, &str)> = TOPICS
            .iter()
            .filter_map(|(id, topic)| {
                let label = self.answers.get(id)?;
                let value = questions::question(*id)?
                    .options
                    .iter()
                    .position(|o| o == label)? as u8;
                (value >= 2).then_some((value, *topic, label.as_str()))
            })
            .collect();
        drivers.sort_by(|a, b| b.0.cmp(&a.0));
        drivers
            .into_iter()
            .map(|(_, topic, label)| (topic, label))
            .collect()
    }
}

/// Trait for producing report content
pub trait ReportGenerator: Send + Sync {
    /// Generate the markdown report, or a message saying why it failed
    fn generate(&self, input: &ReportInput) -> Result<String, String>;
}

/// Minimum quality bar for generated content: long enough and carrying most
/// of the section titles (case-insensitive)
pub fn validate_report_content(content: &str) -> bool {
    if content.len() < MIN_REPORT_LENGTH {
        return false;
    }

    let lower = content.to_lowercase();
    let found = SECTIONS
        .iter()
        .filter(|title| lower.contains(&title.to_lowercase()))
        .count();

    found >= MIN_SECTIONS_PRESENT
}
