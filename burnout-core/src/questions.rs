//! The fixed question bank
//!
//! Seven questions, each with four mutually exclusive options. An option's
//! index is its value: 0 is the weakest burnout indicator, 3 the strongest.

use serde::Serialize;

/// Number of options every question offers
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A single assessment question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    /// Stable identifier, 1..=7
    pub id: u8,
    pub prompt: &'static str,
    /// Option labels ordered by value
    pub options: [&'static str; OPTIONS_PER_QUESTION],
}

impl Question {
    /// Label for an option value, if it exists
    pub fn option_label(&self, value: u8) -> Option<&'static str> {
        self.options.get(value as usize).copied()
    }
}

const FREQUENCY: [&str; OPTIONS_PER_QUESTION] = ["Never", "Sometimes", "Often", "Always"];

pub static QUESTIONS: [Question; 7] = [
    Question {
        id: 1,
        prompt: "How often do you feel mentally exhausted after work?",
        options: FREQUENCY,
    },
    Question {
        id: 2,
        prompt: "How frequently do you think about work outside of work hours?",
        options: FREQUENCY,
    },
    Question {
        id: 3,
        prompt: "How would you describe your motivation level in the morning?",
        options: ["High and energized", "Moderate", "Low", "Very low or none"],
    },
    Question {
        id: 4,
        prompt: "How often do you feel overwhelmed by your tasks?",
        options: FREQUENCY,
    },
    Question {
        id: 5,
        prompt: "How satisfied are you with your work-life balance?",
        options: [
            "Very satisfied",
            "Somewhat satisfied",
            "Not very satisfied",
            "Not satisfied at all",
        ],
    },
    Question {
        id: 6,
        prompt: "How would you rate your sleep quality on workdays?",
        options: ["Excellent", "Good", "Poor", "Very poor"],
    },
    Question {
        id: 7,
        prompt: "Do you find meaning and purpose in your work?",
        // Reverse-keyed: finding meaning "Always" is the healthy answer
        options: ["Always", "Often", "Sometimes", "Never"],
    },
];

/// Number of questions in the bank
pub fn count() -> usize {
    QUESTIONS.len()
}

/// Look up a question by id
pub fn question(id: u8) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// Label for an answer, or `None` if the question or option is unknown
pub fn answer_label(question_id: u8, value: u8) -> Option<&'static str> {
    question(question_id).and_then(|q| q.option_label(value))
}
