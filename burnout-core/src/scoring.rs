//! Answer collection and the burnout score

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::questions::{self, OPTIONS_PER_QUESTION, QUESTIONS};
use crate::ValidationError;

/// Highest possible raw score: seven answers of value 3
pub const MAX_RAW_SCORE: u32 = 21;

/// Qualitative burnout level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    Moderate,
    High,
}

impl Level {
    /// Classify a normalized score. Low is 0..=33, Moderate 34..=66, High above.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=33 => Level::Low,
            34..=66 => Level::Moderate,
            _ => Level::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Moderate => "Moderate",
            Level::High => "High",
        }
    }

    /// Insight shown alongside the score
    pub fn insight(&self) -> &'static str {
        match self {
            Level::Low => {
                "You're managing well! Your burnout risk is low. Keep maintaining healthy \
                 work-life boundaries and continue prioritizing self-care to stay balanced."
            }
            Level::Moderate => {
                "You're showing signs of moderate burnout. Consider taking steps to reduce \
                 stress, set clearer boundaries, and prioritize rest. Small changes now can \
                 prevent bigger issues later."
            }
            Level::High => {
                "Your burnout risk is high. It's important to take action now. Consider \
                 talking to a manager, counselor, or trusted friend. Prioritize rest and \
                 explore ways to reduce your workload or stress."
            }
        }
    }

    /// One-sentence teaser returned before the report is unlocked
    pub fn preview(&self) -> &'static str {
        match self {
            Level::Low => "You're managing well! Your burnout risk is low.",
            Level::Moderate => "You're showing signs of moderate burnout.",
            Level::High => "Your burnout risk is high. It's important to take action now.",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers collected so far, keyed by question id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    answers: BTreeMap<u8, u8>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the answer to a question
    pub fn select(&mut self, question_id: u8, value: u8) -> Result<(), ValidationError> {
        if questions::question(question_id).is_none() {
            return Err(ValidationError::UnknownQuestion(question_id));
        }
        if value as usize >= OPTIONS_PER_QUESTION {
            return Err(ValidationError::InvalidOption {
                question: question_id,
                option: value,
            });
        }
        self.answers.insert(question_id, value);
        Ok(())
    }

    pub fn get(&self, question_id: u8) -> Option<u8> {
        self.answers.get(&question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.answers.len() == questions::count()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Validate that every question is answered
    pub fn complete(&self) -> Result<CompleteAnswers, ValidationError> {
        if !self.is_complete() {
            return Err(ValidationError::IncompleteAnswers {
                answered: self.answers.len(),
                required: questions::count(),
            });
        }

        let mut values = [0u8; 7];
        for (slot, question) in values.iter_mut().zip(QUESTIONS.iter()) {
            // select() only admits known ids, so a full set covers every question
            *slot = self.answers[&question.id];
        }
        Ok(CompleteAnswers { values })
    }
}

impl TryFrom<BTreeMap<u8, u8>> for AnswerSet {
    type Error = ValidationError;

    fn try_from(map: BTreeMap<u8, u8>) -> Result<Self, Self::Error> {
        let mut set = AnswerSet::new();
        for (question_id, value) in map {
            set.select(question_id, value)?;
        }
        Ok(set)
    }
}

/// A fully answered assessment. Only obtainable through [`AnswerSet::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteAnswers {
    values: [u8; 7],
}

impl CompleteAnswers {
    /// Sum of all answer values, 0..=21
    pub fn raw(&self) -> u32 {
        self.values.iter().map(|&v| u32::from(v)).sum()
    }

    /// `(question id, value)` pairs in question order
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        QUESTIONS.iter().zip(self.values.iter()).map(|(q, &v)| (q.id, v))
    }

    /// `(question id, option label)` pairs in question order
    pub fn labels(&self) -> impl Iterator<Item = (u8, &'static str)> + '_ {
        QUESTIONS
            .iter()
            .zip(self.values.iter())
            .map(|(q, &v)| (q.id, q.options[v as usize]))
    }

    pub fn to_map(&self) -> BTreeMap<u8, u8> {
        self.iter().collect()
    }
}

/// Outcome of scoring a complete answer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// Normalized score, 0..=100
    pub score: u8,
    pub level: Level,
    pub insight: String,
}

/// Score a complete answer set.
///
/// `score = round(raw / 21 * 100)`, computed in integers. The quotient never
/// lands on a half for raw values in 1..=20, so rounding direction on ties
/// does not arise.
pub fn score(answers: &CompleteAnswers) -> Assessment {
    let raw = answers.raw();
    let score = ((raw * 200 + MAX_RAW_SCORE) / (2 * MAX_RAW_SCORE)) as u8;
    let level = Level::from_score(score);

    Assessment {
        score,
        level,
        insight: level.insight().to_string(),
    }
}
