//! Validation errors shared by client and server

use thiserror::Error;

/// A local precondition failure. These never reach a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown question {0}")]
    UnknownQuestion(u8),

    #[error("Invalid option {option} for question {question}")]
    InvalidOption { question: u8, option: u8 },

    #[error("All {required} questions must be answered ({answered} answered)")]
    IncompleteAnswers { answered: usize, required: usize },

    #[error("Full name must be between 2 and 100 characters")]
    InvalidName,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Mobile number must be between 10 and 15 characters")]
    InvalidMobile,

    #[error("Invalid verification channel: {0}")]
    InvalidChannel(String),
}
