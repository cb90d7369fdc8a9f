//! Session controller error types

use burnout_core::ValidationError;
use thiserror::Error;

use crate::state::Step;

/// Failure reported by (or on the way to) a remote collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The collaborator answered and refused; the message is shown verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    TimedOut,

    #[error("Unexpected response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Action not available in the {actual:?} step")]
    InvalidState { actual: Step },

    #[error("A request is already in progress")]
    Busy,

    #[error("{0}")]
    Precondition(&'static str),

    #[error("{0}")]
    Collaborator(#[from] CollaboratorError),
}
