//! Burnout Score Checker Core Library
//!
//! Domain types shared by the session controller and the backend:
//! - A fixed bank of seven questions with four graded options each
//! - Answer collection and the pure scoring function
//! - Registration validation and the JSON wire format of the API

pub mod api;
pub mod error;
pub mod model;
pub mod questions;
pub mod registration;
pub mod scoring;

pub use error::ValidationError;
pub use model::{Channel, SessionId};
pub use questions::{Question, QUESTIONS};
pub use registration::Registration;
pub use scoring::{score, AnswerSet, Assessment, CompleteAnswers, Level};
