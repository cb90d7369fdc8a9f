//! Burnout Score Checker session controller
//!
//! Drives one visitor through registration, two-channel code verification,
//! the assessment, payment, and report delivery. Every remote step goes
//! through a [`Collaborator`]; the controller only reacts to outcomes.

pub mod collaborator;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod machine;
pub mod pipeline;
pub mod render;
pub mod resume;
pub mod state;

pub use collaborator::Collaborator;
pub use config::SessionConfig;
pub use error::{CollaboratorError, SessionError};
pub use http::HttpCollaborator;
pub use machine::SessionMachine;
pub use pipeline::Task;
pub use resume::ResumeMarkers;
pub use state::{PaymentRecord, Session, Step};
