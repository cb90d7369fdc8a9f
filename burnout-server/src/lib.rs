//! Burnout Score Checker API
//!
//! Backend for the session controller: registration, two-channel one-time
//! codes, assessment scoring, the payment gate, and report generation and
//! delivery.

pub mod config;
pub mod email;
pub mod error;
pub mod otp;
pub mod report;
pub mod routes;
pub mod sms;
pub mod state;
pub mod store;

pub use config::Config;
pub use email::{ConsoleEmailSender, EmailSender, SmtpConfig, SmtpEmailSender};
pub use error::ServerError;
pub use report::{ChatConfig, ChatReportGenerator, ReportGenerator, TemplateReportGenerator};
pub use sms::{ConsoleSmsSender, SmsSender};
pub use state::AppState;
pub use store::{InMemoryStore, SqliteStore, Store};
