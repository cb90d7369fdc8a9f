//! Storage abstractions for the server

pub mod memory;
pub mod models;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use models::*;
pub use sqlite::SqliteStore;

use burnout_core::{Channel, SessionId};

use crate::error::ServerError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, ServerError>;

/// Trait for session, code, assessment and report storage
pub trait Store: Send + Sync {
    /// Insert a new session
    fn create_session(&self, session: &SessionRecord) -> StoreResult<()>;

    /// Get a session by ID
    fn get_session(&self, id: &SessionId) -> StoreResult<Option<SessionRecord>>;

    /// Overwrite the progress flags of an existing session
    fn update_session(&self, session: &SessionRecord) -> StoreResult<()>;

    /// Read and rewrite the live code for a session and channel as one step.
    ///
    /// `update` sees the current record and returns what to do with it plus a
    /// value handed back to the caller. No other code operation on the same
    /// store interleaves with it.
    fn update_otp<T, F>(&self, id: &SessionId, channel: Channel, update: F) -> StoreResult<T>
    where
        F: FnOnce(Option<&OtpRecord>) -> (OtpWrite, T);

    /// Get the live code for a session and channel
    fn get_otp(&self, id: &SessionId, channel: Channel) -> StoreResult<Option<OtpRecord>>;

    /// Store an assessment, replacing any previous one
    fn put_assessment(&self, assessment: &AssessmentRecord) -> StoreResult<()>;

    fn get_assessment(&self, id: &SessionId) -> StoreResult<Option<AssessmentRecord>>;

    /// Store a report, replacing any previous one
    fn put_report(&self, report: &ReportRecord) -> StoreResult<()>;

    fn get_report(&self, id: &SessionId) -> StoreResult<Option<ReportRecord>>;

    /// Record that the report went out by email
    fn mark_report_sent(&self, id: &SessionId) -> StoreResult<()>;

    /// Delete sessions older than the given age together with everything they
    /// own. Returns the number of sessions removed.
    fn cleanup_expired_sessions(&self, max_age_hours: i64) -> StoreResult<u64>;
}
