//! One-time code issuance and checking

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use burnout_core::{Channel, SessionId};

use crate::error::ServerError;
use crate::store::OtpRecord;

/// Failed guesses allowed against one code
pub const MAX_VERIFY_ATTEMPTS: u32 = 5;

/// Generate a random 6-digit code, leading zeros included
pub fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// Generate an opaque session identifier
pub fn generate_session_id() -> SessionId {
    SessionId::new(uuid::Uuid::new_v4().to_string())
}

/// Expiry and resend limits
#[derive(Debug, Clone, Copy)]
pub struct OtpPolicy {
    pub expiry_minutes: i64,
    pub max_resend_attempts: u32,
}

/// Why a submitted code was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotFound,
    AlreadyUsed,
    Expired,
    TooManyAttempts,
    /// Wrong code; the record's attempt counter must be incremented
    Mismatch,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::NotFound => "OTP not found. Please request a new one.",
            Rejection::AlreadyUsed => "OTP already used. Please request a new one.",
            Rejection::Expired => "OTP expired. Please request a new one.",
            Rejection::TooManyAttempts => "Too many failed attempts. Please request a new one.",
            Rejection::Mismatch => "Invalid OTP. Please try again.",
        }
    }
}

impl From<Rejection> for ServerError {
    fn from(r: Rejection) -> Self {
        ServerError::CodeRejected(r.message().to_string())
    }
}

impl OtpPolicy {
    /// Build the record replacing `existing`. The resend counter carries
    /// over so the limit holds across replacements.
    pub fn issue(
        &self,
        existing: Option<&OtpRecord>,
        session_id: &SessionId,
        channel: Channel,
        target: &str,
    ) -> Result<OtpRecord, ServerError> {
        let resend_count = match existing {
            Some(previous) if previous.resend_count >= self.max_resend_attempts => {
                return Err(ServerError::CodeRejected(format!(
                    "Maximum resend limit ({}) reached. Please try again later.",
                    self.max_resend_attempts
                )));
            }
            Some(previous) => previous.resend_count + 1,
            None => 0,
        };

        Ok(OtpRecord {
            session_id: session_id.clone(),
            channel,
            code: generate_code(),
            target: target.to_string(),
            verified: false,
            attempts: 0,
            resend_count,
            created_at: Utc::now(),
        })
    }

    /// Check a submitted code. Checks run in a fixed order and the first
    /// failing one wins.
    pub fn check(
        &self,
        record: Option<&OtpRecord>,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        let record = record.ok_or(Rejection::NotFound)?;

        if record.verified {
            return Err(Rejection::AlreadyUsed);
        }
        if now > record.created_at + Duration::minutes(self.expiry_minutes) {
            return Err(Rejection::Expired);
        }
        if record.attempts >= MAX_VERIFY_ATTEMPTS {
            return Err(Rejection::TooManyAttempts);
        }
        if record.code != code.trim() {
            return Err(Rejection::Mismatch);
        }
        Ok(())
    }
}
