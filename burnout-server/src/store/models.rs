//! Data models for server storage

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use burnout_core::{Channel, Level, Registration, SessionId};

/// Where a session stands in the workflow, as reported by the status endpoint.
/// Variants are ordered by workflow position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Progress {
    EmailVerification,
    MobileVerification,
    Assessment,
    Payment,
    ReportGeneration,
    ReportDelivery,
}

impl Progress {
    pub fn as_str(&self) -> &'static str {
        match self {
            Progress::EmailVerification => "email_verification",
            Progress::MobileVerification => "mobile_verification",
            Progress::Assessment => "assessment",
            Progress::Payment => "payment",
            Progress::ReportGeneration => "report_generation",
            Progress::ReportDelivery => "report_delivery",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "email_verification" => Some(Progress::EmailVerification),
            "mobile_verification" => Some(Progress::MobileVerification),
            "assessment" => Some(Progress::Assessment),
            "payment" => Some(Progress::Payment),
            "report_generation" => Some(Progress::ReportGeneration),
            "report_delivery" => Some(Progress::ReportDelivery),
            _ => None,
        }
    }
}

/// One visitor's session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub email_verified: bool,
    pub mobile_verified: bool,
    pub assessment_completed: bool,
    pub payment_completed: bool,
    pub report_generated: bool,
    pub step: Progress,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Freshly registered session awaiting email verification
    pub fn new(id: SessionId, registration: &Registration) -> Self {
        Self {
            id,
            full_name: registration.full_name.trim().to_string(),
            email: registration.email.trim().to_string(),
            mobile: registration.secondary_contact.trim().to_string(),
            email_verified: false,
            mobile_verified: false,
            assessment_completed: false,
            payment_completed: false,
            report_generated: false,
            step: Progress::EmailVerification,
            created_at: Utc::now(),
        }
    }

    /// Address a code for `channel` is sent to
    pub fn target(&self, channel: Channel) -> &str {
        match channel {
            Channel::Email => &self.email,
            Channel::Secondary => &self.mobile,
        }
    }

    pub fn mark_verified(&mut self, channel: Channel) {
        match channel {
            Channel::Email => self.email_verified = true,
            Channel::Secondary => self.mobile_verified = true,
        }

        // Verification never moves a session back, and mobile alone does not
        // unlock the assessment
        let reached = match (self.email_verified, self.mobile_verified) {
            (true, true) => Progress::Assessment,
            (true, false) => Progress::MobileVerification,
            (false, _) => Progress::EmailVerification,
        };
        self.step = self.step.max(reached);
    }
}

/// The live one-time code for a (session, channel) pair
#[derive(Debug, Clone, PartialEq)]
pub struct OtpRecord {
    pub session_id: SessionId,
    pub channel: Channel,
    pub code: String,
    /// Email address or mobile number the code went to
    pub target: String,
    pub verified: bool,
    pub attempts: u32,
    /// Issuances after the first one
    pub resend_count: u32,
    pub created_at: DateTime<Utc>,
}

/// What [`Store::update_otp`](super::Store::update_otp) does with the record
#[derive(Debug, Clone, PartialEq)]
pub enum OtpWrite {
    Keep,
    Put(OtpRecord),
    Remove,
}

/// Scored assessment with the chosen option labels
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRecord {
    pub session_id: SessionId,
    pub answers: BTreeMap<u8, String>,
    pub score: u8,
    pub level: Level,
    pub created_at: DateTime<Utc>,
}

/// A generated report and its delivery state
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub session_id: SessionId,
    pub content: String,
    pub email_sent: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ReportRecord {
    pub fn new(session_id: SessionId, content: String) -> Self {
        Self {
            session_id,
            content,
            email_sent: false,
            email_sent_at: None,
            created_at: Utc::now(),
        }
    }
}
