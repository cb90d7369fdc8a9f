//! Workflow steps and per-session data

use burnout_core::{AnswerSet, Assessment, Channel, SessionId};

/// Where the visitor is in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Registration,
    EmailOtp,
    SecondaryOtp,
    Assessment,
    Preview,
    /// Back from the payment page; confirming and generating the report
    PaymentReturn,
    Report,
}

impl Step {
    /// Channel whose code this step is waiting for
    pub fn code_channel(&self) -> Option<Channel> {
        match self {
            Step::EmailOtp => Some(Channel::Email),
            Step::SecondaryOtp => Some(Channel::Secondary),
            _ => None,
        }
    }

    /// Step reached once the channel's code is verified
    pub fn after_verification(channel: Channel) -> Step {
        match channel {
            Channel::Email => Step::SecondaryOtp,
            Channel::Secondary => Step::Assessment,
        }
    }
}

/// Verification progress for both channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationStatus {
    pub email: bool,
    pub secondary: bool,
}

impl VerificationStatus {
    pub fn is_verified(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::Secondary => self.secondary,
        }
    }

    pub fn mark(&mut self, channel: Channel) {
        match channel {
            Channel::Email => self.email = true,
            Channel::Secondary => self.secondary = true,
        }
    }
}

/// Payment and report progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentRecord {
    /// Payment page, once requested
    pub redirect_url: Option<String>,
    /// Set only by a successful confirmation
    pub confirmed: bool,
    /// Set only after generation
    pub report: Option<String>,
    /// Set only after the report email went out
    pub delivered: bool,
}

/// Everything the controller knows about one visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(crate) id: Option<SessionId>,
    pub full_name: String,
    pub email: String,
    pub secondary_contact: String,
    pub step: Step,
    pub verification: VerificationStatus,
    pub answers: AnswerSet,
    /// Score, level and preview insight from the last successful submission
    pub result: Option<Assessment>,
    pub payment: PaymentRecord,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            id: None,
            full_name: String::new(),
            email: String::new(),
            secondary_contact: String::new(),
            step: Step::Registration,
            verification: VerificationStatus::default(),
            answers: AnswerSet::new(),
            result: None,
            payment: PaymentRecord::default(),
        }
    }

    /// Rebuild the minimum needed to finish payment from a returned identifier
    pub(crate) fn resumed(id: SessionId) -> Self {
        Self {
            id: Some(id),
            step: Step::PaymentReturn,
            ..Self::new()
        }
    }

    /// Identifier assigned at registration; fixed for the session's lifetime
    pub fn id(&self) -> Option<&SessionId> {
        self.id.as_ref()
    }
}
