//! Remote-call gates driven by the session machine
//!
//! Each gate wraps one family of collaborator calls with the configured
//! timeout. None of them touch session state; the machine applies outcomes.

use std::time::Duration;

use burnout_core::{Channel, SessionId};

use crate::collaborator::{bounded, Collaborator, CollaboratorResult};

/// One-time code issuance and verification
pub struct VerificationGate<'a, C: ?Sized> {
    collaborator: &'a C,
    timeout: Duration,
}

impl<'a, C: Collaborator + ?Sized> VerificationGate<'a, C> {
    pub fn new(collaborator: &'a C, timeout: Duration) -> Self {
        Self {
            collaborator,
            timeout,
        }
    }

    /// Issue or resend a code. Returns the advisory notice to show.
    pub async fn request_code(
        &self,
        session: &SessionId,
        channel: Channel,
    ) -> CollaboratorResult<String> {
        bounded(self.timeout, self.collaborator.issue_code(session, channel)).await?;
        Ok(format!("Verification code sent to your {}", channel))
    }

    pub async fn verify_code(
        &self,
        session: &SessionId,
        channel: Channel,
        code: &str,
    ) -> CollaboratorResult<()> {
        bounded(
            self.timeout,
            self.collaborator.verify_code(session, channel, code),
        )
        .await
    }
}

/// Payment redirect and confirmation
pub struct PaymentGate<'a, C: ?Sized> {
    collaborator: &'a C,
    timeout: Duration,
}

impl<'a, C: Collaborator + ?Sized> PaymentGate<'a, C> {
    pub fn new(collaborator: &'a C, timeout: Duration) -> Self {
        Self {
            collaborator,
            timeout,
        }
    }

    /// Payment page to navigate to. Navigation itself is the caller's job.
    pub async fn request_redirect(&self, session: &SessionId) -> CollaboratorResult<String> {
        bounded(self.timeout, self.collaborator.request_payment_redirect(session)).await
    }

    pub async fn confirm(&self, session: &SessionId) -> CollaboratorResult<()> {
        bounded(self.timeout, self.collaborator.confirm_payment(session)).await
    }
}

/// Report generation and delivery, after payment is confirmed
pub struct ReportPipeline<'a, C: ?Sized> {
    collaborator: &'a C,
    timeout: Duration,
}

impl<'a, C: Collaborator + ?Sized> ReportPipeline<'a, C> {
    pub fn new(collaborator: &'a C, timeout: Duration) -> Self {
        Self {
            collaborator,
            timeout,
        }
    }

    pub async fn generate(&self, session: &SessionId) -> CollaboratorResult<String> {
        bounded(self.timeout, self.collaborator.generate_report(session)).await
    }

    pub async fn deliver(&self, session: &SessionId) -> CollaboratorResult<()> {
        bounded(self.timeout, self.collaborator.deliver_report(session)).await
    }
}
