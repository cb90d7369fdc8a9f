//! The remote collaborator contract
//!
//! Each method is one remote call. Implementations report any non-success
//! outcome as a [`CollaboratorError`]; the controller never retries.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use burnout_core::{Assessment, Channel, CompleteAnswers, Registration, SessionId};

use crate::error::CollaboratorError;

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Create a session for the visitor
    async fn register(&self, registration: &Registration) -> CollaboratorResult<SessionId>;

    /// Issue (or re-issue) a one-time code on a channel
    async fn issue_code(&self, session: &SessionId, channel: Channel) -> CollaboratorResult<()>;

    /// Check a submitted one-time code
    async fn verify_code(
        &self,
        session: &SessionId,
        channel: Channel,
        code: &str,
    ) -> CollaboratorResult<()>;

    /// Score the answers; `insight` carries the preview text
    async fn submit_assessment(
        &self,
        session: &SessionId,
        answers: &CompleteAnswers,
    ) -> CollaboratorResult<Assessment>;

    /// Obtain the payment page to navigate to
    async fn request_payment_redirect(&self, session: &SessionId) -> CollaboratorResult<String>;

    async fn confirm_payment(&self, session: &SessionId) -> CollaboratorResult<()>;

    /// Produce the full report content
    async fn generate_report(&self, session: &SessionId) -> CollaboratorResult<String>;

    /// Send the report to the visitor's email
    async fn deliver_report(&self, session: &SessionId) -> CollaboratorResult<()>;
}

/// Allow sharing one collaborator between machines via `Arc`
#[async_trait]
impl<C: Collaborator + ?Sized> Collaborator for std::sync::Arc<C> {
    async fn register(&self, registration: &Registration) -> CollaboratorResult<SessionId> {
        (**self).register(registration).await
    }

    async fn issue_code(&self, session: &SessionId, channel: Channel) -> CollaboratorResult<()> {
        (**self).issue_code(session, channel).await
    }

    async fn verify_code(
        &self,
        session: &SessionId,
        channel: Channel,
        code: &str,
    ) -> CollaboratorResult<()> {
        (**self).verify_code(session, channel, code).await
    }

    async fn submit_assessment(
        &self,
        session: &SessionId,
        answers: &CompleteAnswers,
    ) -> CollaboratorResult<Assessment> {
        (**self).submit_assessment(session, answers).await
    }

    async fn request_payment_redirect(&self, session: &SessionId) -> CollaboratorResult<String> {
        (**self).request_payment_redirect(session).await
    }

    async fn confirm_payment(&self, session: &SessionId) -> CollaboratorResult<()> {
        (**self).confirm_payment(session).await
    }

    async fn generate_report(&self, session: &SessionId) -> CollaboratorResult<String> {
        (**self).generate_report(session).await
    }

    async fn deliver_report(&self, session: &SessionId) -> CollaboratorResult<()> {
        (**self).deliver_report(session).await
    }
}

/// Run a collaborator call with an upper bound on how long it may take
pub async fn bounded<T, F>(limit: Duration, call: F) -> CollaboratorResult<T>
where
    F: Future<Output = CollaboratorResult<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(CollaboratorError::TimedOut))
}
