//! Common test utilities for session machine tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use burnout_core::{score, Assessment, Channel, CompleteAnswers, Registration, SessionId};
use burnout_session::collaborator::CollaboratorResult;
use burnout_session::{Collaborator, CollaboratorError};

pub const SESSION_ID: &str = "session-1";
pub const PAYMENT_URL: &str = "https://pay.example/l/burnout-report?wanted=true";

/// One collaborator operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Register,
    IssueCode(Channel),
    VerifyCode(Channel),
    Submit,
    Redirect,
    Confirm,
    Generate,
    Deliver,
}

/// Collaborator that succeeds unless told otherwise and records every call
#[derive(Default)]
pub struct MockCollaborator {
    calls: Mutex<Vec<Op>>,
    failures: Mutex<HashMap<Op, VecDeque<String>>>,
    stalled: Mutex<Option<Op>>,
}

impl MockCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with `message`
    pub fn fail_next(&self, op: Op, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(message.to_string());
    }

    /// Make every call of `op` hang forever
    pub fn stall(&self, op: Op) {
        *self.stalled.lock().unwrap() = Some(op);
    }

    pub fn calls(&self) -> Vec<Op> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }

    async fn call(&self, op: Op) -> CollaboratorResult<()> {
        self.calls.lock().unwrap().push(op);

        let stalled = *self.stalled.lock().unwrap() == Some(op);
        if stalled {
            std::future::pending::<()>().await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(message) => Err(CollaboratorError::Rejected(message)),
            None => Ok(()),
        }
    }
}

pub fn report_for(session: &SessionId) -> String {
    format!("# Report for {}\nStay <well>.", session)
}

#[async_trait]
impl Collaborator for MockCollaborator {
    async fn register(&self, _registration: &Registration) -> CollaboratorResult<SessionId> {
        self.call(Op::Register).await?;
        Ok(SessionId::new(SESSION_ID))
    }

    async fn issue_code(&self, _session: &SessionId, channel: Channel) -> CollaboratorResult<()> {
        self.call(Op::IssueCode(channel)).await
    }

    async fn verify_code(
        &self,
        _session: &SessionId,
        channel: Channel,
        _code: &str,
    ) -> CollaboratorResult<()> {
        self.call(Op::VerifyCode(channel)).await
    }

    async fn submit_assessment(
        &self,
        _session: &SessionId,
        answers: &CompleteAnswers,
    ) -> CollaboratorResult<Assessment> {
        self.call(Op::Submit).await?;
        let result = score(answers);
        Ok(Assessment {
            insight: result.level.preview().to_string(),
            ..result
        })
    }

    async fn request_payment_redirect(&self, _session: &SessionId) -> CollaboratorResult<String> {
        self.call(Op::Redirect).await?;
        Ok(PAYMENT_URL.to_string())
    }

    async fn confirm_payment(&self, _session: &SessionId) -> CollaboratorResult<()> {
        self.call(Op::Confirm).await
    }

    async fn generate_report(&self, session: &SessionId) -> CollaboratorResult<String> {
        self.call(Op::Generate).await?;
        Ok(report_for(session))
    }

    async fn deliver_report(&self, _session: &SessionId) -> CollaboratorResult<()> {
        self.call(Op::Deliver).await
    }
}

pub fn registration() -> Registration {
    Registration::new("Ada Lovelace", "ada@example.com", "+15551234567")
}
