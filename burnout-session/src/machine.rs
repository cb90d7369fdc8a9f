//! The session state machine
//!
//! Sole entry point for visitor actions. Each action checks the current
//! step, dispatches to a gate, and applies the outcome: success advances the
//! step, failure leaves it untouched and fills the error slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use burnout_core::{Channel, Registration, SessionId};
use url::Url;

use crate::collaborator::{bounded, Collaborator};
use crate::config::SessionConfig;
use crate::error::{CollaboratorError, SessionError};
use crate::gate::{PaymentGate, ReportPipeline, VerificationGate};
use crate::pipeline::{Pipeline, Task};
use crate::resume::ResumeMarkers;
use crate::state::{Session, Step};

struct Inner {
    session: Session,
    pipeline: Pipeline,
    /// Most recent error; a new one overwrites it
    error: Option<SessionError>,
    /// Transient advisory, e.g. "code sent"
    notice: Option<String>,
}

/// Holds the in-flight flag for the lifetime of one action
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

enum TaskOutput {
    CodeIssued(String),
    Confirmed,
    Report(String),
    Delivered,
}

pub struct SessionMachine<C> {
    collaborator: C,
    config: SessionConfig,
    in_flight: AtomicBool,
    inner: Mutex<Inner>,
}

impl<C: Collaborator> SessionMachine<C> {
    /// Fresh machine at the registration step
    pub fn new(collaborator: C) -> Self {
        Self::with_config(collaborator, SessionConfig::default())
    }

    pub fn with_config(collaborator: C, config: SessionConfig) -> Self {
        Self::build(collaborator, config, Session::new())
    }

    /// Machine rebuilt from a payment return. Starts at `PaymentReturn` with
    /// the confirm, generate, deliver chain queued; call [`run_pending`] to
    /// execute it.
    ///
    /// [`run_pending`]: SessionMachine::run_pending
    pub fn resume(collaborator: C, markers: ResumeMarkers, config: SessionConfig) -> Self {
        tracing::info!(session = %markers.session_id, "Resuming session after payment");
        let machine = Self::build(collaborator, config, Session::resumed(markers.session_id));
        machine.lock().pipeline.extend(Task::RESUME);
        machine
    }

    /// Pick the construction path from the page location
    pub fn from_location(collaborator: C, location: &Url, config: SessionConfig) -> Self {
        match ResumeMarkers::from_url(location) {
            Some(markers) => Self::resume(collaborator, markers, config),
            None => Self::with_config(collaborator, config),
        }
    }

    fn build(collaborator: C, config: SessionConfig, session: Session) -> Self {
        Self {
            collaborator,
            config,
            in_flight: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                session,
                pipeline: Pipeline::default(),
                error: None,
                notice: None,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    pub fn step(&self) -> Step {
        self.lock().session.step
    }

    /// Copy of the current session data
    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.lock().session.id.clone()
    }

    pub fn error(&self) -> Option<SessionError> {
        self.lock().error.clone()
    }

    /// Message for the error slot, as shown to the visitor
    pub fn error_message(&self) -> Option<String> {
        self.lock().error.as_ref().map(ToString::to_string)
    }

    pub fn notice(&self) -> Option<String> {
        self.lock().notice.clone()
    }

    /// Whether a collaborator call is outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().pipeline.is_empty()
    }

    pub fn pending_tasks(&self) -> Vec<Task> {
        self.lock().pipeline.pending().copied().collect()
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Registration → EmailOtp, then issue the email code
    pub async fn register(&self, registration: Registration) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        self.begin();
        self.expect_step(Step::Registration)?;

        if let Err(e) = registration.validate() {
            return self.fail(e.into());
        }

        let outcome = bounded(
            self.config.call_timeout,
            self.collaborator.register(&registration),
        )
        .await;

        match outcome {
            Ok(id) => {
                tracing::info!(session = %id, "Registered");
                let mut inner = self.lock();
                let session = &mut inner.session;
                session.id = Some(id);
                session.full_name = registration.full_name;
                session.email = registration.email;
                session.secondary_contact = registration.secondary_contact;
                Self::advance(&mut inner, Step::EmailOtp);
                inner.pipeline.push(Task::IssueCode(Channel::Email));
            }
            Err(e) => return self.fail(e.into()),
        }

        self.drain().await
    }

    /// Resend the code for the channel currently being verified
    pub async fn resend_code(&self) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        self.begin();
        let (id, channel) = self.code_step()?;

        match self.verification().request_code(&id, channel).await {
            Ok(notice) => {
                self.lock().notice = Some(notice);
                Ok(())
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Verify the code for the current channel. Email success moves on to the
    /// secondary channel and issues its code; secondary success unlocks the
    /// assessment.
    pub async fn verify_code(&self, code: &str) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        self.begin();
        let (id, channel) = self.code_step()?;

        if let Err(e) = self.verification().verify_code(&id, channel, code).await {
            return self.fail(e.into());
        }

        {
            let mut inner = self.lock();
            inner.session.verification.mark(channel);
            Self::advance(&mut inner, Step::after_verification(channel));
            if let Some(next) = channel.next() {
                inner.pipeline.push(Task::IssueCode(next));
            }
        }

        self.drain().await
    }

    /// Record an answer. Local only; nothing is sent until submission.
    pub fn select_answer(&self, question_id: u8, value: u8) -> Result<(), SessionError> {
        self.expect_step(Step::Assessment)?;
        let selected = self.lock().session.answers.select(question_id, value);
        selected.or_else(|e| self.fail(e.into()))
    }

    /// Assessment → Preview. Incomplete answers are rejected locally.
    pub async fn submit_assessment(&self) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        self.begin();
        let id = self.expect(Step::Assessment)?;

        let answers = self.lock().session.answers.complete();
        let answers = match answers {
            Ok(answers) => answers,
            Err(e) => return self.fail(e.into()),
        };

        let outcome = bounded(
            self.config.call_timeout,
            self.collaborator.submit_assessment(&id, &answers),
        )
        .await;

        match outcome {
            Ok(result) => {
                tracing::info!(session = %id, score = result.score, level = %result.level, "Assessment scored");
                let mut inner = self.lock();
                inner.session.result = Some(result);
                Self::advance(&mut inner, Step::Preview);
                Ok(())
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Request the payment page. The step does not change; the caller
    /// navigates to the returned URL and the workflow continues on return.
    pub async fn unlock_report(&self) -> Result<String, SessionError> {
        let _guard = self.acquire()?;
        self.begin();
        let id = self.expect(Step::Preview)?;

        match self.payment().request_redirect(&id).await {
            Ok(url) => {
                tracing::info!(session = %id, "Payment redirect obtained");
                self.lock().session.payment.redirect_url = Some(url.clone());
                Ok(url)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Run whatever the constructor or a previous transition queued
    pub async fn run_pending(&self) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        self.begin();
        self.drain().await
    }

    /// Re-run the payment chain after a failed resumption
    pub async fn retry_resume(&self) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        self.begin();
        self.expect(Step::PaymentReturn)?;

        {
            let mut inner = self.lock();
            inner.pipeline.abort();
            if inner.session.payment.confirmed {
                inner.pipeline.extend([Task::GenerateReport, Task::DeliverReport]);
            } else {
                inner.pipeline.extend(Task::RESUME);
            }
        }

        self.drain().await
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn acquire(&self) -> Result<InFlight<'_>, SessionError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::Busy)?;
        Ok(InFlight(&self.in_flight))
    }

    /// Start of a dispatched action: clear the previous outcome
    fn begin(&self) {
        let mut inner = self.lock();
        inner.error = None;
        inner.notice = None;
    }

    fn fail<T>(&self, err: SessionError) -> Result<T, SessionError> {
        let mut inner = self.lock();
        tracing::warn!(step = ?inner.session.step, error = %err, "Session action failed");
        inner.error = Some(err.clone());
        Err(err)
    }

    fn expect_step(&self, step: Step) -> Result<(), SessionError> {
        let actual = self.step();
        if actual != step {
            return self.fail(SessionError::InvalidState { actual });
        }
        Ok(())
    }

    /// Check the step and return the session identifier
    fn expect(&self, step: Step) -> Result<SessionId, SessionError> {
        let (actual, id) = {
            let inner = self.lock();
            (inner.session.step, inner.session.id.clone())
        };
        match id {
            Some(id) if actual == step => Ok(id),
            _ => self.fail(SessionError::InvalidState { actual }),
        }
    }

    fn code_step(&self) -> Result<(SessionId, Channel), SessionError> {
        let (step, id) = {
            let inner = self.lock();
            (inner.session.step, inner.session.id.clone())
        };
        match (step.code_channel(), id) {
            (Some(channel), Some(id)) => Ok((id, channel)),
            _ => self.fail(SessionError::InvalidState { actual: step }),
        }
    }

    fn advance(inner: &mut Inner, to: Step) {
        tracing::debug!(from = ?inner.session.step, to = ?to, "Session step changed");
        inner.session.step = to;
    }

    fn verification(&self) -> VerificationGate<'_, C> {
        VerificationGate::new(&self.collaborator, self.config.call_timeout)
    }

    fn payment(&self) -> PaymentGate<'_, C> {
        PaymentGate::new(&self.collaborator, self.config.call_timeout)
    }

    fn reports(&self) -> ReportPipeline<'_, C> {
        ReportPipeline::new(&self.collaborator, self.config.call_timeout)
    }

    /// Execute queued tasks in order. A failed task that is not best-effort
    /// drops the rest of the queue.
    async fn drain(&self) -> Result<(), SessionError> {
        loop {
            let (task, id) = {
                let mut inner = self.lock();
                let Some(task) = inner.pipeline.next() else {
                    return Ok(());
                };
                (task, inner.session.id.clone())
            };

            let Some(id) = id else {
                self.lock().pipeline.abort();
                return self.fail(SessionError::Precondition("No session identifier"));
            };

            if let Err(e) = self.check_precondition(task) {
                self.lock().pipeline.abort();
                return self.fail(e);
            }

            match self.execute(task, &id).await {
                Ok(output) => self.apply(output),
                Err(e) if task.is_best_effort() => {
                    tracing::warn!(session = %id, ?task, error = %e, "Best-effort task failed");
                    self.lock().error = Some(e.into());
                }
                Err(e) => {
                    let dropped = self.lock().pipeline.abort();
                    tracing::debug!(?task, dropped, "Pipeline stopped");
                    return self.fail(e.into());
                }
            }
        }
    }

    fn check_precondition(&self, task: Task) -> Result<(), SessionError> {
        let inner = self.lock();
        let payment = &inner.session.payment;
        match task {
            Task::GenerateReport if !payment.confirmed => {
                Err(SessionError::Precondition("Payment has not been confirmed"))
            }
            Task::DeliverReport if payment.report.is_none() => {
                Err(SessionError::Precondition("Report has not been generated"))
            }
            _ => Ok(()),
        }
    }

    async fn execute(&self, task: Task, id: &SessionId) -> Result<TaskOutput, CollaboratorError> {
        match task {
            Task::IssueCode(channel) => self
                .verification()
                .request_code(id, channel)
                .await
                .map(TaskOutput::CodeIssued),
            Task::ConfirmPayment => self.payment().confirm(id).await.map(|_| TaskOutput::Confirmed),
            Task::GenerateReport => self.reports().generate(id).await.map(TaskOutput::Report),
            Task::DeliverReport => self.reports().deliver(id).await.map(|_| TaskOutput::Delivered),
        }
    }

    fn apply(&self, output: TaskOutput) {
        let mut inner = self.lock();
        match output {
            TaskOutput::CodeIssued(notice) => inner.notice = Some(notice),
            TaskOutput::Confirmed => {
                tracing::info!("Payment confirmed");
                inner.session.payment.confirmed = true;
            }
            TaskOutput::Report(content) => {
                inner.session.payment.report = Some(content);
                Self::advance(&mut inner, Step::Report);
            }
            TaskOutput::Delivered => {
                tracing::info!("Report delivered");
                inner.session.payment.delivered = true;
                inner.notice = Some("Report sent to your email".to_string());
            }
        }
    }
}
