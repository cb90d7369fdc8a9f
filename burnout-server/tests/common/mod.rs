//! Common test utilities for API integration tests

#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum_test::TestServer;
use burnout_server::report::ReportInput;
use burnout_server::{
    routes, AppState, Config, EmailSender, InMemoryStore, ReportGenerator, SmsSender, Store,
    TemplateReportGenerator,
};
use serde_json::{json, Value};

/// Answers scoring 48 (Moderate)
pub const MODERATE_ANSWERS: [(u8, u8); 7] = [(1, 1), (2, 2), (3, 1), (4, 2), (5, 1), (6, 2), (7, 1)];

/// Mock email sender that captures codes and reports
#[derive(Default, Clone)]
pub struct MockEmailSender {
    /// Captured (email, code) pairs
    pub codes: Arc<RwLock<Vec<(String, String)>>>,
    /// Captured (email, report) pairs
    pub reports: Arc<RwLock<Vec<(String, String)>>>,
    /// When set, every send fails with this message
    pub failure: Arc<RwLock<Option<String>>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the last code sent to an email
    pub fn get_code(&self, email: &str) -> Option<String> {
        self.codes
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(e, _)| e == email)
            .map(|(_, c)| c.clone())
    }

    pub fn code_count(&self) -> usize {
        self.codes.read().unwrap().len()
    }

    pub fn report_count(&self) -> usize {
        self.reports.read().unwrap().len()
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.write().unwrap() = Some(message.to_string());
    }

    fn check_failure(&self) -> Result<(), String> {
        match self.failure.read().unwrap().as_ref() {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }
}

impl EmailSender for MockEmailSender {
    fn send_code(&self, email: &str, _name: &str, code: &str) -> Result<(), String> {
        self.check_failure()?;
        self.codes
            .write()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }

    fn send_report(&self, email: &str, _name: &str, report: &str) -> Result<(), String> {
        self.check_failure()?;
        self.reports
            .write()
            .unwrap()
            .push((email.to_string(), report.to_string()));
        Ok(())
    }
}

/// Mock SMS sender that captures codes
#[derive(Default, Clone)]
pub struct MockSmsSender {
    /// Captured (number, code) pairs
    pub sent: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the last code sent to a number
    pub fn get_code(&self, number: &str) -> Option<String> {
        self.sent
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(n, _)| n == number)
            .map(|(_, c)| c.clone())
    }
}

impl SmsSender for MockSmsSender {
    fn send_code(&self, number: &str, code: &str) -> Result<(), String> {
        self.sent
            .write()
            .unwrap()
            .push((number.to_string(), code.to_string()));
        Ok(())
    }
}

/// Generator returning fixed content, or failing
pub struct StubGenerator {
    pub result: Result<String, String>,
    pub calls: Arc<RwLock<usize>>,
}

impl StubGenerator {
    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn returning(content: &str) -> Self {
        Self {
            result: Ok(content.to_string()),
            calls: Arc::default(),
        }
    }
}

impl ReportGenerator for StubGenerator {
    fn generate(&self, _input: &ReportInput) -> Result<String, String> {
        *self.calls.write().unwrap() += 1;
        self.result.clone()
    }
}

/// Server under test plus the captured side effects
pub struct TestApp {
    pub server: TestServer,
    pub email: MockEmailSender,
    pub sms: MockSmsSender,
}

/// Create a test server with in-memory storage and template reports
pub fn create_test_server() -> TestApp {
    create_test_server_with(
        Config::default(),
        InMemoryStore::new(),
        Arc::new(TemplateReportGenerator::new()),
    )
}

/// Create a test server around the given parts
pub fn create_test_server_with<S: Store + 'static>(
    config: Config,
    store: S,
    report_generator: Arc<dyn ReportGenerator>,
) -> TestApp {
    let email = MockEmailSender::new();
    let sms = MockSmsSender::new();

    let state = Arc::new(AppState::new(
        config,
        store,
        email.clone(),
        Box::new(sms.clone()),
        report_generator,
    ));

    let app = routes::create_router(state);
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp { server, email, sms }
}

pub const EMAIL: &str = "ada@example.com";
pub const MOBILE: &str = "+15551234567";

/// Register a visitor and return the session id
pub async fn register(app: &TestApp) -> String {
    let response = app
        .server
        .post("/api/register")
        .json(&json!({
            "full_name": "Ada Lovelace",
            "email": EMAIL,
            "mobile": MOBILE,
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    body["session_id"]
        .as_str()
        .expect("No session id")
        .to_string()
}

/// Send a code for `channel` and return the response body
pub async fn send_code(app: &TestApp, session_id: &str, channel: &str) -> (u16, Value) {
    let response = app
        .server
        .post("/api/otp/send")
        .json(&json!({ "session_id": session_id, "otp_type": channel }))
        .await;
    (response.status_code().as_u16(), response.json())
}

/// Submit a code for `channel` and return the response body
pub async fn verify_code(
    app: &TestApp,
    session_id: &str,
    channel: &str,
    code: &str,
) -> (u16, Value) {
    let response = app
        .server
        .post("/api/otp/verify")
        .json(&json!({
            "session_id": session_id,
            "otp_type": channel,
            "otp_code": code,
        }))
        .await;
    (response.status_code().as_u16(), response.json())
}

/// Last code delivered on `channel`
pub fn last_code(app: &TestApp, channel: &str) -> String {
    match channel {
        "email" => app.email.get_code(EMAIL),
        _ => app.sms.get_code(MOBILE),
    }
    .expect("No code sent")
}

/// Send and verify a code on `channel`
pub async fn verify_channel(app: &TestApp, session_id: &str, channel: &str) {
    let (status, _) = send_code(app, session_id, channel).await;
    assert_eq!(status, 200);
    let code = last_code(app, channel);
    let (status, _) = verify_code(app, session_id, channel, &code).await;
    assert_eq!(status, 200);
}

/// Registered session with both channels verified
pub async fn verified_session(app: &TestApp) -> String {
    let session_id = register(app).await;
    verify_channel(app, &session_id, "email").await;
    verify_channel(app, &session_id, "mobile").await;
    session_id
}

pub fn answers_json(answers: &[(u8, u8)]) -> Value {
    Value::Object(
        answers
            .iter()
            .map(|(id, value)| (id.to_string(), json!(value)))
            .collect(),
    )
}

/// Submit answers and return the status and body
pub async fn submit(app: &TestApp, session_id: &str, answers: &[(u8, u8)]) -> (u16, Value) {
    let response = app
        .server
        .post("/api/assessment/submit")
        .json(&json!({ "session_id": session_id, "answers": answers_json(answers) }))
        .await;
    (response.status_code().as_u16(), response.json())
}

/// Verified session with the moderate answers submitted
pub async fn assessed_session(app: &TestApp) -> String {
    let session_id = verified_session(app).await;
    let (status, _) = submit(app, &session_id, &MODERATE_ANSWERS).await;
    assert_eq!(status, 200);
    session_id
}

/// POST a `{session_id}` body and return the status and body
pub async fn post_session(app: &TestApp, path: &str, session_id: &str) -> (u16, Value) {
    let response = app
        .server
        .post(path)
        .json(&json!({ "session_id": session_id }))
        .await;
    (response.status_code().as_u16(), response.json())
}

/// Assessed session with payment confirmed
pub async fn paid_session(app: &TestApp) -> String {
    let session_id = assessed_session(app).await;
    let (status, _) = post_session(app, "/api/payment/confirm", &session_id).await;
    assert_eq!(status, 200);
    session_id
}
