//! HTTP collaborator tests
//!
//! Each test stands up a mock backend and checks the request the collaborator
//! sends and how it reads success and failure bodies.

use std::net::TcpListener;
use std::time::Duration;

use burnout_core::{AnswerSet, Channel, Level, Registration, SessionId};
use burnout_session::{
    Collaborator, CollaboratorError, HttpCollaborator, SessionConfig, SessionMachine, Step,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collaborator(server: &MockServer) -> HttpCollaborator {
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    HttpCollaborator::new(base)
}

fn session() -> SessionId {
    SessionId::new("abc-123")
}

// =============================================================================
// Requests
// =============================================================================

#[tokio::test]
async fn test_register_posts_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_json(json!({
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "mobile": "+15551234567"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "session_id": "abc-123",
            "message": "Registration successful",
            "next_step": "email_otp"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = collaborator(&server)
        .register(&Registration::new("Ada Lovelace", "ada@example.com", "+15551234567"))
        .await
        .unwrap();

    assert_eq!(id, session());
}

#[tokio::test]
async fn test_codes_name_the_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/otp/send"))
        .and(body_json(json!({ "session_id": "abc-123", "otp_type": "mobile" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "OTP sent to your mobile",
            "expires_in_minutes": 10
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/otp/verify"))
        .and(body_json(json!({
            "session_id": "abc-123",
            "otp_type": "email",
            "otp_code": "123456"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Email verified successfully",
            "next_step": "mobile_otp"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let http = collaborator(&server);
    http.issue_code(&session(), Channel::Secondary).await.unwrap();
    http.verify_code(&session(), Channel::Email, "123456").await.unwrap();
}

#[tokio::test]
async fn test_submit_reads_preview() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assessment/submit"))
        .and(body_partial_json(json!({
            "answers": { "1": 3, "2": 3, "3": 3, "4": 3, "5": 3, "6": 3, "7": 3 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "score": 100,
            "level": "High",
            "preview_insight": Level::High.preview(),
            "next_step": "payment",
            "message": "Assessment completed successfully"
        })))
        .mount(&server)
        .await;

    let mut answers = AnswerSet::new();
    for id in 1..=7 {
        answers.select(id, 3).unwrap();
    }

    let result = collaborator(&server)
        .submit_assessment(&session(), &answers.complete().unwrap())
        .await
        .unwrap();

    assert_eq!(result.score, 100);
    assert_eq!(result.level, Level::High);
    assert_eq!(result.insight, Level::High.preview());
}

#[tokio::test]
async fn test_payment_redirect_uses_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payment/redirect"))
        .and(query_param("session_id", "abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "payment_url": "https://pay.example/l/report?wanted=true",
            "message": "Redirecting to payment page"
        })))
        .mount(&server)
        .await;

    let url = collaborator(&server)
        .request_payment_redirect(&session())
        .await
        .unwrap();

    assert_eq!(url, "https://pay.example/l/report?wanted=true");
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_error_status_message_is_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/otp/verify"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Invalid OTP. Please try again."
        })))
        .mount(&server)
        .await;

    let err = collaborator(&server)
        .verify_code(&session(), Channel::Email, "000000")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CollaboratorError::Rejected("Invalid OTP. Please try again.".to_string())
    );
    assert_eq!(err.to_string(), "Invalid OTP. Please try again.");
}

#[tokio::test]
async fn test_success_false_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/report/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "detail": "Failed to send email"
        })))
        .mount(&server)
        .await;

    let err = collaborator(&server)
        .deliver_report(&session())
        .await
        .unwrap_err();

    assert_eq!(err, CollaboratorError::Rejected("Failed to send email".to_string()));
}

#[tokio::test]
async fn test_status_without_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/confirm"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = collaborator(&server)
        .confirm_payment(&session())
        .await
        .unwrap_err();

    match err {
        CollaboratorError::Rejected(message) => assert!(message.contains("502")),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unexpected_shape_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/report/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let err = collaborator(&server)
        .generate_report(&session())
        .await
        .unwrap_err();

    assert!(matches!(err, CollaboratorError::Malformed(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Reserve a port, then release it so nothing is listening there
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let http = HttpCollaborator::new(Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap());

    let err = http.confirm_payment(&session()).await.unwrap_err();

    assert!(matches!(err, CollaboratorError::Transport(_)));
}

// =============================================================================
// Machine over HTTP
// =============================================================================

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "success": true,
                    "session_id": "abc-123",
                    "message": "Registration successful",
                    "next_step": "email_otp"
                }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = SessionConfig::default().with_call_timeout(Duration::from_millis(100));
    let machine = SessionMachine::with_config(collaborator(&server), config);

    let err = machine
        .register(Registration::new("Ada Lovelace", "ada@example.com", "+15551234567"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        burnout_session::SessionError::Collaborator(CollaboratorError::TimedOut)
    );
    assert_eq!(machine.step(), Step::Registration);
    assert!(!machine.is_busy());
}

#[tokio::test]
async fn test_resumed_machine_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/confirm"))
        .and(body_json(json!({ "session_id": "abc-123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Payment confirmed",
            "next_step": "generate_report"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/report/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Report generated successfully",
            "report_content": "# Your Burnout Report"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/report/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Report sent to your email"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let location = Url::parse("https://app.example/?payment=success&session_id=abc-123").unwrap();
    let machine =
        SessionMachine::from_location(collaborator(&server), &location, SessionConfig::default());
    machine.run_pending().await.unwrap();

    assert_eq!(machine.step(), Step::Report);
    assert_eq!(
        machine.session().payment.report.as_deref(),
        Some("# Your Burnout Report")
    );
}
