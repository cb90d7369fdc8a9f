//! End-to-end walk through the whole workflow over HTTP

mod common;

use common::*;
use serde_json::Value;

#[tokio::test]
async fn test_health() {
    let app = create_test_server();

    let response = app.server.get("/api/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_full_flow() {
    let app = create_test_server();

    // Register
    let response = app
        .server
        .post("/api/register")
        .json(&serde_json::json!({
            "full_name": "  Ada Lovelace ",
            "email": EMAIL,
            "mobile": MOBILE,
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["next_step"], "email_verification");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Email
    let (status, body) = send_code(&app, &session_id, "email").await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "OTP sent to your email");
    assert_eq!(body["expires_in_minutes"], 10);

    let code = last_code(&app, "email");
    assert_eq!(code.len(), 6);
    let (status, body) = verify_code(&app, &session_id, "email", &code).await;
    assert_eq!(status, 200);
    assert_eq!(body["next_step"], "mobile_verification");

    // Mobile
    let (status, body) = send_code(&app, &session_id, "mobile").await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "OTP sent to your mobile");
    let code = last_code(&app, "mobile");
    let (status, body) = verify_code(&app, &session_id, "mobile", &code).await;
    assert_eq!(status, 200);
    assert_eq!(body["next_step"], "assessment");

    // Assessment
    let (status, body) = submit(&app, &session_id, &MODERATE_ANSWERS).await;
    assert_eq!(status, 200);
    assert_eq!(body["score"], 48);
    assert_eq!(body["level"], "Moderate");
    assert_eq!(
        body["preview_insight"],
        "You're showing signs of moderate burnout."
    );
    assert_eq!(body["next_step"], "payment");

    // Payment
    let response = app
        .server
        .get("/api/payment/redirect")
        .add_query_param("session_id", &session_id)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let payment_url = body["payment_url"].as_str().unwrap();
    assert!(payment_url.starts_with("https://parameswaran8.gumroad.com/l/burnout-report?wanted=true"));
    assert!(payment_url.contains(&format!("session_id%3D{}", session_id)));

    let (status, body) = post_session(&app, "/api/payment/confirm", &session_id).await;
    assert_eq!(status, 200);
    assert_eq!(body["next_step"], "report_generation");
    assert!(body.get("report_content").is_none());

    // Report
    let (status, body) = post_session(&app, "/api/report/generate", &session_id).await;
    assert_eq!(status, 200);
    let report = body["report_content"].as_str().unwrap().to_string();
    assert!(report.contains("Ada"));
    assert!(report.contains("14-Day Recovery Action Plan"));
    assert!(body.get("already_existed").is_none());

    let (status, body) = post_session(&app, "/api/report/email", &session_id).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Report sent to your email successfully");
    assert_eq!(
        app.email.reports.read().unwrap().as_slice(),
        &[(EMAIL.to_string(), report)]
    );

    // Status
    let response = app.server.get(&format!("/api/session/{}", session_id)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["current_step"], "report_delivery");
    for flag in [
        "email_verified",
        "mobile_verified",
        "assessment_completed",
        "payment_completed",
        "report_generated",
    ] {
        assert_eq!(body[flag], true, "{} should be set", flag);
    }
}

#[tokio::test]
async fn test_status_of_new_session() {
    let app = create_test_server();
    let session_id = register(&app).await;

    let response = app.server.get(&format!("/api/session/{}", session_id)).await;

    let body: Value = response.json();
    assert_eq!(body["session_id"], session_id.as_str());
    assert_eq!(body["current_step"], "email_verification");
    assert_eq!(body["email_verified"], false);
    assert_eq!(body["report_generated"], false);
}

#[tokio::test]
async fn test_secondary_alias_accepted() {
    let app = create_test_server();
    let session_id = register(&app).await;
    verify_channel(&app, &session_id, "email").await;

    let (status, body) = send_code(&app, &session_id, "secondary").await;

    assert_eq!(status, 200);
    assert_eq!(body["message"], "OTP sent to your mobile");
    assert!(app.sms.get_code(MOBILE).is_some());
}

#[tokio::test]
async fn test_high_score_preview() {
    let app = create_test_server();
    let session_id = verified_session(&app).await;

    let answers: Vec<(u8, u8)> = (1..=7).map(|id| (id, 3)).collect();
    let (status, body) = submit(&app, &session_id, &answers).await;

    assert_eq!(status, 200);
    assert_eq!(body["score"], 100);
    assert_eq!(body["level"], "High");
}

#[tokio::test]
async fn test_resubmitting_assessment_replaces_score() {
    let app = create_test_server();
    let session_id = assessed_session(&app).await;

    let answers: Vec<(u8, u8)> = (1..=7).map(|id| (id, 0)).collect();
    let (status, body) = submit(&app, &session_id, &answers).await;

    assert_eq!(status, 200);
    assert_eq!(body["score"], 0);
    assert_eq!(body["level"], "Low");
}

async fn current_step(app: &TestApp, session_id: &str) -> Value {
    let response = app.server.get(&format!("/api/session/{}", session_id)).await;
    let body: Value = response.json();
    body["current_step"].clone()
}

#[tokio::test]
async fn test_mobile_first_does_not_skip_email() {
    let app = create_test_server();
    let session_id = register(&app).await;

    verify_channel(&app, &session_id, "mobile").await;
    assert_eq!(current_step(&app, &session_id).await, "email_verification");

    verify_channel(&app, &session_id, "email").await;
    assert_eq!(current_step(&app, &session_id).await, "assessment");
}

#[tokio::test]
async fn test_reverifying_email_keeps_progress() {
    let app = create_test_server();
    let session_id = paid_session(&app).await;

    verify_channel(&app, &session_id, "email").await;

    assert_eq!(current_step(&app, &session_id).await, "report_generation");
}
