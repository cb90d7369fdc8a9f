//! Report generation and delivery endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use burnout_core::api::{EmailReportResponse, GenerateReportResponse, SessionRequest};

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::report::{validate_report_content, ReportInput};
use crate::state::AppState;
use crate::store::{Progress, ReportRecord, Store};

use super::load_session;

/// POST /api/report/generate
/// Generate the report once per paid session
pub async fn generate<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<GenerateReportResponse>, ServerError>
where
    S: Store,
    E: EmailSender,
{
    let Json(req) = payload?;
    let mut session = load_session(&state.store, &req.session_id)?;

    if !session.payment_completed {
        return Err(ServerError::Forbidden("Payment required"));
    }

    if let Some(existing) = state.store.get_report(&session.id)? {
        tracing::warn!(session = %session.id, "Report already exists");
        return Ok(Json(GenerateReportResponse {
            success: true,
            message: "Report already generated".to_string(),
            report_content: existing.content,
            already_existed: true,
        }));
    }

    let assessment = state
        .store
        .get_assessment(&session.id)?
        .ok_or(ServerError::NotFound("Assessment not found"))?;
    let input = ReportInput::new(&session, &assessment);

    // Generators may block on network I/O
    let generator = Arc::clone(&state.report_generator);
    let content = tokio::task::spawn_blocking(move || generator.generate(&input))
        .await
        .map_err(|e| ServerError::Internal(format!("Blocking task failed: {}", e)))?
        .map_err(ServerError::Generation)?;

    if !validate_report_content(&content) {
        tracing::error!(session = %session.id, length = content.len(), "Generated report failed quality validation");
        return Err(ServerError::Generation(
            "Report generation failed quality check".to_string(),
        ));
    }

    state
        .store
        .put_report(&ReportRecord::new(session.id.clone(), content.clone()))?;

    session.report_generated = true;
    session.step = Progress::ReportDelivery;
    state.store.update_session(&session)?;

    tracing::info!(session = %session.id, "Report generated");

    Ok(Json(GenerateReportResponse {
        success: true,
        message: "Report generated successfully".to_string(),
        report_content: content,
        already_existed: false,
    }))
}

/// POST /api/report/email
/// Email the generated report; repeat calls do not send it again
pub async fn email<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<EmailReportResponse>, ServerError>
where
    S: Store,
    E: EmailSender,
{
    let Json(req) = payload?;
    let session = load_session(&state.store, &req.session_id)?;

    if !session.payment_completed {
        return Err(ServerError::Forbidden("Payment required"));
    }
    if !session.report_generated {
        return Err(ServerError::Forbidden("Report not generated"));
    }

    let report = state
        .store
        .get_report(&session.id)?
        .ok_or(ServerError::NotFound("Report not found"))?;

    if report.email_sent {
        return Ok(Json(EmailReportResponse {
            success: true,
            message: "Report already sent to your email".to_string(),
            already_sent: true,
        }));
    }

    state
        .email_sender
        .send_report(&session.email, &session.full_name, &report.content)
        .map_err(ServerError::Delivery)?;

    state.store.mark_report_sent(&session.id)?;

    tracing::info!(session = %session.id, email = %session.email, "Report emailed");

    Ok(Json(EmailReportResponse {
        success: true,
        message: "Report sent to your email successfully".to_string(),
        already_sent: false,
    }))
}
