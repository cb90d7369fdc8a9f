//! Payment endpoints
//!
//! Payment is trusted on return: the checkout page sends the visitor back
//! with the success marker and the front end confirms here.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;

use burnout_core::api::{
    ConfirmPaymentResponse, PaymentRedirectQuery, PaymentRedirectResponse, SessionRequest,
};

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::{Progress, Store};

use super::load_session;

/// GET /api/payment/redirect?session_id=
pub async fn redirect<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    query: Result<Query<PaymentRedirectQuery>, QueryRejection>,
) -> Result<Json<PaymentRedirectResponse>, ServerError>
where
    S: Store,
    E: EmailSender,
{
    let Query(query) = query?;
    let session = load_session(&state.store, &query.session_id)?;

    if !session.assessment_completed {
        return Err(ServerError::Forbidden("Assessment not completed"));
    }

    let payment_url = state.config.payment_url(&session.id)?;

    tracing::info!(session = %session.id, "Payment redirect requested");

    Ok(Json(PaymentRedirectResponse {
        success: true,
        payment_url,
        message: "Redirect to payment page".to_string(),
    }))
}

/// POST /api/payment/confirm
/// Mark the session paid. Repeating it once a report exists returns the report.
pub async fn confirm<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<ConfirmPaymentResponse>, ServerError>
where
    S: Store,
    E: EmailSender,
{
    let Json(req) = payload?;
    let mut session = load_session(&state.store, &req.session_id)?;

    if !session.assessment_completed {
        return Err(ServerError::Forbidden("Assessment not completed"));
    }

    if session.payment_completed {
        if let Some(report) = state.store.get_report(&session.id)? {
            return Ok(Json(ConfirmPaymentResponse {
                success: true,
                message: "Payment already processed".to_string(),
                next_step: None,
                report_content: Some(report.content),
            }));
        }
    }

    session.payment_completed = true;
    session.step = Progress::ReportGeneration;
    state.store.update_session(&session)?;

    tracing::info!(session = %session.id, "Payment confirmed");

    Ok(Json(ConfirmPaymentResponse {
        success: true,
        message: "Payment confirmed. Generating your report...".to_string(),
        next_step: Some(session.step.as_str().to_string()),
        report_content: None,
    }))
}
