//! Session status endpoint

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use burnout_core::api::SessionStatusResponse;
use burnout_core::SessionId;

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::Store;

use super::load_session;

/// GET /api/session/:session_id
pub async fn status<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ServerError>
where
    S: Store,
    E: EmailSender,
{
    let session = load_session(&state.store, &SessionId::new(session_id))?;

    Ok(Json(SessionStatusResponse {
        success: true,
        current_step: session.step.as_str().to_string(),
        email_verified: session.email_verified,
        mobile_verified: session.mobile_verified,
        assessment_completed: session.assessment_completed,
        payment_completed: session.payment_completed,
        report_generated: session.report_generated,
        session_id: session.id,
    }))
}
