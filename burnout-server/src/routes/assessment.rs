//! Assessment submission endpoint

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

use burnout_core::api::{SubmitAssessmentRequest, SubmitAssessmentResponse};
use burnout_core::{score, AnswerSet};

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::{AssessmentRecord, Progress, Store};

use super::load_session;

/// POST /api/assessment/submit
/// Score the answers and return the preview. Both channels must be verified.
pub async fn submit<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    payload: Result<Json<SubmitAssessmentRequest>, JsonRejection>,
) -> Result<Json<SubmitAssessmentResponse>, ServerError>
where
    S: Store,
    E: EmailSender,
{
    let Json(req) = payload?;
    let mut session = load_session(&state.store, &req.session_id)?;

    if !session.email_verified {
        return Err(ServerError::Forbidden("Email not verified"));
    }
    if !session.mobile_verified {
        return Err(ServerError::Forbidden("Mobile not verified"));
    }

    let answers = AnswerSet::try_from(req.answers)?.complete()?;
    let result = score(&answers);

    state.store.put_assessment(&AssessmentRecord {
        session_id: session.id.clone(),
        answers: answers
            .labels()
            .map(|(id, label)| (id, label.to_string()))
            .collect(),
        score: result.score,
        level: result.level,
        created_at: Utc::now(),
    })?;

    session.assessment_completed = true;
    session.step = Progress::Payment;
    state.store.update_session(&session)?;

    tracing::info!(session = %session.id, score = result.score, level = %result.level, "Assessment submitted");

    Ok(Json(SubmitAssessmentResponse {
        success: true,
        score: result.score,
        level: result.level,
        preview_insight: result.level.preview().to_string(),
        next_step: session.step.as_str().to_string(),
        message: "Assessment complete. Unlock your full report to continue.".to_string(),
    }))
}
