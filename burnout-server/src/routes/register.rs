//! Registration endpoint

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use burnout_core::api::RegisterResponse;
use burnout_core::Registration;

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::otp::generate_session_id;
use crate::state::AppState;
use crate::store::{SessionRecord, Store};

/// POST /api/register
/// Validate the visitor's details and open a session
pub async fn register<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ServerError>
where
    S: Store,
    E: EmailSender,
{
    let Json(registration) = payload?;
    registration.validate()?;

    let session = SessionRecord::new(generate_session_id(), &registration);
    state.store.create_session(&session)?;

    tracing::info!(session = %session.id, email = %session.email, "User registered");

    Ok(Json(RegisterResponse {
        success: true,
        session_id: session.id.clone(),
        message: "Registration successful. Please verify your email.".to_string(),
        next_step: session.step.as_str().to_string(),
    }))
}
