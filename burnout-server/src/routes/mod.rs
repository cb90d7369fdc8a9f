//! HTTP routes for the API

mod assessment;
mod health;
mod otp;
mod payment;
mod register;
mod report;
mod session;

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use burnout_core::SessionId;

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::{SessionRecord, Store};

/// Create the router with all routes
pub fn create_router<S, E>(state: Arc<AppState<S, E>>) -> Router
where
    S: Store + 'static,
    E: EmailSender + 'static,
{
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/register", post(register::register))
        .route("/api/otp/send", post(otp::send_code))
        .route("/api/otp/verify", post(otp::verify_code))
        .route("/api/assessment/submit", post(assessment::submit))
        .route("/api/payment/redirect", get(payment::redirect))
        .route("/api/payment/confirm", post(payment::confirm))
        .route("/api/report/generate", post(report::generate))
        .route("/api/report/email", post(report::email))
        .route("/api/session/:session_id", get(session::status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Malformed bodies get the same JSON error shape as every other failure
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

/// Look up a session or fail with 404
fn load_session<S: Store>(store: &S, id: &SessionId) -> Result<SessionRecord, ServerError> {
    store.get_session(id)?.ok_or(ServerError::SessionNotFound)
}
