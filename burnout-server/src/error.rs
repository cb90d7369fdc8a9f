//! Server error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use burnout_core::api::ErrorBody;
use burnout_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Session not found")]
    SessionNotFound,

    /// A record the session should own is missing
    #[error("{0}")]
    NotFound(&'static str),

    /// An earlier step of the workflow has not been completed
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    Validation(String),

    /// Code issuance or verification refused
    #[error("{0}")]
    CodeRejected(String),

    /// Report generation failed or produced unusable content
    #[error("{0}")]
    Generation(String),

    /// Email or SMS could not be sent
    #[error("{0}")]
    Delivery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for ServerError {
    fn from(e: ValidationError) -> Self {
        ServerError::Validation(e.to_string())
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::SessionNotFound | ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::Validation(_) | ServerError::CodeRejected(_) => StatusCode::BAD_REQUEST,
            ServerError::Generation(_) | ServerError::Delivery(_) => StatusCode::BAD_GATEWAY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ServerError::Generation(msg) | ServerError::Delivery(msg) => {
                tracing::error!(%status, "Downstream failure: {}", msg);
                msg.clone()
            }
            other => other.to_string(),
        };

        (status, axum::Json(ErrorBody::new(message))).into_response()
    }
}
