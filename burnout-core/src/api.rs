//! JSON wire format of the backend API
//!
//! Every success body carries `success: true`; every failure body is an
//! [`ErrorBody`] with `success: false` and a human-readable `message`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Channel, Level, SessionId};

/// POST /api/register response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub session_id: SessionId,
    pub message: String,
    pub next_step: String,
}

/// POST /api/otp/send request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeRequest {
    pub session_id: SessionId,
    pub otp_type: Channel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeResponse {
    pub success: bool,
    pub message: String,
    pub expires_in_minutes: i64,
}

/// POST /api/otp/verify request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    pub session_id: SessionId,
    pub otp_type: Channel,
    pub otp_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
}

/// POST /api/assessment/submit request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAssessmentRequest {
    pub session_id: SessionId,
    /// Question id to option value; JSON object keys are the ids as strings
    pub answers: BTreeMap<u8, u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAssessmentResponse {
    pub success: bool,
    pub score: u8,
    pub level: Level,
    pub preview_insight: String,
    pub next_step: String,
    pub message: String,
}

/// Query for GET /api/payment/redirect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRedirectQuery {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRedirectResponse {
    pub success: bool,
    pub payment_url: String,
    pub message: String,
}

/// Body of the payment confirmation and report endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
    /// Present when the payment was already processed and a report exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub message: String,
    pub report_content: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub already_existed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailReportResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub already_sent: bool,
}

/// GET /api/session/{id} response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub success: bool,
    pub session_id: SessionId,
    pub current_step: String,
    pub email_verified: bool,
    pub mobile_verified: bool,
    pub assessment_completed: bool,
    pub payment_completed: bool,
    pub report_generated: bool,
}

/// Failure body returned with any non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
