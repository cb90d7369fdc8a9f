//! One-time code endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

use burnout_core::api::{SendCodeRequest, SendCodeResponse, VerifyCodeRequest, VerifyCodeResponse};
use burnout_core::Channel;

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::otp::Rejection;
use crate::state::AppState;
use crate::store::{OtpRecord, OtpWrite, Store};

use super::load_session;

/// POST /api/otp/send
/// Issue a fresh code for one channel, replacing any previous one
pub async fn send_code<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    payload: Result<Json<SendCodeRequest>, JsonRejection>,
) -> Result<Json<SendCodeResponse>, ServerError>
where
    S: Store,
    E: EmailSender,
{
    let Json(req) = payload?;
    let session = load_session(&state.store, &req.session_id)?;
    let channel = req.otp_type;
    let target = session.target(channel);

    // Reserve the new code under the resend limit before delivering it
    let policy = state.otp_policy();
    let (record, previous) = state.store.update_otp(&session.id, channel, |existing| {
        match policy.issue(existing, &session.id, channel, target) {
            Ok(record) => (
                OtpWrite::Put(record.clone()),
                Ok((record, existing.cloned())),
            ),
            Err(e) => (OtpWrite::Keep, Err(e)),
        }
    })??;

    let sent = match channel {
        Channel::Email => state
            .email_sender
            .send_code(target, &session.full_name, &record.code),
        Channel::Secondary => state.sms_sender.send_code(target, &record.code),
    };

    if let Err(e) = sent {
        // An undelivered code neither replaces the live one nor counts as a
        // resend, unless a later issuance already replaced it
        state.store.update_otp(&session.id, channel, |current| {
            let reserved = current
                .is_some_and(|c| c.code == record.code && c.resend_count == record.resend_count);
            let write = match (reserved, previous) {
                (false, _) => OtpWrite::Keep,
                (true, Some(previous)) => OtpWrite::Put(previous),
                (true, None) => OtpWrite::Remove,
            };
            (write, ())
        })?;
        return Err(ServerError::Delivery(e));
    }

    tracing::info!(
        session = %session.id,
        channel = %channel,
        resend_count = record.resend_count,
        "Code sent"
    );

    Ok(Json(SendCodeResponse {
        success: true,
        message: format!("OTP sent to your {}", channel),
        expires_in_minutes: state.config.otp_expiry_minutes,
    }))
}

/// POST /api/otp/verify
/// Check a code and mark the channel verified
pub async fn verify_code<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    payload: Result<Json<VerifyCodeRequest>, JsonRejection>,
) -> Result<Json<VerifyCodeResponse>, ServerError>
where
    S: Store,
    E: EmailSender,
{
    let Json(req) = payload?;
    let mut session = load_session(&state.store, &req.session_id)?;
    let channel = req.otp_type;

    let policy = state.otp_policy();
    let now = Utc::now();
    let outcome = state.store.update_otp(&session.id, channel, |record| {
        match (record, policy.check(record, &req.otp_code, now)) {
            (Some(record), Ok(())) => (
                OtpWrite::Put(OtpRecord {
                    verified: true,
                    ..record.clone()
                }),
                Ok(()),
            ),
            (Some(record), Err(Rejection::Mismatch)) => (
                OtpWrite::Put(OtpRecord {
                    attempts: record.attempts + 1,
                    ..record.clone()
                }),
                Err(Rejection::Mismatch),
            ),
            (_, result) => (OtpWrite::Keep, result),
        }
    })?;

    if let Err(rejection) = outcome {
        tracing::debug!(session = %session.id, channel = %channel, ?rejection, "Code rejected");
        return Err(rejection.into());
    }

    session.mark_verified(channel);
    state.store.update_session(&session)?;

    tracing::info!(session = %session.id, channel = %channel, "Code verified");

    Ok(Json(VerifyCodeResponse {
        success: true,
        message: "Verification successful".to_string(),
        next_step: Some(session.step.as_str().to_string()),
    }))
}
