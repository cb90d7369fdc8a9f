//! Collaborator backed by the HTTP API

use async_trait::async_trait;
use burnout_core::api::{
    GenerateReportResponse, PaymentRedirectResponse, RegisterResponse, SendCodeRequest,
    SessionRequest, SubmitAssessmentRequest, SubmitAssessmentResponse, VerifyCodeRequest,
};
use burnout_core::{Assessment, Channel, CompleteAnswers, Registration, SessionId};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::collaborator::{Collaborator, CollaboratorResult};
use crate::error::CollaboratorError;

/// Talks to the backend's `/api` endpoints
#[derive(Debug, Clone)]
pub struct HttpCollaborator {
    client: Client,
    base_url: Url,
}

impl HttpCollaborator {
    /// `base_url` is the server root, e.g. `http://localhost:8001/`
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> CollaboratorResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CollaboratorError::Transport(format!("Invalid endpoint {}: {}", path, e)))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> CollaboratorResult<T> {
        let url = self.endpoint(path)?;
        self.send(self.client.post(url).json(body)).await
    }

    async fn get<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> CollaboratorResult<T> {
        let url = self.endpoint(path)?;
        self.send(self.client.get(url).query(query)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> CollaboratorResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = failure_message(&body)
                .unwrap_or_else(|| format!("Request failed with status {}", status));
            return Err(CollaboratorError::Rejected(message));
        }

        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = failure_message(&body).unwrap_or_else(|| "Request failed".to_string());
            return Err(CollaboratorError::Rejected(message));
        }

        serde_json::from_value(body).map_err(|e| CollaboratorError::Malformed(e.to_string()))
    }
}

/// The server's error text, under whichever key it used
fn failure_message(body: &Value) -> Option<String> {
    ["message", "detail", "reason"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl Collaborator for HttpCollaborator {
    async fn register(&self, registration: &Registration) -> CollaboratorResult<SessionId> {
        let response: RegisterResponse = self.post("api/register", registration).await?;
        Ok(response.session_id)
    }

    async fn issue_code(&self, session: &SessionId, channel: Channel) -> CollaboratorResult<()> {
        let request = SendCodeRequest {
            session_id: session.clone(),
            otp_type: channel,
        };
        self.post::<_, Value>("api/otp/send", &request).await?;
        Ok(())
    }

    async fn verify_code(
        &self,
        session: &SessionId,
        channel: Channel,
        code: &str,
    ) -> CollaboratorResult<()> {
        let request = VerifyCodeRequest {
            session_id: session.clone(),
            otp_type: channel,
            otp_code: code.to_string(),
        };
        self.post::<_, Value>("api/otp/verify", &request).await?;
        Ok(())
    }

    async fn submit_assessment(
        &self,
        session: &SessionId,
        answers: &CompleteAnswers,
    ) -> CollaboratorResult<Assessment> {
        let request = SubmitAssessmentRequest {
            session_id: session.clone(),
            answers: answers.to_map(),
        };
        let response: SubmitAssessmentResponse =
            self.post("api/assessment/submit", &request).await?;
        Ok(Assessment {
            score: response.score,
            level: response.level,
            insight: response.preview_insight,
        })
    }

    async fn request_payment_redirect(&self, session: &SessionId) -> CollaboratorResult<String> {
        let response: PaymentRedirectResponse = self
            .get("api/payment/redirect", &[("session_id", session.as_str())])
            .await?;
        Ok(response.payment_url)
    }

    async fn confirm_payment(&self, session: &SessionId) -> CollaboratorResult<()> {
        let request = SessionRequest {
            session_id: session.clone(),
        };
        self.post::<_, Value>("api/payment/confirm", &request).await?;
        Ok(())
    }

    async fn generate_report(&self, session: &SessionId) -> CollaboratorResult<String> {
        let request = SessionRequest {
            session_id: session.clone(),
        };
        let response: GenerateReportResponse = self.post("api/report/generate", &request).await?;
        Ok(response.report_content)
    }

    async fn deliver_report(&self, session: &SessionId) -> CollaboratorResult<()> {
        let request = SessionRequest {
            session_id: session.clone(),
        };
        self.post::<_, Value>("api/report/email", &request).await?;
        Ok(())
    }
}
