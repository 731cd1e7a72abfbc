//! HTTP client for the résumé service. The only place the editor talks to the network.
//!
//! No call is retried here: failed saves are retried by the autosave cadence,
//! and export/score failures are reported once per attempt. Timeouts are
//! enforced by the client and surface like any other transport failure.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{Credential, ExportFormat, ResumeBackend};
use crate::errors::{EditorError, Operation};
use crate::models::resume::ResumeId;
use crate::models::wire::{
    AtsCheckRequest, AtsReport, Envelope, ResumeData, ResumePayload, StoredResume,
};

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and unwraps the `{ success, data }` envelope.
    async fn send_enveloped<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, EditorError> {
        let response = send(operation, request).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| EditorError::transient(operation, format!("malformed response: {e}")))?;

        if !envelope.success {
            let reason = envelope
                .error
                .unwrap_or_else(|| "service reported failure".to_string());
            return Err(EditorError::transient(operation, reason));
        }
        if let Some(message) = &envelope.message {
            debug!("{operation}: {message}");
        }
        envelope
            .data
            .ok_or_else(|| EditorError::transient(operation, "response carried no data"))
    }
}

async fn send(operation: Operation, request: RequestBuilder) -> Result<Response, EditorError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            EditorError::transient(operation, "request timed out")
        } else {
            EditorError::transient(operation, e)
        }
    })?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!("{operation} rejected with {status}");
        return Err(EditorError::Authorization { operation });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // Prefer the envelope's error message when the body has one
        let message = serde_json::from_str::<Envelope<Value>>(&body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or(body);
        return Err(EditorError::transient(
            operation,
            format!("status {}: {}", status.as_u16(), message),
        ));
    }
    Ok(response)
}

#[async_trait]
impl ResumeBackend for HttpBackend {
    async fn create(
        &self,
        credential: &Credential,
        payload: &ResumePayload,
    ) -> Result<StoredResume, EditorError> {
        let request = self
            .client
            .post(self.url("/api/resumes"))
            .bearer_auth(credential.token())
            .json(payload);
        let data: ResumeData = self.send_enveloped(Operation::Create, request).await?;
        Ok(data.resume)
    }

    async fn update(
        &self,
        credential: &Credential,
        id: &ResumeId,
        payload: &ResumePayload,
    ) -> Result<StoredResume, EditorError> {
        let request = self
            .client
            .put(self.url(&format!("/api/resumes/{id}")))
            .bearer_auth(credential.token())
            .json(payload);
        let data: ResumeData = self.send_enveloped(Operation::Update, request).await?;
        Ok(data.resume)
    }

    async fn load(
        &self,
        credential: &Credential,
        id: &ResumeId,
    ) -> Result<StoredResume, EditorError> {
        let request = self
            .client
            .get(self.url(&format!("/api/resumes/{id}")))
            .bearer_auth(credential.token());
        let data: ResumeData = self.send_enveloped(Operation::Load, request).await?;
        Ok(data.resume)
    }

    async fn export(
        &self,
        credential: &Credential,
        id: &ResumeId,
        format: ExportFormat,
    ) -> Result<Bytes, EditorError> {
        let request = self
            .client
            .get(self.url(&format!("/api/resumes/{id}/export/{format}")))
            .bearer_auth(credential.token());
        let response = send(Operation::Export, request).await?;
        response
            .bytes()
            .await
            .map_err(|e| EditorError::transient(Operation::Export, e))
    }

    async fn score_check(
        &self,
        credential: &Credential,
        id: &ResumeId,
        job_description: Option<&str>,
    ) -> Result<AtsReport, EditorError> {
        let body = AtsCheckRequest {
            resume_id: id.as_str(),
            job_description,
        };
        let request = self
            .client
            .post(self.url("/api/ai/ats-check"))
            .bearer_auth(credential.token())
            .json(&body);
        self.send_enveloped(Operation::ScoreCheck, request).await
    }
}
