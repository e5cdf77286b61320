use reqwest::{multipart, Client};
use serde_json::json;
use thiserror::Error;

use crate::agents::AgentKind;
use crate::error::ErrorResponse;

use super::recorder::AudioBlob;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server's `{error}` payload, verbatim.
    #[error("{0}")]
    Server(String),

    #[error("Failed to reach analysis server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response from analysis server: {0}")]
    BadResponse(String),
}

/// The server operations the client flow depends on. Test doubles stand in
/// for `HttpAnalysisApi` when driving the flow without a server.
#[async_trait::async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn transcribe(&self, audio: &AudioBlob) -> Result<String, ClientError>;
    async fn analyze(&self, kind: AgentKind, transcript: &str) -> Result<String, ClientError>;
}

#[async_trait::async_trait]
impl<T: AnalysisApi + ?Sized> AnalysisApi for std::sync::Arc<T> {
    async fn transcribe(&self, audio: &AudioBlob) -> Result<String, ClientError> {
        (**self).transcribe(audio).await
    }

    async fn analyze(&self, kind: AgentKind, transcript: &str) -> Result<String, ClientError> {
        (**self).analyze(kind, transcript).await
    }
}

/// Calls the voxlens HTTP endpoints.
pub struct HttpAnalysisApi {
    http: Client,
    base_url: String,
}

impl HttpAnalysisApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn server_error(response: reqwest::Response) -> ClientError {
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => ClientError::Server(body.error),
            Err(_) => ClientError::Server(text),
        }
    }
}

#[async_trait::async_trait]
impl AnalysisApi for HttpAnalysisApi {
    async fn transcribe(&self, audio: &AudioBlob) -> Result<String, ClientError> {
        let part = multipart::Part::bytes(audio.bytes.clone())
            .file_name("recording.webm")
            .mime_str(&audio.mime)?;
        let form = multipart::Form::new().part("audio", part);

        let response = self
            .http
            .post(format!("{}/api/transcribe", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let body: serde_json::Value = response.json().await?;
        body.get("transcription")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ClientError::BadResponse("missing transcription field".into()))
    }

    async fn analyze(&self, kind: AgentKind, transcript: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/agents/{}", self.base_url, kind.field()))
            .json(&json!({ "transcription": transcript }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let body: serde_json::Value = response.json().await?;
        body.get(kind.field())
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ClientError::BadResponse(format!("missing {} field", kind.field()))
            })
    }
}
