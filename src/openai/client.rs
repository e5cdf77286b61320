use reqwest::{multipart, Client, StatusCode};
use thiserror::Error;

use super::types::{ChatCompletion, ChatRequest, ErrorEnvelope, Transcription};

#[derive(Debug, Error)]
pub enum OpenAiError {
    /// The provider rejected the credential (HTTP 401).
    #[error("{0}")]
    Auth(String),

    /// Any other non-success response, message taken from the error
    /// envelope when the body carries one.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Failed to reach OpenAI API: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Forward raw audio bytes to the transcription API.
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        file_name: &str,
        mime: &str,
        model: &str,
        language: &str,
    ) -> Result<Transcription, OpenAiError> {
        let file_part = multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str(mime)?;

        let form = multipart::Form::new()
            .text("model", model.to_string())
            .text("language", language.to_string())
            .part("file", file_part);

        let response = self
            .http
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Issue one chat completion request.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, OpenAiError> {
        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn api_error(response: reqwest::Response) -> OpenAiError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => envelope.error.message,
            Err(_) if text.is_empty() => format!("OpenAI API returned status {}", status),
            Err(_) => text,
        };

        if status == StatusCode::UNAUTHORIZED {
            OpenAiError::Auth(message)
        } else {
            OpenAiError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}
