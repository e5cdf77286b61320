use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::agents::{self, AgentKind};
use crate::error::ApiError;
use crate::openai::OpenAiError;

use super::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// The transcript to analyze. Missing or blank → 400.
    #[serde(default)]
    pub transcription: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcription: String,
}

struct AudioUpload {
    bytes: Vec<u8>,
    file_name: String,
    mime: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/transcribe
/// Forward a multipart audio upload to the speech-to-text API
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let request_id = format!("req_{}", uuid::Uuid::new_v4());
    let log = &state.log;

    log.info(
        "Whisper",
        "Transcription request received",
        None,
        Some(json!({ "requestId": request_id })),
    );

    // Credential check comes before reading the body; no upstream call is
    // ever attempted without one.
    let Some(client) = state.openai.as_ref() else {
        log.error(
            "Whisper",
            "API key not configured",
            None,
            Some(json!({ "requestId": request_id })),
        );
        return Err(ApiError::Misconfigured(
            "OpenAI API key not configured. Please set OPENAI_API_KEY in your environment variables.".into(),
        ));
    };

    let Some(upload) = read_audio_field(multipart).await? else {
        log.warn(
            "Whisper",
            "No audio file provided in request",
            Some(json!({ "requestId": request_id })),
        );
        return Err(ApiError::InvalidRequest("No audio file provided".into()));
    };

    log.info(
        "Whisper",
        "Starting OpenAI Whisper API call",
        None,
        Some(json!({
            "requestId": request_id,
            "fileSize": format!("{:.2} KB", upload.bytes.len() as f64 / 1024.0),
            "fileType": upload.mime,
        })),
    );

    let started = Instant::now();
    let result = client
        .transcribe(
            upload.bytes,
            &upload.file_name,
            &upload.mime,
            &state.config.openai.transcription_model,
            &state.config.openai.language,
        )
        .await;
    let duration = started.elapsed().as_millis() as u64;

    match result {
        Ok(transcription) => {
            log.info(
                "Whisper",
                "OpenAI Whisper API call completed successfully",
                Some(duration),
                Some(json!({
                    "requestId": request_id,
                    "transcriptionLength": transcription.text.len(),
                    "wordsEstimate": transcription.text.split_whitespace().count(),
                })),
            );
            Ok(Json(TranscribeResponse {
                transcription: transcription.text,
            }))
        }
        Err(e @ OpenAiError::Auth(_)) => {
            log.error(
                "Whisper",
                "Transcription failed",
                Some(&e),
                Some(json!({ "requestId": request_id })),
            );
            Err(ApiError::AuthFailure(
                "Invalid OpenAI API key. Please check your credentials.".into(),
            ))
        }
        Err(e) => {
            log.error(
                "Whisper",
                "Transcription failed",
                Some(&e),
                Some(json!({ "requestId": request_id })),
            );
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}

/// POST /api/agents/mood
pub async fn analyze_mood(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    run_agent(state, AgentKind::Mood, req).await
}

/// POST /api/agents/sentiment
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    run_agent(state, AgentKind::Sentiment, req).await
}

/// POST /api/agents/summary
pub async fn analyze_summary(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    run_agent(state, AgentKind::Summary, req).await
}

/// Shared body of the three analysis endpoints; they differ only in the
/// `AgentKind`. Stateless: nothing outside the log sink is touched.
async fn run_agent(
    state: AppState,
    kind: AgentKind,
    req: AnalyzeRequest,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request_id = format!("{}_{}", kind.field(), uuid::Uuid::new_v4());
    let log = &state.log;

    log.info(
        kind.tag(),
        "Analysis request received",
        None,
        Some(json!({ "requestId": request_id })),
    );

    let Some(client) = state.openai.as_ref() else {
        log.error(
            kind.tag(),
            "API key not configured",
            None,
            Some(json!({ "requestId": request_id })),
        );
        return Err(ApiError::Misconfigured("OpenAI API key not configured".into()));
    };

    let transcript = match req.transcription.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            log.warn(
                kind.tag(),
                "No transcription provided",
                Some(json!({ "requestId": request_id })),
            );
            return Err(ApiError::InvalidRequest("No transcription provided".into()));
        }
    };

    log.info(
        kind.tag(),
        &format!("Starting {}", kind.action()),
        None,
        Some(json!({
            "requestId": request_id,
            "transcriptionLength": transcript.len(),
        })),
    );

    let started = Instant::now();
    let result = agents::analyze(client, &state.config.openai.chat_model, kind, &transcript).await;
    let duration = started.elapsed().as_millis() as u64;

    match result {
        Ok(outcome) => {
            log.info(
                kind.tag(),
                &format!("Completed {}", kind.action()),
                Some(duration),
                Some(json!({
                    "requestId": request_id,
                    "tokensUsed": outcome.tokens_used,
                    "resultLength": outcome.text.len(),
                })),
            );
            Ok(Json(json!({ kind.field(): outcome.text })))
        }
        Err(e) => {
            log.error(
                kind.tag(),
                &format!("Failed {}", kind.action()),
                Some(&e),
                Some(json!({ "requestId": request_id })),
            );
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}

/// POST /api/stripe/create-checkout
/// Placeholder until payment secrets are configured
pub async fn create_checkout(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.config.stripe.secret_key.is_none() {
        return Err(ApiError::NotConfigured(
            "Stripe not configured. Please set STRIPE_SECRET_KEY in your environment variables."
                .into(),
        ));
    }

    Ok(Json(json!({
        "message": "Stripe checkout endpoint - awaiting configuration",
        "status": "placeholder",
    })))
}

/// POST /api/stripe/webhook
/// Placeholder until payment secrets are configured
pub async fn stripe_webhook(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.config.stripe.secret_key.is_none() || state.config.stripe.webhook_secret.is_none() {
        return Err(ApiError::NotConfigured(
            "Stripe not configured. Please set STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET environment variables."
                .into(),
        ));
    }

    Ok(Json(json!({
        "message": "Stripe webhook endpoint - awaiting configuration",
        "status": "placeholder",
    })))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn read_audio_field(mut multipart: Multipart) -> Result<Option<AudioUpload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?
    {
        if field.name() != Some("audio") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("recording.webm").to_string();
        let mime = field
            .content_type()
            .unwrap_or("audio/webm")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?
            .to_vec();

        return Ok(Some(AudioUpload {
            bytes,
            file_name,
            mime,
        }));
    }

    Ok(None)
}
