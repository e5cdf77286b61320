use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy for the proxy endpoints.
///
/// Every variant carries the message returned to the caller and maps to a
/// fixed HTTP status. Nothing is retried; errors surface exactly once.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller supplied nothing usable (missing file, empty transcript).
    #[error("{0}")]
    InvalidRequest(String),

    /// The upstream provider rejected our credential.
    #[error("{0}")]
    AuthFailure(String),

    /// Required server-side credential absent; checked before any
    /// external call.
    #[error("{0}")]
    Misconfigured(String),

    /// The upstream provider call failed for any other reason.
    #[error("{0}")]
    Upstream(String),

    /// Payment placeholder endpoints before their secrets are set.
    #[error("{0}")]
    NotConfigured(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthFailure(_) => StatusCode::UNAUTHORIZED,
            ApiError::Misconfigured(_) | ApiError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::NotConfigured(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
