//! HTTP handlers for the relay service.

pub mod chat;
pub mod generate;
pub mod health;
pub mod recommendation;

pub use chat::chat;
pub use generate::{generate, generate_mock};
pub use health::{health_check, not_found, readiness_check};
pub use recommendation::llm_recommendation;

use crate::dtos::ErrorResponse;
use crate::error::RelayError;
use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    Json,
};

/// Renders a `RelayError` as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log_failure(&self.0);
        (
            self.0.status(),
            Json(ErrorResponse {
                error: self.0.message().to_string(),
            }),
        )
            .into_response()
    }
}

/// Blank (empty or whitespace-only) text counts as missing.
pub(crate) fn require_text(field: &str, value: Option<String>) -> Result<String, RelayError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(RelayError::InvalidInput(format!(
            "Field \"{}\" must not be empty",
            field
        ))),
    }
}

pub(crate) fn log_failure(err: &RelayError) {
    match err {
        RelayError::InvalidInput(_) => {
            tracing::warn!(kind = err.kind(), error = %err, "Rejected relay request")
        }
        _ => tracing::error!(kind = err.kind(), error = %err, "Upstream call failed"),
    }
}
