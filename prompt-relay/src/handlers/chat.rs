use super::{require_text, ApiError};
use crate::dtos::ChatRequest;
use crate::error::RelayError;
use crate::services::prompt::chat_payload;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

/// `POST /api/chat`: wrap the message and relay Gemini's reply verbatim,
/// including its status code.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    req.validate().map_err(RelayError::from)?;
    let message = require_text("message", req.message)?;

    tracing::info!(
        provider = state.text_provider.name(),
        message_len = message.len(),
        "Forwarding chat message"
    );

    let raw = state.text_provider.forward(&chat_payload(&message)).await?;
    let status = StatusCode::from_u16(raw.status).unwrap_or(StatusCode::BAD_GATEWAY);

    if !status.is_success() {
        tracing::warn!(status = raw.status, "Gemini rejected chat request");
    }

    Ok((status, Json(raw.body)).into_response())
}
