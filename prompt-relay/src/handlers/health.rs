use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Liveness probe; never touches the upstream.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "prompt-relay",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.text_provider.name(),
    }))
}

/// Readiness probe; succeeds only when the provider answers its health check.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.text_provider.health_check().await.map_err(|e| {
        tracing::warn!(
            provider = state.text_provider.name(),
            error = %e,
            "Provider health check failed"
        );
        AppError::ServiceUnavailable
    })?;

    Ok(StatusCode::OK)
}

pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("route not found"))
}
