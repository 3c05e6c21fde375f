use super::ApiError;
use crate::dtos::{GenerateRequest, GenerateResponse};
use crate::services::prompt::{mock_reply, Prompt};
use crate::startup::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};

/// `POST /api/generate`: run the prompt through the configured provider.
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(req) = payload?;
    let prompt = Prompt::from_value(req.contents)?.non_blank()?;
    let contents = prompt.into_contents();

    tracing::info!(
        provider = state.text_provider.name(),
        turns = contents.len(),
        "Generating response"
    );

    let response = state.text_provider.generate(&contents).await?;

    Ok(Json(GenerateResponse { response }))
}

/// `POST /api/generate-bard`: canned reply, no upstream call. Any string is
/// echoed, blank ones included.
pub async fn generate_mock(
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(req) = payload?;
    let prompt = Prompt::from_value(req.contents)?;

    Ok(Json(GenerateResponse {
        response: mock_reply(&prompt),
    }))
}
