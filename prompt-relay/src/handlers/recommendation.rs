use super::{log_failure, require_text};
use crate::dtos::{RecommendationRequest, RecommendationResponse};
use crate::error::RelayError;
use crate::services::prompt::recommendation_prompt;
use crate::services::providers::Content;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use validator::{Validate, ValidationErrors};

/// Failure body of the recommendation endpoint:
/// `{"recommendation": "Error: <message>"}`.
#[derive(Debug)]
pub struct RecommendationError(pub RelayError);

impl From<RelayError> for RecommendationError {
    fn from(err: RelayError) -> Self {
        RecommendationError(err)
    }
}

impl From<JsonRejection> for RecommendationError {
    fn from(err: JsonRejection) -> Self {
        RecommendationError(err.into())
    }
}

impl From<ValidationErrors> for RecommendationError {
    fn from(err: ValidationErrors) -> Self {
        RecommendationError(err.into())
    }
}

impl IntoResponse for RecommendationError {
    fn into_response(self) -> Response {
        log_failure(&self.0);
        (
            self.0.status(),
            Json(RecommendationResponse {
                recommendation: format!("Error: {}", self.0.message()),
            }),
        )
            .into_response()
    }
}

/// `POST /api/llm-recommendation`: wrap the caller's data and question in
/// the recommendation template and ask the provider.
pub async fn llm_recommendation(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendationResponse>, RecommendationError> {
    let Json(req) = payload?;
    req.validate()?;

    let context = require_text("context", req.context)?;
    let question = require_text("question", req.question)?;
    let prompt = recommendation_prompt(&context, &question);

    tracing::info!(
        provider = state.text_provider.name(),
        prompt_len = prompt.len(),
        "Requesting recommendation"
    );

    let recommendation = state
        .text_provider
        .generate(&[Content::user_text(prompt)])
        .await?;

    Ok(Json(RecommendationResponse { recommendation }))
}
