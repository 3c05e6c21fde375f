//! Request and response bodies of the relay endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Body of `/api/generate` and `/api/generate-bard`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Plain text or Gemini-shaped content.
    #[serde(default)]
    pub contents: Option<Value>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(required(message = "Field \"message\" is required"))]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[validate(required(message = "Field \"context\" is required"))]
    pub context: Option<String>,

    #[validate(required(message = "Field \"question\" is required"))]
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// Used for both outcomes of `/api/llm-recommendation`; failures carry
/// `"Error: <message>"`.
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendation: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
