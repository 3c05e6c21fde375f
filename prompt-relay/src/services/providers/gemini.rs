//! Gemini provider implementation.
//!
//! Talks to the `generateContent` REST endpoint. The API key travels as the
//! `key` query parameter and is never formatted into URLs or logs.

use super::{Content, Part, RawResponse, TextProvider};
use crate::error::RelayError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub text_model: String,
    pub chat_model: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, client })
    }

    fn api_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.config.api_base, model, method)
    }

    fn key_param(&self) -> [(&str, &str); 1] {
        [("key", self.config.api_key.expose_secret().as_str())]
    }

    async fn post_generate(
        &self,
        model: &str,
        body: &impl Serialize,
    ) -> Result<Response, RelayError> {
        self.client
            .post(self.api_url(model, "generateContent"))
            .query(&self.key_param())
            .json(body)
            .send()
            .await
            .map_err(RelayError::from)
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, contents: &[Content]) -> Result<String, RelayError> {
        let request = GenerateContentRequest { contents };

        tracing::debug!(
            model = %self.config.text_model,
            turns = contents.len(),
            "Sending request to Gemini API"
        );

        let response = self.post_generate(&self.config.text_model, &request).await?;

        if !response.status().is_success() {
            return Err(upstream_failure(response).await);
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| RelayError::UpstreamError(format!("Failed to parse response: {}", e)))?;

        api_response.into_text()
    }

    async fn forward(&self, payload: &Value) -> Result<RawResponse, RelayError> {
        tracing::debug!(
            model = %self.config.chat_model,
            "Forwarding chat payload to Gemini API"
        );

        let response = self.post_generate(&self.config.chat_model, payload).await?;
        let status = response.status().as_u16();

        let body: Value = response.json().await.map_err(|e| {
            RelayError::UpstreamError(format!(
                "Gemini returned a non-JSON body ({}): {}",
                status, e
            ))
        })?;

        Ok(RawResponse { status, body })
    }

    async fn health_check(&self) -> Result<(), RelayError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(RelayError::InvalidInput(
                "Gemini API key not configured".to_string(),
            ));
        }

        // Listing models is the cheapest call that proves the key works.
        let response = self
            .client
            .get(format!("{}/models", self.config.api_base))
            .query(&self.key_param())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(upstream_failure(response).await)
        }
    }
}

/// Turn a non-2xx reply into an error, preferring Gemini's own message.
async fn upstream_failure(response: Response) -> RelayError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorEnvelope>(&error_text) {
        Ok(envelope) => RelayError::UpstreamError(envelope.error.message),
        Err(_) => {
            RelayError::UpstreamError(format!("Gemini API error {}: {}", status, error_text))
        }
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, RelayError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(RelayError::UpstreamError(format!(
                "Prompt was blocked: {}",
                reason
            )));
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            RelayError::UpstreamError("Gemini returned no candidates".to_string())
        })?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(RelayError::UpstreamError(
                "Response was blocked by safety filters".to_string(),
            ));
        }

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| match part {
                        Part::Text { text, .. } => Some(text),
                        Part::Other(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(RelayError::UpstreamError(
                "Gemini returned no text".to_string(),
            ));
        }

        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-test";

    fn provider(api_base: String, timeout: Duration) -> GeminiTextProvider {
        GeminiTextProvider::new(GeminiConfig {
            api_key: Secret::new("test-key".to_string()),
            api_base,
            text_model: MODEL.to_string(),
            chat_model: "gemini-chat".to_string(),
            timeout,
        })
        .unwrap()
    }

    fn provider_for(server: &MockServer) -> GeminiTextProvider {
        provider(format!("{}/v1beta", server.uri()), Duration::from_secs(5))
    }

    fn reply(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn generate_sends_key_and_returns_first_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("Hi there")))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider_for(&server)
            .generate(&[Content::user_text("Hello")])
            .await
            .unwrap();

        assert_eq!(text, "Hi there");
    }

    #[tokio::test]
    async fn generate_joins_multiple_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}
                }]
            })))
            .mount(&server)
            .await;

        let text = provider_for(&server)
            .generate(&[Content::user_text("greet")])
            .await
            .unwrap();

        assert_eq!(text, "Hello, world");
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(&[Content::user_text("Hello")])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RelayError::UpstreamError("API key not valid. Please pass a valid API key.".into())
        );
    }

    #[tokio::test]
    async fn non_json_error_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(&[Content::user_text("Hello")])
            .await
            .unwrap_err();

        match err {
            RelayError::UpstreamError(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn safety_block_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(&[Content::user_text("something dangerous")])
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::UpstreamError(_)));
    }

    #[tokio::test]
    async fn blocked_prompt_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "OTHER"}
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(&[Content::user_text("x")])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RelayError::UpstreamError("Prompt was blocked: OTHER".into())
        );
    }

    #[tokio::test]
    async fn unreachable_upstream_is_unavailable() {
        let provider = provider(
            "http://127.0.0.1:1/v1beta".to_string(),
            Duration::from_secs(5),
        );

        let err = provider
            .generate(&[Content::user_text("Hello")])
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let provider = provider(
            format!("{}/v1beta", server.uri()),
            Duration::from_millis(200),
        );
        let err = provider
            .generate(&[Content::user_text("Hello")])
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn forward_uses_chat_model_and_keeps_error_bodies() {
        let server = MockServer::start().await;
        let upstream = json!({"error": {"code": 429, "message": "Quota exceeded"}});
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-chat:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(429).set_body_json(upstream.clone()))
            .mount(&server)
            .await;

        let raw = provider_for(&server)
            .forward(&json!({"contents": [{"parts": [{"text": "hi"}]}]}))
            .await
            .unwrap();

        assert_eq!(raw.status, 429);
        assert_eq!(raw.body, upstream);
    }

    #[tokio::test]
    async fn health_check_lists_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .mount(&server)
            .await;

        assert!(provider_for(&server).health_check().await.is_ok());
    }
}
