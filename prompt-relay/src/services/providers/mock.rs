//! Mock provider for local runs and tests.

use super::{Content, RawResponse, TextProvider};
use crate::error::RelayError;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Echoes the prompt back without any network traffic.
pub struct MockTextProvider {
    failure: Option<RelayError>,
}

impl MockTextProvider {
    pub fn new() -> Self {
        Self { failure: None }
    }

    /// A provider whose every call fails with `error`.
    pub fn failing(error: RelayError) -> Self {
        Self {
            failure: Some(error),
        }
    }

    fn check(&self) -> Result<(), RelayError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn respond_to(prompt: &str) -> String {
        format!("Mock response for: {}", prompt)
    }
}

impl Default for MockTextProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn prompt_text(contents: &[Content]) -> String {
    contents
        .iter()
        .map(Content::text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, contents: &[Content]) -> Result<String, RelayError> {
        self.check()?;
        Ok(Self::respond_to(&prompt_text(contents)))
    }

    async fn forward(&self, payload: &Value) -> Result<RawResponse, RelayError> {
        self.check()?;

        let contents: Vec<Content> = payload
            .get("contents")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| RelayError::InvalidInput(format!("Malformed contents: {}", e)))?
            .unwrap_or_default();

        Ok(RawResponse {
            status: 200,
            body: json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": Self::respond_to(&prompt_text(&contents))}]
                    },
                    "finishReason": "STOP"
                }]
            }),
        })
    }

    async fn health_check(&self) -> Result<(), RelayError> {
        self.check()
    }
}
