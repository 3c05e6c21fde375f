//! Generation provider abstraction.
//!
//! Handlers only see `TextProvider`; the Gemini client and the local mock
//! are interchangeable behind it.

pub mod gemini;
pub mod mock;

use crate::error::RelayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One turn of Gemini-shaped content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// Text parts joined with newlines; non-text parts are skipped.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text, .. } => Some(text.as_str()),
                Part::Other(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A content part. Keys other than `text` (thought signatures, inline data,
/// file references, ...) are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Other(Map<String, Value>),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            extra: Map::new(),
        }
    }
}

/// Upstream reply relayed without reshaping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short identifier for logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Generate text for the given conversation.
    async fn generate(&self, contents: &[Content]) -> Result<String, RelayError>;

    /// Post a caller-built `generateContent` payload and return the reply as-is.
    async fn forward(&self, payload: &Value) -> Result<RawResponse, RelayError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), RelayError>;
}
