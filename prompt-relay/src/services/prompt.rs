//! Prompt extraction and the fixed templates the relay applies.

use crate::error::RelayError;
use crate::services::providers::Content;
use serde_json::{json, Value};

/// A prompt as submitted in a request's `contents` field.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Text(String),
    /// Gemini-shaped content; `raw` is what the caller sent.
    Structured { contents: Vec<Content>, raw: Value },
}

impl Prompt {
    /// Accepts a string, an array of strings, an array of content objects,
    /// or a single content object with `parts`.
    pub fn from_value(value: Option<Value>) -> Result<Self, RelayError> {
        let value = value
            .ok_or_else(|| RelayError::InvalidInput("Field \"contents\" is required".to_string()))?;

        match &value {
            Value::String(text) => Ok(Prompt::Text(text.clone())),
            Value::Array(items) if items.is_empty() => Err(RelayError::InvalidInput(
                "Field \"contents\" must not be empty".to_string(),
            )),
            Value::Array(items) if items.iter().all(Value::is_string) => {
                let parts = items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|text| json!({ "text": text }))
                    .collect::<Vec<_>>();
                let content = serde_json::from_value(json!({ "role": "user", "parts": parts }))
                    .map_err(malformed)?;
                Ok(Prompt::Structured {
                    contents: vec![content],
                    raw: value,
                })
            }
            Value::Array(items) if items.iter().all(has_parts) => Ok(Prompt::Structured {
                contents: serde_json::from_value(value.clone()).map_err(malformed)?,
                raw: value,
            }),
            Value::Object(_) if has_parts(&value) => Ok(Prompt::Structured {
                contents: vec![serde_json::from_value(value.clone()).map_err(malformed)?],
                raw: value,
            }),
            _ => Err(RelayError::InvalidInput(
                "Field \"contents\" must be a string or Gemini content".to_string(),
            )),
        }
    }

    /// Rejects blank text; a prompt bound for the provider needs content.
    pub fn non_blank(self) -> Result<Self, RelayError> {
        match &self {
            Prompt::Text(text) if text.trim().is_empty() => Err(RelayError::InvalidInput(
                "Field \"contents\" must not be empty".to_string(),
            )),
            _ => Ok(self),
        }
    }

    pub fn into_contents(self) -> Vec<Content> {
        match self {
            Prompt::Text(text) => vec![Content::user_text(text)],
            Prompt::Structured { contents, .. } => contents,
        }
    }

    /// Text form used when echoing the prompt back.
    pub fn render(&self) -> String {
        match self {
            Prompt::Text(text) => text.clone(),
            Prompt::Structured { raw, .. } => raw.to_string(),
        }
    }
}

fn has_parts(value: &Value) -> bool {
    value.get("parts").is_some_and(Value::is_array)
}

fn malformed(err: serde_json::Error) -> RelayError {
    RelayError::InvalidInput(format!("Malformed contents: {}", err))
}

/// Canned answer of the mock generation endpoint.
pub fn mock_reply(prompt: &Prompt) -> String {
    format!("[Bard LLM] You asked: {}", prompt.render())
}

/// Body posted upstream for a chat message.
pub fn chat_payload(message: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": message }] }]
    })
}

pub fn recommendation_prompt(context: &str, question: &str) -> String {
    format!("Based on the following data:\n{context}\n\nQuestion: {question}")
}
