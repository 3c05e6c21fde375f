//! Failure kinds surfaced by the relay handlers.

use axum::http::StatusCode;
use thiserror::Error;

/// Every relay failure falls into one of these kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The caller sent something we cannot turn into an upstream request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The upstream service could not be reached.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream service answered, but not with usable output.
    #[error("Upstream error: {0}")]
    UpstreamError(String),
}

impl RelayError {
    /// Relay callers only ever see 200 or 500; the kind is carried in the
    /// message and the logs.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidInput(_)
            | RelayError::UpstreamUnavailable(_)
            | RelayError::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The bare message, without the kind prefix. This is what callers see.
    pub fn message(&self) -> &str {
        match self {
            RelayError::InvalidInput(msg)
            | RelayError::UpstreamUnavailable(msg)
            | RelayError::UpstreamError(msg) => msg,
        }
    }

    /// Stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidInput(_) => "invalid_input",
            RelayError::UpstreamUnavailable(_) => "upstream_unavailable",
            RelayError::UpstreamError(_) => "upstream_error",
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            RelayError::UpstreamUnavailable(err.to_string())
        } else {
            RelayError::UpstreamError(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for RelayError {
    fn from(err: validator::ValidationErrors) -> Self {
        RelayError::InvalidInput(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for RelayError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        RelayError::InvalidInput(err.body_text())
    }
}
