//! Error types for sitetox-reasoning

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when calling the reasoning service
#[derive(Error, Debug)]
pub enum ReasoningError {
    /// Missing API key or malformed settings
    #[error("reasoning service configuration error: {0}")]
    Config(String),

    /// Network or transport failure
    #[error("reasoning request failed: {0}")]
    Http(String),

    /// Provider quota hit (HTTP 429)
    #[error("rate limited by reasoning service: {message}")]
    RateLimited {
        message: String,
        /// The provider's `Retry-After` hint. Logged only; calls are never retried.
        retry_after: Option<Duration>,
    },

    /// Provider answered with a non-success status
    #[error("reasoning service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// The prompt or reply was blocked by the provider's safety filter
    #[error("response blocked: {reason}")]
    Blocked { reason: String },

    /// Success status but no text in the reply
    #[error("reasoning service returned no text")]
    EmptyResponse,

    /// Response body could not be decoded
    #[error("invalid reasoning service response: {0}")]
    Deserialization(String),

    /// Fault injected by a fake service
    #[error("injected failure: {0}")]
    Injected(String),
}

impl ReasoningError {
    /// Short error code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Http(_) => "http_error",
            Self::RateLimited { .. } => "rate_limited",
            Self::Service { .. } => "service_error",
            Self::Blocked { .. } => "blocked",
            Self::EmptyResponse => "empty_response",
            Self::Deserialization(_) => "invalid_response",
            Self::Injected(_) => "injected",
        }
    }
}

impl From<reqwest::Error> for ReasoningError {
    fn from(err: reqwest::Error) -> Self {
        ReasoningError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for ReasoningError {
    fn from(err: serde_json::Error) -> Self {
        ReasoningError::Deserialization(err.to_string())
    }
}
