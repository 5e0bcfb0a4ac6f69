//! Sitetox-Reasoning: Reasoning Service Boundary for sitetox
//!
//! This crate provides the natural-language reasoning layer. The rest of the
//! system only sees [`ReasoningService::generate`]: prompt text in, free text
//! out, or a [`ReasoningError`]. No structured output is requested from the
//! model; verdicts are recovered downstream from the reply's last line.
//!
//! ## Layer 1 - External Reasoning
//!
//! Focus: faithful transport of prompts and replies, with failures reported
//! rather than retried.

mod error;
pub mod fakes;
mod gemini;

pub use error::ReasoningError;
pub use gemini::{GeminiClient, GeminiConfig};

use async_trait::async_trait;

/// Result type for reasoning-service calls
pub type Result<T> = std::result::Result<T, ReasoningError>;

/// A black-box text generator.
///
/// One call is one blocking request; implementations must not retry.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
