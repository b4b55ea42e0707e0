//! LLM Gateway
//!
//! One-shot chat-completions client for an OpenAI-compatible endpoint
//! plus the prompt builder that embeds the full catalog as context.
//! One request, one response; no retries, no streaming.

pub mod gateway;
pub mod prompt;

pub use gateway::{ChatCompletionsClient, CompletionGateway, GatewayConfig};
pub use prompt::{PromptBuilder, PromptMode, PRODUCTS_MARKER};

use thiserror::Error;

/// LLM gateway errors
#[derive(Error, Debug)]
pub enum LlmError {
    /// Non-success HTTP status from the completion endpoint
    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

impl From<LlmError> for shopchat_core::Error {
    fn from(err: LlmError) -> Self {
        shopchat_core::Error::Llm(err.to_string())
    }
}
