//! Shared error type
//!
//! Each crate defines its own error enum and converts into this one at
//! the crate boundary.

use thiserror::Error;

/// Top-level error for the shopchat workspace
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Session error: {0}")]
    Session(String),
}

/// Result alias using the shared error type
pub type Result<T> = std::result::Result<T, Error>;
