//! Shopchat agent
//!
//! The per-message pipeline: lexical classification, local catalog
//! filtering, response composition and append-only session state.
//!
//! Routing is a single transition per user message with no carried
//! state: greeting template, local filter results, or delegation to the
//! LLM gateway, depending on the configured [`composer::ResponseStrategy`].

pub mod classifier;
pub mod composer;
pub mod filter;
pub mod session;

pub use classifier::{Classification, Classifier, FilterSignals};
pub use composer::{
    build_strategy, DelegateStrategy, LocalFirstStrategy, ResponseStrategy,
};
pub use filter::{FilterEngine, FilterOutcome};
pub use session::{ChatSession, SessionManager};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// A message arrived while a previous one was still being composed
    #[error("Session is busy processing a previous message")]
    Busy,

    #[error("Empty message")]
    EmptyMessage,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session limit reached ({0})")]
    TooManySessions(usize),

    #[error("Gateway error: {0}")]
    Gateway(#[from] shopchat_llm::LlmError),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl From<AgentError> for shopchat_core::Error {
    fn from(err: AgentError) -> Self {
        shopchat_core::Error::Agent(err.to_string())
    }
}
