//! Configuration management for the shopchat assistant
//!
//! Supports loading configuration from:
//! - YAML files (config/default.yaml, config/{env}.yaml)
//! - Environment variables (SHOPCHAT prefix)
//!
//! The keyword lexicon driving the lexical classifier lives in
//! [`lexicon::Lexicon`]: compiled-in defaults with an optional YAML
//! override file.

pub mod lexicon;
pub mod settings;

pub use lexicon::{CategorySynonyms, Lexicon};
pub use settings::{
    load_settings, CatalogConfig, ComposerConfig, DelegationFormat, LlmSettings,
    ObservabilityConfig, RuntimeEnvironment, ServerConfig, SessionConfig, Settings, StrategyKind,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for shopchat_core::Error {
    fn from(err: ConfigError) -> Self {
        shopchat_core::Error::Config(err.to_string())
    }
}
