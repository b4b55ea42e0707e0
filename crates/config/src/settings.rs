//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM completion endpoint configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Response composer configuration
    #[serde(default)]
    pub composer: ComposerConfig,

    /// Catalog data location
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Session limits
    #[serde(default)]
    pub session: SessionConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Optional path to a lexicon override file (YAML)
    #[serde(default)]
    pub lexicon_path: Option<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// LLM completion endpoint configuration
///
/// The API key is a required secret; an empty key fails validation at
/// startup rather than producing a request with an empty bearer header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Chat-completions endpoint base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Bearer token; supplied via SHOPCHAT__LLM__API_KEY or config file
    #[serde(default)]
    pub api_key: String,

    /// Token budget per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds; bounds the single network call
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

fn default_llm_endpoint() -> String {
    "https://api.perplexity.ai".to_string()
}
fn default_llm_model() -> String {
    "sonar-pro".to_string()
}
fn default_max_tokens() -> usize {
    1000
}
fn default_temperature() -> f32 {
    1.0
}
fn default_llm_timeout() -> u64 {
    30
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

/// Which response strategy the composer runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Greeting template / local catalog filter / LLM only for order+FAQ
    #[default]
    LocalFirst,
    /// Every non-greeting message goes to the LLM
    Delegate,
}

/// How the delegate strategy expects products in the completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DelegationFormat {
    /// Strict JSON envelope {"text": ..., "products": [...]}
    #[default]
    Envelope,
    /// Legacy [PRODUCTS] marker with an embedded JSON array
    Marker,
}

/// Response composer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComposerConfig {
    #[serde(default)]
    pub strategy: StrategyKind,

    #[serde(default)]
    pub delegation_format: DelegationFormat,
}

/// Catalog data location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding products.json, faqs.json, shipping.json
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Session limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum concurrent sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle timeout before a session is eligible for eviction, seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

fn default_max_sessions() -> usize {
    100
}
fn default_idle_timeout() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings; called once at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_llm()?;
        self.validate_session()?;
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.api_key".to_string()));
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", self.llm.temperature),
            });
        }

        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_seconds".to_string(),
                message: "Must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        if self.session.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("SHOPCHAT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.llm.model, "sonar-pro");
        assert_eq!(settings.composer.strategy, StrategyKind::LocalFirst);
    }

    #[test]
    fn test_missing_api_key_is_startup_error() {
        let settings = Settings::default();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::MissingField(field)) if field == "llm.api_key"
        ));
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        settings.llm.api_key = "pplx-test".to_string();
        assert!(settings.validate().is_ok());

        settings.llm.temperature = 3.0;
        assert!(settings.validate().is_err());

        settings.llm.temperature = 1.0;
        settings.llm.max_tokens = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_strategy_deserialization() {
        let composer: ComposerConfig =
            serde_yaml::from_str("strategy: delegate\ndelegation_format: marker").unwrap();
        assert_eq!(composer.strategy, StrategyKind::Delegate);
        assert_eq!(composer.delegation_format, DelegationFormat::Marker);
    }
}
