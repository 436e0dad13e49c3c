//! Configuration management for the insurance RAG assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (`SUBSIN__` prefix, `__` separator)
//! - Provider credentials from their conventional variables
//!   (`OPENAI_API_KEY`, `TYPHOON_API_KEY`, `AZURE_SEARCH_KEY`, ...)

pub mod constants;
pub mod observability;
pub mod prompts;
pub mod settings;

pub use observability::init_tracing;
pub use prompts::PromptTemplates;
pub use settings::{
    load_settings, load_settings_from, CacheConfig, ConversationConfig, LogFormat,
    ObservabilityConfig, OpenAiSettings, RateLimitConfig, RuntimeEnvironment, SearchSettings,
    Settings, TyphoonSettings,
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
