//! Main settings module

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{cache, conversation, endpoints, models, rate_limit, search, timeouts};
use crate::{ConfigError, PromptTemplates};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - missing credentials are tolerated
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode - credentials and endpoints are required
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
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// OpenAI: embeddings, classification and summarisation
    #[serde(default)]
    pub openai: OpenAiSettings,

    /// Typhoon: persona-driven final answers
    #[serde(default)]
    pub typhoon: TyphoonSettings,

    /// Azure AI Search indexes
    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub prompts: PromptTemplates,
}

fn env_or(var: &str, fallback: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| fallback.to_string())
}

fn default_timeout_secs() -> u64 {
    timeouts::PROVIDER_REQUEST_SECS
}

/// OpenAI provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_openai_api_key", skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Model used for classification and summaries
    #[serde(default = "default_classifier_model")]
    pub chat_model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_openai_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}

fn default_openai_api_key() -> String {
    env_or("OPENAI_API_KEY", "")
}

fn default_embedding_model() -> String {
    env_or("OPENAI_EMBEDDING_MODEL", models::EMBEDDING_DEFAULT)
}

fn default_classifier_model() -> String {
    env_or("OPENAI_CHAT_MODEL", models::CLASSIFIER_DEFAULT)
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_openai_endpoint(),
            api_key: default_openai_api_key(),
            embedding_model: default_embedding_model(),
            chat_model: default_classifier_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Typhoon provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TyphoonSettings {
    #[serde(default = "default_typhoon_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_typhoon_api_key", skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_answer_model")]
    pub chat_model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_typhoon_endpoint() -> String {
    endpoints::TYPHOON_DEFAULT.to_string()
}

fn default_typhoon_api_key() -> String {
    env_or("TYPHOON_API_KEY", "")
}

fn default_answer_model() -> String {
    env_or("TYPHOON_CHAT_MODEL", models::ANSWER_DEFAULT)
}

impl Default for TyphoonSettings {
    fn default() -> Self {
        Self {
            endpoint: default_typhoon_endpoint(),
            api_key: default_typhoon_api_key(),
            chat_model: default_answer_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Azure AI Search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_search_api_key", skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_product_index")]
    pub product_index: String,

    #[serde(default = "default_service_index")]
    pub service_index: String,

    #[serde(default = "default_search_api_version")]
    pub api_version: String,

    #[serde(default = "default_vector_field")]
    pub vector_field: String,

    /// Nearest-neighbour candidate pool for the vector leg
    #[serde(default = "default_knn")]
    pub knn: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_endpoint() -> String {
    env_or("AZURE_SEARCH_ENDPOINT", "")
}

fn default_search_api_key() -> String {
    env_or("AZURE_SEARCH_KEY", "")
}

fn default_product_index() -> String {
    env_or("AZURE_SEARCH_INDEX", "insurance-products")
}

fn default_service_index() -> String {
    env_or("AZURE_SEARCH_INDEX_INSURANCE_SERVICE", "insurance-services")
}

fn default_search_api_version() -> String {
    endpoints::AZURE_SEARCH_API_VERSION.to_string()
}

fn default_vector_field() -> String {
    search::VECTOR_FIELD.to_string()
}

fn default_knn() -> usize {
    search::KNN
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key: default_search_api_key(),
            product_index: default_product_index(),
            service_index: default_service_index(),
            api_version: default_search_api_version(),
            vector_field: default_vector_field(),
            knn: default_knn(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Cache TTLs and bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_embedding_ttl")]
    pub embedding_ttl_secs: u64,

    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_embedding_ttl() -> u64 {
    cache::EMBEDDING_TTL_SECS
}

fn default_search_ttl() -> u64 {
    cache::SEARCH_TTL_SECS
}

fn default_max_entries() -> usize {
    cache::MAX_ENTRIES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            embedding_ttl_secs: default_embedding_ttl(),
            search_ttl_secs: default_search_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

/// Outbound chat rate limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum chat calls in any 1-second window
    #[serde(default = "default_per_second")]
    pub per_second: usize,

    /// Maximum chat calls in any 60-second window
    #[serde(default = "default_per_minute")]
    pub per_minute: usize,
}

fn default_per_second() -> usize {
    rate_limit::PER_SECOND_CALLS
}

fn default_per_minute() -> usize {
    rate_limit::PER_MINUTE_CALLS
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: default_per_second(),
            per_minute: default_per_minute(),
        }
    }
}

/// Turn handling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// History longer than this (in characters) is compacted
    #[serde(default = "default_history_max_chars")]
    pub history_max_chars: usize,

    /// Results per search page
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_history_max_chars() -> usize {
    conversation::HISTORY_MAX_CHARS
}

fn default_top_k() -> usize {
    search::DEFAULT_TOP_K
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_max_chars: default_history_max_chars(),
            top_k: default_top_k(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_limits()?;
        self.validate_search()?;
        self.validate_credentials()?;
        Ok(())
    }

    fn validate_limits(&self) -> Result<(), ConfigError> {
        if self.rate_limit.per_second == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit.per_second".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.rate_limit.per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit.per_minute".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.cache.embedding_ttl_secs == 0 || self.cache.search_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache".to_string(),
                message: "TTLs must be at least 1 second".to_string(),
            });
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.max_entries".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.conversation.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "conversation.top_k".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_search(&self) -> Result<(), ConfigError> {
        if self.search.knn == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.knn".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.search.knn < self.conversation.top_k {
            tracing::warn!(
                knn = self.search.knn,
                top_k = self.conversation.top_k,
                "search.knn is smaller than conversation.top_k; vector leg will limit results"
            );
        }

        Ok(())
    }

    /// Credentials are mandatory in production, advisory elsewhere
    fn validate_credentials(&self) -> Result<(), ConfigError> {
        let required = [
            ("openai.api_key", &self.openai.api_key),
            ("typhoon.api_key", &self.typhoon.api_key),
            ("search.endpoint", &self.search.endpoint),
            ("search.api_key", &self.search.api_key),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        if self.environment.is_production() {
            return Err(ConfigError::MissingField(missing.join(", ")));
        }

        tracing::warn!(missing = ?missing, "Provider credentials not configured");
        Ok(())
    }
}

/// Load settings from `config/` and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (`SUBSIN__` prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit configuration directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(
        File::with_name(&dir.join("default").to_string_lossy()).required(false),
    );

    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&dir.join(env_name).to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("SUBSIN")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
