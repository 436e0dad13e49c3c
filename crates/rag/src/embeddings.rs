//! Embeddings
//!
//! [`OpenAIEmbedder`] calls the OpenAI embeddings API. [`EmbeddingGateway`]
//! puts a best-effort cache in front of any [`EmbeddingProvider`]: cache
//! failures are logged and the provider is called directly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use subsin_config::OpenAiSettings;
use subsin_core::{CacheStore, EmbeddingProvider};

use crate::cache_key::{embedding_key, normalize_embedding_text, CacheKind};
use crate::RagError;

/// OpenAI embedding configuration
#[derive(Debug, Clone)]
pub struct OpenAIEmbeddingConfig {
    /// API endpoint
    pub endpoint: String,
    pub api_key: String,
    /// Model name
    pub model: String,
    pub timeout: Duration,
}

impl Default for OpenAIEmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: subsin_config::constants::endpoints::OPENAI_DEFAULT.to_string(),
            api_key: String::new(),
            model: subsin_config::constants::models::EMBEDDING_DEFAULT.to_string(),
            timeout: Duration::from_secs(subsin_config::constants::timeouts::PROVIDER_REQUEST_SECS),
        }
    }
}

impl OpenAIEmbeddingConfig {
    pub fn from_settings(settings: &OpenAiSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            model: settings.embedding_model.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Request to the embeddings API
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response from the embeddings API
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

/// OpenAI embeddings client
pub struct OpenAIEmbedder {
    client: Client,
    config: OpenAIEmbeddingConfig,
}

impl OpenAIEmbedder {
    pub fn new(config: OpenAIEmbeddingConfig) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.config.endpoint.trim_end_matches('/'))
    }

    async fn embed_raw(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: text,
        };

        let response = self
            .client
            .post(self.embeddings_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Connection(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!(
                "OpenAI embedding failed: {} - {}",
                status, text
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("Failed to parse embedding response: {}", e)))?;

        embed_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RagError::Embedding("No embedding returned".to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> subsin_core::Result<Vec<f32>> {
        Ok(self.embed_raw(text).await?)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Cache-then-compute embedding lookup
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl EmbeddingGateway {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            ttl,
        }
    }

    /// Embedding for `text`, served from cache when present
    pub async fn embed(&self, text: &str) -> subsin_core::Result<Vec<f32>> {
        let key = embedding_key(text);

        if let Some(vector) = self.lookup(key.as_str()).await {
            return Ok(vector);
        }

        let normalized = normalize_embedding_text(text);
        let vector = self.provider.embed(&normalized).await?;

        match serde_json::to_vec(&vector) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(key.as_str(), bytes, self.ttl).await {
                    tracing::warn!(key = %key, error = %e, "Embedding cache write failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode embedding for cache"),
        }

        Ok(vector)
    }

    async fn lookup(&self, key: &str) -> Option<Vec<f32>> {
        let outcome = match self.cache.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<f32>>(&bytes) {
                Ok(vector) => {
                    record_lookup("hit");
                    tracing::debug!(key = %key, dim = vector.len(), "Embedding cache hit");
                    return Some(vector);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding undecodable cached embedding");
                    "corrupt"
                }
            },
            Ok(None) => "miss",
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Embedding cache read failed");
                "error"
            }
        };

        record_lookup(outcome);
        tracing::debug!(key = %key, outcome, "Embedding cache miss");
        None
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }
}

fn record_lookup(outcome: &'static str) {
    metrics::counter!(
        "subsin_cache_lookups_total",
        "cache" => CacheKind::Embedding.label(),
        "outcome" => outcome
    )
    .increment(1);
}
