//! Cached retrieval for the insurance assistant
//!
//! Features:
//! - Deterministic, namespaced cache keys with per-kind TTLs
//! - In-process TTL cache store
//! - Cache-then-compute embedding gateway (OpenAI embeddings)
//! - Cache-then-compute hybrid search gateway (Azure AI Search)
//! - Product / service result formatting

pub mod azure_search;
pub mod cache;
pub mod cache_key;
pub mod embeddings;
pub mod format;
pub mod search;

pub use azure_search::{AzureSearchClient, AzureSearchConfig};
pub use cache::InMemoryCacheStore;
pub use cache_key::{embedding_key, search_key, CacheKey, CacheKind, TtlPolicy};
pub use embeddings::{EmbeddingGateway, OpenAIEmbedder, OpenAIEmbeddingConfig};
pub use format::{format_results, FieldLayout, PRODUCT_LAYOUT, SERVICE_LAYOUT};
pub use search::{SearchGateway, SearchGatewayConfig};

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<RagError> for subsin_core::Error {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Embedding(msg) => subsin_core::Error::Embedding(msg),
            RagError::Search(msg) => subsin_core::Error::Search(msg),
            RagError::Cache(msg) => subsin_core::Error::Cache(msg),
            other => subsin_core::Error::Rag(other.to_string()),
        }
    }
}
