//! Cache key derivation and TTL policy
//!
//! Keys are namespaced so embedding and search entries, and product and
//! service searches, can never collide:
//!
//! ```text
//! embed:<sha256(normalized text)>
//! search:prd:<sha256(trimmed query)>|<top_k>|<skip_k>
//! search:svc:<sha256(trimmed query)>|<top_k>|<skip_k>
//! ```

use std::fmt;
use std::time::Duration;

use sha2::{Digest, Sha256};

use subsin_config::constants::cache::{EMBED_PREFIX, SEARCH_PREFIX};
use subsin_config::CacheConfig;
use subsin_core::SearchTarget;

/// Namespaced cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of cached payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Embedding,
    Search,
}

impl CacheKind {
    /// Metrics label
    pub fn label(&self) -> &'static str {
        match self {
            CacheKind::Embedding => "embedding",
            CacheKind::Search => "search",
        }
    }
}

/// Text as sent to the embedding provider: newlines become spaces, then trimmed
pub fn normalize_embedding_text(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

fn digest_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Key for an embedding of `text`
pub fn embedding_key(text: &str) -> CacheKey {
    let key = format!("{}:{}", EMBED_PREFIX, digest_hex(&normalize_embedding_text(text)));
    tracing::trace!(key = %key, "Derived embedding key");
    CacheKey(key)
}

/// Key for one page of search results
pub fn search_key(query: &str, top_k: usize, skip_k: usize, target: SearchTarget) -> CacheKey {
    let key = format!(
        "{}:{}:{}|{}|{}",
        SEARCH_PREFIX,
        target.cache_tag(),
        digest_hex(query.trim()),
        top_k,
        skip_k
    );
    tracing::trace!(key = %key, "Derived search key");
    CacheKey(key)
}

/// Time-to-live per payload kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub embedding: Duration,
    pub search: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl TtlPolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            embedding: Duration::from_secs(config.embedding_ttl_secs),
            search: Duration::from_secs(config.search_ttl_secs),
        }
    }

    pub fn ttl_for(&self, kind: CacheKind) -> Duration {
        match kind {
            CacheKind::Embedding => self.embedding,
            CacheKind::Search => self.search,
        }
    }
}
