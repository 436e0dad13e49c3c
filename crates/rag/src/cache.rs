//! In-process TTL cache store
//!
//! Stand-in for an external key-value cache, built on moka's async cache.
//! Each entry carries the TTL it was written with; capacity is bounded by
//! `CacheConfig::max_entries`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

use subsin_config::CacheConfig;
use subsin_core::CacheStore;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    ttl: Duration,
}

/// Expires every entry after the TTL passed to `set`; overwrites restart it
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// `CacheStore` backed by `moka::future::Cache`
#[derive(Clone)]
pub struct InMemoryCacheStore {
    entries: Cache<String, CacheEntry>,
}

impl InMemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries.max(1) as u64)
                .expire_after(EntryTtl)
                .build(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries)
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> subsin_core::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> subsin_core::Result<()> {
        self.entries
            .insert(key.to_string(), CacheEntry { value, ttl })
            .await;
        Ok(())
    }
}
