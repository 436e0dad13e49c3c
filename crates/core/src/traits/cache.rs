//! Cache store trait

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Key/value store with per-entry time-to-live
///
/// Values are opaque bytes; callers own serialization. Implementations must
/// be safe to share across concurrent requests.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Fetch a live entry, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store an entry, replacing any previous value
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}
