//! Chat history store trait

use async_trait::async_trait;

use crate::{ConversationPath, HistoryEntry, Result};

/// Per-user chat history persistence
#[async_trait]
pub trait HistoryStore: Send + Sync + 'static {
    /// Append an entry
    async fn save(&self, entry: HistoryEntry) -> Result<()>;

    /// Remove all entries for a user
    async fn delete(&self, user_id: &str) -> Result<()>;

    /// Path decided on the user's most recent turn
    async fn latest_decision(&self, user_id: &str) -> Result<Option<ConversationPath>>;
}
