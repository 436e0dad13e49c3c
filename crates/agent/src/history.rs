//! In-memory chat history

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use subsin_core::{ConversationPath, HistoryEntry, HistoryStore};

/// `HistoryStore` kept in process memory, keyed by user
#[derive(Default)]
pub struct InMemoryHistoryStore {
    entries: RwLock<HashMap<String, Vec<HistoryEntry>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored entries for a user, oldest first
    pub fn entries(&self, user_id: &str) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// `role: content` lines, oldest first; `None` when nothing is stored
    pub fn transcript(&self, user_id: &str) -> Option<String> {
        let entries = self.entries.read();
        let turns = entries.get(user_id).filter(|turns| !turns.is_empty())?;
        Some(
            turns
                .iter()
                .map(|e| format!("{}: {}", e.role, e.content))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn save(&self, entry: HistoryEntry) -> subsin_core::Result<()> {
        self.entries
            .write()
            .entry(entry.user_id.clone())
            .or_default()
            .push(entry);
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> subsin_core::Result<()> {
        self.entries.write().remove(user_id);
        Ok(())
    }

    async fn latest_decision(&self, user_id: &str) -> subsin_core::Result<Option<ConversationPath>> {
        Ok(self
            .entries
            .read()
            .get(user_id)
            .and_then(|turns| turns.iter().rev().find_map(|e| e.decision)))
    }
}
