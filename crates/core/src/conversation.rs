//! Conversation types
//!
//! The five conversation paths the classifier routes between, and the
//! history entries persisted by the history store.

use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Bangkok is UTC+07:00 all year (no daylight saving)
pub const BANGKOK_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Current wall-clock time in Bangkok
pub fn bangkok_now() -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(BANGKOK_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset)
}

/// Conversation path chosen for a user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationPath {
    /// Questions about services (claims, forms, branches, hospitals...)
    InsuranceService,
    /// Buying, browsing or comparing insurance products
    InsuranceProduct,
    /// Follow-up on something already discussed
    ContinueConversation,
    /// Wants additional products beyond those already shown
    More,
    /// Anything else
    OffTopic,
}

impl ConversationPath {
    pub const ALL: [ConversationPath; 5] = [
        ConversationPath::InsuranceService,
        ConversationPath::InsuranceProduct,
        ConversationPath::ContinueConversation,
        ConversationPath::More,
        ConversationPath::OffTopic,
    ];

    /// Canonical label
    pub fn as_label(&self) -> &'static str {
        match self {
            ConversationPath::InsuranceService => "INSURANCE_SERVICE",
            ConversationPath::InsuranceProduct => "INSURANCE_PRODUCT",
            ConversationPath::ContinueConversation => "CONTINUE_CONVERSATION",
            ConversationPath::More => "MORE",
            ConversationPath::OffTopic => "OFF_TOPIC",
        }
    }

    /// Parse a label, returning `None` for anything unrecognised.
    ///
    /// Input is trimmed and upper-cased; spaces and hyphens are accepted as
    /// word separators so `CONTINUE CONVERSATION` and `OFF-TOPIC` match.
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        Self::ALL
            .into_iter()
            .find(|path| path.as_label() == normalized)
    }
}

impl fmt::Display for ConversationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Who authored a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A persisted chat history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_id: String,
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<FixedOffset>,
    /// Path decided for the turn this entry belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<ConversationPath>,
}

impl HistoryEntry {
    pub fn new(
        user_id: impl Into<String>,
        role: TurnRole,
        content: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
        decision: Option<ConversationPath>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            content: content.into(),
            timestamp,
            decision,
        }
    }
}
