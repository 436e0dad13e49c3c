//! Centralized constants
//!
//! Single source of truth for defaults used across crates.

/// Service endpoints
pub mod endpoints {
    /// OpenAI API endpoint
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// Typhoon (OpenAI-compatible) endpoint
    pub const TYPHOON_DEFAULT: &str = "https://api.opentyphoon.ai/v1";

    /// Azure AI Search REST API version
    pub const AZURE_SEARCH_API_VERSION: &str = "2024-07-01";
}

/// Default model names
pub mod models {
    pub const EMBEDDING_DEFAULT: &str = "text-embedding-3-large";
    pub const CLASSIFIER_DEFAULT: &str = "gpt-4o-mini";
    pub const ANSWER_DEFAULT: &str = "typhoon-v2-70b-instruct";
}

/// Cache time-to-live (seconds)
pub mod cache {
    /// Embeddings are a pure function of text and model
    pub const EMBEDDING_TTL_SECS: u64 = 24 * 3600;

    /// Search results track index updates
    pub const SEARCH_TTL_SECS: u64 = 3600;

    /// Entry bound for the in-process store
    pub const MAX_ENTRIES: usize = 10_000;

    /// Namespace prefix for embedding keys
    pub const EMBED_PREFIX: &str = "embed";

    /// Namespace prefix for search keys
    pub const SEARCH_PREFIX: &str = "search";
}

/// Outbound chat rate limits
pub mod rate_limit {
    pub const PER_SECOND_CALLS: usize = 5;
    pub const PER_MINUTE_CALLS: usize = 200;
}

/// Hybrid search defaults
pub mod search {
    /// Nearest-neighbour candidate pool
    pub const KNN: usize = 100;

    /// Vector field in both indexes
    pub const VECTOR_FIELD: &str = "text_vector";

    /// Results per page
    pub const DEFAULT_TOP_K: usize = 3;

    /// Separator line between formatted result blocks
    pub const RESULT_SEPARATOR: &str = "=================\n";
}

/// Per-operation generation parameters: (temperature, max_tokens)
pub mod generation {
    pub const CLASSIFY: (f32, u32) = (0.3, 10);
    pub const SUMMARIZE_HISTORY: (f32, u32) = (0.5, 1000);
    pub const SUMMARIZE_FOR_RETRIEVAL: (f32, u32) = (0.2, 200);
    pub const ANSWER: (f32, u32) = (0.7, 700);
}

/// Conversation defaults
pub mod conversation {
    /// History longer than this is compacted before use
    pub const HISTORY_MAX_CHARS: usize = 3000;
}

/// Timeouts
pub mod timeouts {
    /// Provider request timeout (seconds)
    pub const PROVIDER_REQUEST_SECS: u64 = 60;
}
