//! Collaborator traits
//!
//! Every external service the assistant talks to sits behind one of these
//! traits so that real clients and test fakes are interchangeable:
//!
//! ```text
//! Generation:
//!   - LanguageModel: chat completion (classifier/summariser, answer model)
//!
//! Retrieval:
//!   - EmbeddingProvider: text -> dense vector
//!   - SearchProvider: hybrid keyword + vector search over an index
//!
//! State:
//!   - CacheStore: key/value bytes with TTL
//!   - HistoryStore: per-user chat history
//! ```

mod cache;
mod embedding;
mod history;
mod llm;
mod search;

pub use cache::CacheStore;
pub use embedding::EmbeddingProvider;
pub use history::HistoryStore;
pub use llm::LanguageModel;
pub use search::SearchProvider;
