//! Core traits and types for the insurance RAG assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Collaborator traits (chat model, embeddings, search, cache, history)
//! - Conversation path and history entry types
//! - LLM request/response types
//! - Search request types
//! - Error types

pub mod conversation;
pub mod error;
pub mod llm_types;
pub mod search;
pub mod traits;

pub use conversation::{bangkok_now, ConversationPath, HistoryEntry, TurnRole};
pub use error::{Error, Result};
pub use llm_types::{FinishReason, GenerateRequest, GenerateResponse, Message, Role, TokenUsage};
pub use search::{SearchHit, SearchRequest, SearchTarget, VectorQuery};

pub use traits::{CacheStore, EmbeddingProvider, HistoryStore, LanguageModel, SearchProvider};
