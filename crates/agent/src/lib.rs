//! Conversation policy for the insurance assistant
//!
//! Features:
//! - Five-way intent classification with a fail-safe default
//! - History compaction that rewrites stored history
//! - Retrieval-focused summaries of follow-up questions
//! - Persona-constrained answer drafting
//! - Turn orchestration over product / service search
//! - In-memory history store

pub mod assistant;
pub mod factory;
pub mod history;
pub mod policy;
pub mod prompt;

pub use assistant::{InsuranceAssistant, RetrievalState, TurnOutcome};
pub use factory::build_assistant;
pub use history::InMemoryHistoryStore;
pub use policy::ConversationPolicy;
pub use prompt::render;

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// Provider or store failure, passed through unchanged
    #[error(transparent)]
    Provider(#[from] subsin_core::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("Initialization error: {0}")]
    Initialization(String),
}

impl From<subsin_llm::LlmError> for AgentError {
    fn from(err: subsin_llm::LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}

impl From<subsin_rag::RagError> for AgentError {
    fn from(err: subsin_rag::RagError) -> Self {
        AgentError::Rag(err.to_string())
    }
}

impl From<AgentError> for subsin_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Provider(inner) => inner,
            AgentError::Llm(msg) => subsin_core::Error::Llm(msg),
            AgentError::Rag(msg) => subsin_core::Error::Rag(msg),
            AgentError::Initialization(msg) => subsin_core::Error::Config(msg),
        }
    }
}
