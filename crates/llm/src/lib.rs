//! Chat-completion integration with outbound rate limiting
//!
//! Features:
//! - OpenAI-compatible backend (OpenAI, Typhoon)
//! - Sliding-window rate limiter
//! - Dual per-second / per-minute chat gate

pub mod backend;
pub mod rate_limit;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use rate_limit::{ChatRateLimiter, RateLimiter};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for subsin_core::Error {
    fn from(err: LlmError) -> Self {
        subsin_core::Error::Llm(err.to_string())
    }
}
