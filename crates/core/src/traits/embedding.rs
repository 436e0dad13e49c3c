//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Turns text into a fixed-dimension dense vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + 'static {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
