//! Language Model trait

use async_trait::async_trait;

use crate::{GenerateRequest, GenerateResponse, Result};

/// Chat-completion interface
///
/// Implementations:
/// - `OpenAIBackend` - OpenAI and OpenAI-compatible APIs (Typhoon)
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = Arc::new(OpenAIBackend::new(config)?);
/// let request = GenerateRequest::new("You are a classification model")
///     .with_user_message("ประกันชีวิตมีแบบไหนบ้าง")
///     .with_max_tokens(10);
/// let response = llm.generate(request).await?;
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate a completion
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
