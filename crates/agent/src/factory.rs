//! Wiring from settings
//!
//! Provider clients are constructed once here and shared; the cache and
//! history stores are supplied by the caller.

use std::sync::Arc;

use subsin_config::Settings;
use subsin_core::{CacheStore, HistoryStore};
use subsin_llm::{ChatRateLimiter, OpenAIBackend, OpenAIConfig};
use subsin_rag::{
    AzureSearchClient, AzureSearchConfig, EmbeddingGateway, OpenAIEmbedder,
    OpenAIEmbeddingConfig, SearchGateway, SearchGatewayConfig, TtlPolicy,
};

use crate::assistant::InsuranceAssistant;
use crate::policy::ConversationPolicy;
use crate::AgentError;

/// Build an assistant backed by OpenAI, Typhoon and Azure AI Search
pub fn build_assistant(
    settings: &Settings,
    cache: Arc<dyn CacheStore>,
    history: Arc<dyn HistoryStore>,
) -> Result<InsuranceAssistant, AgentError> {
    let classifier = OpenAIBackend::new(OpenAIConfig::from_openai_settings(&settings.openai))?;
    let answerer = OpenAIBackend::new(OpenAIConfig::from_typhoon_settings(&settings.typhoon))?;
    let embedder = OpenAIEmbedder::new(OpenAIEmbeddingConfig::from_settings(&settings.openai))?;
    let search_client = AzureSearchClient::new(AzureSearchConfig::from_settings(&settings.search))?;

    let ttl = TtlPolicy::from_config(&settings.cache);
    let embeddings = Arc::new(EmbeddingGateway::new(
        Arc::new(embedder),
        cache.clone(),
        ttl.embedding,
    ));
    let search = Arc::new(SearchGateway::new(
        embeddings,
        Arc::new(search_client),
        cache,
        SearchGatewayConfig::from_settings(&settings.search, &settings.cache),
    ));

    let policy = ConversationPolicy::new(
        Arc::new(classifier),
        Arc::new(answerer),
        history,
        Arc::new(ChatRateLimiter::from_config(&settings.rate_limit)),
        settings.prompts.clone(),
    );

    tracing::info!(
        classifier = %settings.openai.chat_model,
        answerer = %settings.typhoon.chat_model,
        embedding = %settings.openai.embedding_model,
        product_index = %settings.search.product_index,
        service_index = %settings.search.service_index,
        "Insurance assistant initialised"
    );

    Ok(InsuranceAssistant::new(
        policy,
        search,
        settings.conversation.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::InMemoryHistoryStore;
    use subsin_rag::InMemoryCacheStore;

    fn configured() -> Settings {
        let mut settings = Settings::default();
        settings.openai.api_key = "sk-test".to_string();
        settings.typhoon.api_key = "tp-test".to_string();
        settings.search.endpoint = "https://thaigroup.search.windows.net".to_string();
        settings.search.api_key = "az-test".to_string();
        settings
    }

    fn stores() -> (Arc<dyn CacheStore>, Arc<dyn HistoryStore>) {
        (
            Arc::new(InMemoryCacheStore::new(16)),
            Arc::new(InMemoryHistoryStore::new()),
        )
    }

    #[test]
    fn test_build_with_credentials() {
        let (cache, history) = stores();
        let assistant = build_assistant(&configured(), cache, history).unwrap();
        assert!(assistant.retrieval_state("u1").is_none());
    }

    #[test]
    fn test_missing_chat_key_fails() {
        let mut settings = configured();
        settings.typhoon.api_key = String::new();
        let (cache, history) = stores();

        assert!(matches!(
            build_assistant(&settings, cache, history),
            Err(AgentError::Llm(_))
        ));
    }

    #[test]
    fn test_missing_search_endpoint_fails() {
        let mut settings = configured();
        settings.search.endpoint = String::new();
        let (cache, history) = stores();

        assert!(matches!(
            build_assistant(&settings, cache, history),
            Err(AgentError::Rag(_))
        ));
    }
}
