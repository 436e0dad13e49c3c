//! Cache-then-compute hybrid search
//!
//! A hit returns the cached context text byte for byte. A miss embeds the
//! query, runs a hybrid query against the product or service index,
//! formats the page and stores it under the search TTL.

use std::sync::Arc;
use std::time::Duration;

use subsin_config::{CacheConfig, SearchSettings};
use subsin_core::{CacheStore, SearchProvider, SearchRequest, SearchTarget, VectorQuery};

use crate::cache_key::{search_key, CacheKind};
use crate::embeddings::EmbeddingGateway;
use crate::format::{format_results, FieldLayout};

/// Search gateway configuration
#[derive(Debug, Clone)]
pub struct SearchGatewayConfig {
    /// Nearest-neighbour candidate pool for the vector leg
    pub knn: usize,
    pub vector_field: String,
    pub ttl: Duration,
}

impl Default for SearchGatewayConfig {
    fn default() -> Self {
        Self::from_settings(&SearchSettings::default(), &CacheConfig::default())
    }
}

impl SearchGatewayConfig {
    pub fn from_settings(search: &SearchSettings, cache: &CacheConfig) -> Self {
        Self {
            knn: search.knn,
            vector_field: search.vector_field.clone(),
            ttl: Duration::from_secs(cache.search_ttl_secs),
        }
    }
}

pub struct SearchGateway {
    embeddings: Arc<EmbeddingGateway>,
    provider: Arc<dyn SearchProvider>,
    cache: Arc<dyn CacheStore>,
    config: SearchGatewayConfig,
}

impl SearchGateway {
    pub fn new(
        embeddings: Arc<EmbeddingGateway>,
        provider: Arc<dyn SearchProvider>,
        cache: Arc<dyn CacheStore>,
        config: SearchGatewayConfig,
    ) -> Self {
        Self {
            embeddings,
            provider,
            cache,
            config,
        }
    }

    /// Formatted context for one page of results
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        skip_k: usize,
        target: SearchTarget,
    ) -> subsin_core::Result<String> {
        let key = search_key(query, top_k, skip_k, target);

        if let Some(text) = self.lookup(key.as_str()).await {
            return Ok(text);
        }

        let vector = self.embeddings.embed(query).await?;
        let layout = FieldLayout::for_target(target);
        let request = SearchRequest {
            target,
            query_text: query.to_string(),
            vector_query: VectorQuery {
                vector,
                k: self.config.knn,
                field: self.config.vector_field.clone(),
            },
            select: layout.select_fields(),
            top: top_k,
            skip: skip_k,
        };

        let hits = self.provider.search(&request).await?;
        let text = format_results(&hits, target);

        if let Err(e) = self
            .cache
            .set(key.as_str(), text.clone().into_bytes(), self.config.ttl)
            .await
        {
            tracing::warn!(key = %key, error = %e, "Search cache write failed");
        }

        Ok(text)
    }

    async fn lookup(&self, key: &str) -> Option<String> {
        let outcome = match self.cache.get(key).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => {
                    record_lookup("hit");
                    tracing::debug!(key = %key, "Search cache hit");
                    return Some(text);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding undecodable cached search");
                    "corrupt"
                }
            },
            Ok(None) => "miss",
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Search cache read failed");
                "error"
            }
        };

        record_lookup(outcome);
        tracing::debug!(key = %key, outcome, "Search cache miss");
        None
    }
}

fn record_lookup(outcome: &'static str) {
    metrics::counter!(
        "subsin_cache_lookups_total",
        "cache" => CacheKind::Search.label(),
        "outcome" => outcome
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use subsin_config::constants::search::RESULT_SEPARATOR;
    use subsin_core::{EmbeddingProvider, SearchHit};

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> subsin_core::Result<Vec<f32>> {
            Ok(vec![0.1, 0.2, 0.3])
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    /// Returns `rows` product hits and records every request
    struct RecordingSearch {
        rows: usize,
        requests: Mutex<Vec<SearchRequest>>,
    }

    impl RecordingSearch {
        fn new(rows: usize) -> Self {
            Self {
                rows,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().len()
        }
    }

    #[async_trait]
    impl SearchProvider for RecordingSearch {
        async fn search(&self, request: &SearchRequest) -> subsin_core::Result<Vec<SearchHit>> {
            self.requests.lock().push(request.clone());
            Ok((0..self.rows)
                .map(|i| {
                    request.select.iter().fold(SearchHit::new(), |hit, field| {
                        hit.with_field(field.as_str(), format!("{} #{}", field, i + request.skip))
                    })
                })
                .collect())
        }
    }

    /// Fails every read and write
    struct BrokenCache;

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, _key: &str) -> subsin_core::Result<Option<Vec<u8>>> {
            Err(subsin_core::Error::Cache("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> subsin_core::Result<()> {
            Err(subsin_core::Error::Cache("connection refused".to_string()))
        }
    }

    fn gateway_with(
        provider: Arc<RecordingSearch>,
        cache: Arc<dyn CacheStore>,
        config: SearchGatewayConfig,
    ) -> SearchGateway {
        let embeddings = Arc::new(EmbeddingGateway::new(
            Arc::new(FixedEmbedder),
            cache.clone(),
            Duration::from_secs(86_400),
        ));
        SearchGateway::new(embeddings, provider, cache, config)
    }

    fn gateway(provider: Arc<RecordingSearch>) -> SearchGateway {
        gateway_with(
            provider,
            Arc::new(InMemoryCacheStore::new(64)),
            SearchGatewayConfig::default(),
        )
    }

    const PRODUCT_LABELS: [&str; 7] = [
        "Product Segment:",
        "Product Name:",
        "Unique Point:",
        "Product Benefit:",
        "Product Condition:",
        "Product Description:",
        "URL:",
    ];

    #[tokio::test]
    async fn test_two_product_rows_two_blocks() {
        let provider = Arc::new(RecordingSearch::new(2));
        let gateway = gateway(provider.clone());

        let text = gateway
            .search("life insurance", 3, 0, SearchTarget::Product)
            .await
            .unwrap();

        let blocks: Vec<&str> = text.split(RESULT_SEPARATOR).collect();
        assert_eq!(blocks.len(), 2);
        for block in blocks {
            let positions: Vec<usize> = PRODUCT_LABELS
                .iter()
                .map(|label| block.find(label).expect("label present"))
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
            assert!(block.ends_with("\n\n"));
        }
    }

    #[tokio::test]
    async fn test_request_shape() {
        let provider = Arc::new(RecordingSearch::new(1));
        let gateway = gateway(provider.clone());

        gateway
            .search("claims", 3, 6, SearchTarget::Service)
            .await
            .unwrap();

        let requests = provider.requests.lock();
        let request = &requests[0];
        assert_eq!(request.target, SearchTarget::Service);
        assert_eq!(request.query_text, "claims");
        assert_eq!(request.top, 3);
        assert_eq!(request.skip, 6);
        assert_eq!(request.vector_query.k, 100);
        assert_eq!(request.vector_query.field, "text_vector");
        assert_eq!(request.vector_query.vector, vec![0.1, 0.2, 0.3]);
        assert_eq!(request.select.len(), 4);
    }

    #[tokio::test]
    async fn test_repeat_search_served_from_cache() {
        let provider = Arc::new(RecordingSearch::new(2));
        let gateway = gateway(provider.clone());

        let first = gateway
            .search("life insurance", 3, 0, SearchTarget::Product)
            .await
            .unwrap();
        let second = gateway
            .search("life insurance", 3, 0, SearchTarget::Product)
            .await
            .unwrap();

        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_pages_and_targets_miss() {
        let provider = Arc::new(RecordingSearch::new(1));
        let gateway = gateway(provider.clone());

        gateway.search("q", 3, 0, SearchTarget::Product).await.unwrap();
        gateway.search("q", 3, 3, SearchTarget::Product).await.unwrap();
        gateway.search("q", 3, 0, SearchTarget::Service).await.unwrap();

        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_expired_entry_is_recomputed() {
        let provider = Arc::new(RecordingSearch::new(1));
        let config = SearchGatewayConfig {
            ttl: Duration::from_millis(100),
            ..SearchGatewayConfig::default()
        };
        let gateway = gateway_with(
            provider.clone(),
            Arc::new(InMemoryCacheStore::new(64)),
            config,
        );

        gateway.search("q", 3, 0, SearchTarget::Product).await.unwrap();
        gateway.search("q", 3, 0, SearchTarget::Product).await.unwrap();
        assert_eq!(provider.calls(), 1);

        tokio::time::sleep(Duration::from_millis(300)).await;
        gateway.search("q", 3, 0, SearchTarget::Product).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_failure_falls_back_to_provider() {
        let provider = Arc::new(RecordingSearch::new(1));
        let gateway = gateway_with(
            provider.clone(),
            Arc::new(BrokenCache),
            SearchGatewayConfig::default(),
        );

        let first = gateway
            .search("life insurance", 3, 0, SearchTarget::Product)
            .await
            .unwrap();
        let second = gateway
            .search("life insurance", 3, 0, SearchTarget::Product)
            .await
            .unwrap();

        assert!(first.contains("Product Name: Product_Name #0"));
        assert_eq!(first, second);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_recomputed() {
        let provider = Arc::new(RecordingSearch::new(1));
        let cache = Arc::new(InMemoryCacheStore::new(64));
        let key = search_key("claims", 3, 0, SearchTarget::Service);
        cache
            .set(key.as_str(), vec![0xff, 0xfe, 0x00], Duration::from_secs(60))
            .await
            .unwrap();

        let gateway = gateway_with(provider.clone(), cache.clone(), SearchGatewayConfig::default());
        let text = gateway
            .search("claims", 3, 0, SearchTarget::Service)
            .await
            .unwrap();

        assert!(text.contains("Service Name: Service_Name #0"));
        assert_eq!(provider.calls(), 1);
        assert_eq!(cache.get(key.as_str()).await.unwrap(), Some(text.into_bytes()));
    }

    #[tokio::test]
    async fn test_zero_results_is_empty_text() {
        let provider = Arc::new(RecordingSearch::new(0));
        let gateway = gateway(provider.clone());

        let text = gateway.search("q", 3, 0, SearchTarget::Product).await.unwrap();
        assert!(text.is_empty());

        let again = gateway.search("q", 3, 0, SearchTarget::Product).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_both_compute() {
        let provider = Arc::new(RecordingSearch::new(1));
        let gateway = Arc::new(gateway(provider.clone()));

        let results = futures::future::join_all((0..2).map(|_| {
            let gateway = gateway.clone();
            async move { gateway.search("q", 3, 0, SearchTarget::Product).await }
        }))
        .await;

        let texts: Vec<String> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(texts[0], texts[1]);
        assert!(provider.calls() >= 1);
    }
}
