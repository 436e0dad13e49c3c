//! Azure AI Search client
//!
//! Hybrid keyword + vector queries over the REST API:
//! `POST {endpoint}/indexes/{index}/docs/search?api-version={v}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use subsin_config::SearchSettings;
use subsin_core::{SearchHit, SearchProvider, SearchRequest, SearchTarget};

use crate::RagError;

/// Azure AI Search configuration
#[derive(Debug, Clone)]
pub struct AzureSearchConfig {
    /// Service endpoint, e.g. `https://<name>.search.windows.net`
    pub endpoint: String,
    pub api_key: String,
    pub product_index: String,
    pub service_index: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl AzureSearchConfig {
    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            product_index: settings.product_index.clone(),
            service_index: settings.service_index.clone(),
            api_version: settings.api_version.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    pub fn index_for(&self, target: SearchTarget) -> &str {
        match target {
            SearchTarget::Product => &self.product_index,
            SearchTarget::Service => &self.service_index,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    search: &'a str,
    vector_queries: Vec<VectorQueryBody<'a>>,
    select: String,
    top: usize,
    skip: usize,
}

#[derive(Debug, Serialize)]
struct VectorQueryBody<'a> {
    kind: &'static str,
    vector: &'a [f32],
    k: usize,
    fields: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    value: Vec<HashMap<String, serde_json::Value>>,
}

/// REST client for the product and service indexes
pub struct AzureSearchClient {
    client: Client,
    config: AzureSearchConfig,
}

impl AzureSearchClient {
    pub fn new(config: AzureSearchConfig) -> Result<Self, RagError> {
        if config.endpoint.trim().is_empty() {
            return Err(RagError::Configuration(
                "Search endpoint is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn search_url(&self, target: SearchTarget) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.index_for(target),
            self.config.api_version
        )
    }

    fn build_body<'a>(request: &'a SearchRequest) -> SearchBody<'a> {
        SearchBody {
            search: &request.query_text,
            vector_queries: vec![VectorQueryBody {
                kind: "vector",
                vector: &request.vector_query.vector,
                k: request.vector_query.k,
                fields: &request.vector_query.field,
            }],
            select: request.select.join(","),
            top: request.top,
            skip: request.skip,
        }
    }

    async fn execute(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, RagError> {
        let response = self
            .client
            .post(self.search_url(request.target))
            .header("api-key", &self.config.api_key)
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|e| RagError::Connection(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RagError::Search(format!("HTTP {}: {}", status, text)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RagError::Search(format!("Failed to parse search response: {}", e)))?;

        Ok(body.value.into_iter().map(into_hit).collect())
    }
}

/// Drop service annotations such as `@search.score`
fn into_hit(mut fields: HashMap<String, serde_json::Value>) -> SearchHit {
    fields.retain(|name, _| !name.starts_with('@'));
    SearchHit { fields }
}

#[async_trait]
impl SearchProvider for AzureSearchClient {
    async fn search(&self, request: &SearchRequest) -> subsin_core::Result<Vec<SearchHit>> {
        let hits = self.execute(request).await?;
        tracing::debug!(
            index = %request.target,
            hits = hits.len(),
            top = request.top,
            skip = request.skip,
            "Hybrid search completed"
        );
        Ok(hits)
    }
}
