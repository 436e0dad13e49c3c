//! Search provider trait

use async_trait::async_trait;

use crate::{Result, SearchHit, SearchRequest};

/// Hybrid keyword + vector search over a managed index
///
/// Results come back in provider relevance order and carry only the
/// fields listed in `SearchRequest::select`.
#[async_trait]
pub trait SearchProvider: Send + Sync + 'static {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;
}
