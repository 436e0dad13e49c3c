//! Hybrid search request types

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which managed index a search targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTarget {
    Product,
    Service,
}

impl SearchTarget {
    pub fn from_is_service(is_service: bool) -> Self {
        if is_service {
            SearchTarget::Service
        } else {
            SearchTarget::Product
        }
    }

    /// Short tag used in cache namespaces
    pub fn cache_tag(&self) -> &'static str {
        match self {
            SearchTarget::Product => "prd",
            SearchTarget::Service => "svc",
        }
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchTarget::Product => write!(f, "product"),
            SearchTarget::Service => write!(f, "service"),
        }
    }
}

/// Nearest-neighbour part of a hybrid query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    /// Candidate pool size
    pub k: usize,
    /// Vector field to search
    pub field: String,
}

/// Hybrid keyword + vector search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub target: SearchTarget,
    pub query_text: String,
    pub vector_query: VectorQuery,
    pub select: Vec<String>,
    pub top: usize,
    pub skip: usize,
}

/// One search result row: field name -> value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHit {
    pub fields: HashMap<String, serde_json::Value>,
}

impl SearchHit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Field rendered as display text; missing or null fields render empty
    pub fn text(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_tags() {
        assert_eq!(SearchTarget::from_is_service(true), SearchTarget::Service);
        assert_eq!(SearchTarget::Product.cache_tag(), "prd");
        assert_eq!(SearchTarget::Service.cache_tag(), "svc");
    }

    #[test]
    fn test_hit_text() {
        let hit = SearchHit::new()
            .with_field("Product_Name", "Life Plus")
            .with_field("Premium", 1200)
            .with_field("Condition", serde_json::Value::Null);

        assert_eq!(hit.text("Product_Name"), "Life Plus");
        assert_eq!(hit.text("Premium"), "1200");
        assert_eq!(hit.text("Condition"), "");
        assert_eq!(hit.text("Missing"), "");
    }
}
