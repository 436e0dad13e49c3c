//! Result projection and formatting
//!
//! Each hit becomes one block of `Label: value` lines in a fixed order. The
//! last line (the URL) is followed by a blank line, and blocks are joined
//! with [`RESULT_SEPARATOR`]:
//!
//! ```text
//! Service Segment: Claims
//! Service Name: Accident claims
//! Service Detail: ...
//! URL: https://...
//!
//! =================
//! Service Segment: ...
//! ```

use subsin_config::constants::search::RESULT_SEPARATOR;
use subsin_core::{SearchHit, SearchTarget};

/// Projected fields and their display labels, in output order
#[derive(Debug, Clone, Copy)]
pub struct FieldLayout {
    /// (index field, display label)
    pub fields: &'static [(&'static str, &'static str)],
}

pub const PRODUCT_LAYOUT: FieldLayout = FieldLayout {
    fields: &[
        ("Product_Segment", "Product Segment"),
        ("Product_Name", "Product Name"),
        ("Unique_Pros", "Unique Point"),
        ("Benefit", "Product Benefit"),
        ("Condition", "Product Condition"),
        ("Product_Description", "Product Description"),
        ("Product_URL", "URL"),
    ],
};

pub const SERVICE_LAYOUT: FieldLayout = FieldLayout {
    fields: &[
        ("Service_Segment", "Service Segment"),
        ("Service_Name", "Service Name"),
        ("Service_Detail", "Service Detail"),
        ("Service_URL", "URL"),
    ],
};

impl FieldLayout {
    pub fn for_target(target: SearchTarget) -> &'static FieldLayout {
        match target {
            SearchTarget::Product => &PRODUCT_LAYOUT,
            SearchTarget::Service => &SERVICE_LAYOUT,
        }
    }

    /// Field names for the search `select` clause
    pub fn select_fields(&self) -> Vec<String> {
        self.fields.iter().map(|(field, _)| field.to_string()).collect()
    }

    /// One formatted block; missing or null fields render empty
    pub fn render_block(&self, hit: &SearchHit) -> String {
        let mut block = self
            .fields
            .iter()
            .map(|(field, label)| format!("{}: {}", label, hit.text(field)))
            .collect::<Vec<_>>()
            .join("\n");
        block.push_str("\n\n");
        block
    }
}

/// Render hits as separator-joined blocks; no hits yields an empty string
pub fn format_results(hits: &[SearchHit], target: SearchTarget) -> String {
    let layout = FieldLayout::for_target(target);
    hits.iter()
        .map(|hit| layout.render_block(hit))
        .collect::<Vec<_>>()
        .join(RESULT_SEPARATOR)
}
