//! Data models for search responses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single search hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultItem {
    /// EOL page identifier.
    #[serde(default)]
    pub id: i64,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Link to the taxon page.
    #[serde(default)]
    pub link: String,
    /// Content excerpt.
    #[serde(default)]
    pub content: String,
}

impl ResultItem {
    /// Creates a new result item.
    #[must_use]
    pub fn new(
        id: i64,
        title: impl Into<String>,
        link: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            link: link.into(),
            content: content.into(),
        }
    }

    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("id".to_string(), serde_json::json!(self.id));
        dict.insert("title".to_string(), serde_json::json!(self.title));
        dict.insert("link".to_string(), serde_json::json!(self.link));
        dict.insert("content".to_string(), serde_json::json!(self.content));
        dict
    }
}

/// One decoded page of search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageBatch {
    /// Total number of hits across all pages.
    #[serde(default)]
    pub total_results: f64,
    /// Number of hits per page.
    #[serde(default)]
    pub items_per_page: f64,
    /// Hits on this page, in API order.
    #[serde(default, rename = "results")]
    pub items: Vec<ResultItem>,
}

impl PageBatch {
    /// Creates a new batch.
    #[must_use]
    pub fn new(items: Vec<ResultItem>, total_results: f64, items_per_page: f64) -> Self {
        Self {
            total_results,
            items_per_page,
            items,
        }
    }

    /// Number of pages the whole result set spans.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        page_count(self.total_results, self.items_per_page)
    }
}

/// Computes `ceil(total_results / items_per_page)`.
///
/// Degenerate inputs (zero or negative page size, NaN, infinity, an empty
/// result set) yield 1: the page already in hand is the only one.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn page_count(total_results: f64, items_per_page: f64) -> u32 {
    if !total_results.is_finite() || !items_per_page.is_finite() || items_per_page <= 0.0 {
        return 1;
    }
    // float-to-int `as` saturates, so huge counts clamp to u32::MAX
    (total_results / items_per_page).ceil().max(1.0) as u32
}
