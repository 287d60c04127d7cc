//! Search query parameters and request URL derivation.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{EolError, Result};

/// Path of the search endpoint relative to the API root.
pub const SEARCH_PATH: &str = "search/1.0.json";

/// Parameters for one logical search.
///
/// A query is never mutated once a search starts; every page request is
/// derived from the same value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    /// The term to search for.
    pub query: String,
    /// Only match pages whose title, synonym or common name equals the term.
    #[serde(default)]
    pub exact: bool,
    /// Maximum number of results; zero leaves it to the API.
    #[serde(default)]
    pub limit: u32,
    /// Restrict results to members of this EOL page id's taxonomic group.
    #[serde(default)]
    pub filter_by_taxon_concept_id: u64,
    /// Restrict results to members of this hierarchy entry's group.
    #[serde(default)]
    pub filter_by_hierarchy_entry_id: u64,
    /// Exact-match this string and use the hit as the taxonomic filter.
    #[serde(default)]
    pub filter_by_string: Option<String>,
    /// Seconds the API should cache the response for; zero disables.
    #[serde(default)]
    pub cache_ttl: u32,
}

impl SearchQuery {
    /// Creates a query for a search term.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Requires exact matches.
    #[must_use]
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    /// Limits the number of results.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Filters by taxon concept id.
    #[must_use]
    pub fn with_taxon_concept(mut self, id: u64) -> Self {
        self.filter_by_taxon_concept_id = id;
        self
    }

    /// Filters by hierarchy entry id.
    #[must_use]
    pub fn with_hierarchy_entry(mut self, id: u64) -> Self {
        self.filter_by_hierarchy_entry_id = id;
        self
    }

    /// Filters by the taxon an exact string match resolves to.
    #[must_use]
    pub fn with_filter_string(mut self, filter: impl Into<String>) -> Self {
        self.filter_by_string = Some(filter.into());
        self
    }

    /// Sets the cache directive.
    #[must_use]
    pub fn with_cache_ttl(mut self, seconds: u32) -> Self {
        self.cache_ttl = seconds;
        self
    }

    /// Rejects queries that cannot be sent.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(EolError::Validation(
                "a query value is required for eol search".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the request URL for one page against the search endpoint.
    ///
    /// Deterministic: the same query, endpoint and page always give the same URL.
    #[must_use]
    pub fn request_url(&self, endpoint: &Url, page: u32) -> Url {
        let mut url = endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &self.query);
            pairs.append_pair("exact", if self.exact { "true" } else { "false" });
            if let Some(filter) = self.filter_by_string.as_deref().filter(|f| !f.is_empty()) {
                pairs.append_pair("filter_by_string", filter);
            }
            if self.cache_ttl > 0 {
                pairs.append_pair("cache_ttl", &self.cache_ttl.to_string());
            }
            if self.filter_by_hierarchy_entry_id > 0 {
                pairs.append_pair(
                    "filter_by_hierarchy_entry_id",
                    &self.filter_by_hierarchy_entry_id.to_string(),
                );
            }
            if self.filter_by_taxon_concept_id > 0 {
                pairs.append_pair(
                    "filter_by_taxon_concept_id",
                    &self.filter_by_taxon_concept_id.to_string(),
                );
            }
            if self.limit > 0 {
                pairs.append_pair("limit", &self.limit.to_string());
            }
            pairs.append_pair("page", &page.to_string());
        }
        url
    }
}

/// Resolves the search endpoint under an API root.
pub fn search_endpoint(api_root: &Url) -> Result<Url> {
    Ok(api_root.join(SEARCH_PATH)?)
}
