//! The public client.
//!
//! [`EolClient::search`] drives a [`FetchSupervisor`] and collects its
//! stream. Results are all-or-nothing: if any page fails, everything that
//! was already collected is discarded and only the error is returned.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

use crate::config::EolConfig;
use crate::errors::Result;
use crate::pages::{TaxonPage, TaxonPageQuery};
use crate::search::{search_endpoint, FetchSummary, FetchSupervisor, ResultItem, SearchQuery};
use crate::transport::PageTransport;

/// Items from a successful search together with run diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Id used in the search's log span.
    pub request_id: Uuid,
    /// All items, page 1's first.
    pub items: Vec<ResultItem>,
    /// Page counters.
    pub summary: FetchSummary,
}

/// Client for the EOL search and pages APIs.
#[derive(Clone)]
pub struct EolClient {
    config: EolConfig,
    api_root: Url,
    transport: Arc<dyn PageTransport>,
    supervisor: FetchSupervisor,
}

impl EolClient {
    /// Creates a client that talks HTTP.
    #[cfg(feature = "http")]
    pub fn new(config: EolConfig) -> Result<Self> {
        let transport = crate::transport::HttpTransport::new(config.fetch.clone())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(config: EolConfig, transport: Arc<dyn PageTransport>) -> Result<Self> {
        config.validate()?;
        let api_root = config.api_root()?;
        let supervisor = FetchSupervisor::new(transport.clone(), search_endpoint(&api_root)?)
            .with_sink_capacity(config.sink_capacity);

        Ok(Self {
            config,
            api_root,
            transport,
            supervisor,
        })
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &EolConfig {
        &self.config
    }

    /// Runs a search across every result page.
    ///
    /// Empty terms are rejected before any request. If any page fails the
    /// whole search fails; partial results are never returned.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<ResultItem>> {
        self.search_with_summary(query).await.map(|r| r.items)
    }

    /// Like [`EolClient::search`], also returning run diagnostics.
    pub async fn search_with_summary(&self, query: &SearchQuery) -> Result<SearchResults> {
        let request_id = Uuid::new_v4();
        let span = info_span!("eol.search", %request_id, query = %query.query);

        async move {
            let run = self.supervisor.start(query.clone())?;
            let (mut stream, outcome) = run.into_parts();

            let mut items = Vec::new();
            while let Some(item) = stream.next_item().await {
                items.push(item);
            }

            match outcome.wait().await {
                Ok(summary) => {
                    info!(items = items.len(), pages = summary.page_count, "Search complete");
                    Ok(SearchResults {
                        request_id,
                        items,
                        summary,
                    })
                }
                Err(err) => {
                    warn!(discarded = items.len(), error = %err, "Discarding partial results");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Fetches one taxon page.
    pub async fn page(&self, query: &TaxonPageQuery) -> Result<TaxonPage> {
        query.validate()?;
        let url = query.request_url(&self.api_root)?;
        debug!(id = query.id, url = %url, "Fetching taxon page");
        self.transport.fetch_taxon_page(&url).await
    }
}

impl std::fmt::Debug for EolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EolClient")
            .field("api_root", &self.api_root.as_str())
            .field("supervisor", &self.supervisor)
            .finish()
    }
}
