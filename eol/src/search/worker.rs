//! Fetching of a single search page.

use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::models::{page_count, PageBatch};
use super::query::SearchQuery;
use super::scope::CancellationScope;
use super::sink::ResultSink;
use crate::errors::EolError;
use crate::transport::PageTransport;

/// What a successful page fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    /// The page number.
    pub page: u32,
    /// Items written to the sink.
    pub items: usize,
    /// `totalResults` as reported on this page.
    pub total_results: f64,
    /// `itemsPerPage` as reported on this page.
    pub items_per_page: f64,
}

impl PageSummary {
    fn from_batch(page: u32, batch: &PageBatch) -> Self {
        Self {
            page,
            items: batch.items.len(),
            total_results: batch.total_results,
            items_per_page: batch.items_per_page,
        }
    }

    /// Number of pages implied by this page's counts.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        page_count(self.total_results, self.items_per_page)
    }
}

/// Result of one [`PageWorker::fetch`] call.
#[derive(Debug)]
pub enum PageOutcome {
    /// The page was fetched and all of its items were written.
    Fetched(PageSummary),
    /// The search was already failing, so the page was never requested.
    Skipped,
    /// The page could not be fetched or delivered.
    Failed(EolError),
}

impl PageOutcome {
    /// Whether this outcome is a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Fetches pages of one query and forwards their items to a sink.
///
/// Cheap to clone; every spawned page task gets its own copy.
#[derive(Clone)]
pub struct PageWorker {
    transport: Arc<dyn PageTransport>,
    endpoint: Arc<Url>,
    query: Arc<SearchQuery>,
}

impl PageWorker {
    /// Creates a worker for a query against a search endpoint.
    #[must_use]
    pub fn new(transport: Arc<dyn PageTransport>, endpoint: Url, query: SearchQuery) -> Self {
        Self {
            transport,
            endpoint: Arc::new(endpoint),
            query: Arc::new(query),
        }
    }

    /// Returns the query this worker fetches pages for.
    #[must_use]
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Request URL for a page.
    #[must_use]
    pub fn url_for(&self, page: u32) -> Url {
        self.query.request_url(&self.endpoint, page)
    }

    /// Fetches one page.
    ///
    /// Skips without any side effect when the scope is already dying. On
    /// success every item is written to `sink` in batch order, waiting while
    /// the sink is full. On failure nothing is written and the error carries
    /// the page number and URL. The scope is never modified here; recording
    /// failures is the caller's job.
    pub async fn fetch(
        &self,
        page: u32,
        scope: &CancellationScope,
        sink: &ResultSink,
    ) -> PageOutcome {
        if page == 0 {
            return PageOutcome::Failed(EolError::Validation(
                "page numbers start at 1".to_string(),
            ));
        }
        if scope.is_dying() {
            debug!(page, "Skipping page, search is already failing");
            return PageOutcome::Skipped;
        }

        let _live = scope.enter();
        let url = self.url_for(page);
        debug!(page, url = %url, "Fetching page");

        let batch = match self.transport.fetch_page(&url).await {
            Ok(batch) => batch,
            Err(err) => {
                warn!(page, url = %url, error = %err, "Page fetch failed");
                return PageOutcome::Failed(EolError::for_page(page, url.as_str(), err));
            }
        };

        let summary = PageSummary::from_batch(page, &batch);
        if let Err(err) = sink.put_all(batch.items).await {
            warn!(page, error = %err, "Could not deliver page items");
            return PageOutcome::Failed(EolError::for_page(page, url.as_str(), err));
        }

        debug!(page, items = summary.items, "Page delivered");
        PageOutcome::Fetched(summary)
    }
}

impl std::fmt::Debug for PageWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageWorker")
            .field("endpoint", &self.endpoint.as_str())
            .field("query", &self.query)
            .finish()
    }
}
