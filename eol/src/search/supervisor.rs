//! Fan-out of one search over all of its pages.
//!
//! Page 1 is fetched on the supervisor's own task. Its counts decide how
//! many pages exist; every remaining page then gets its own task. All tasks
//! share one [`CancellationScope`] and one [`ResultSink`]. The supervisor
//! waits for every task before releasing its sink handle, so the stream ends
//! exactly once, after the last writer is gone.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};
use url::Url;

use super::query::SearchQuery;
use super::scope::CancellationScope;
use super::sink::{result_sink, ResultSink, ResultStream, DEFAULT_SINK_CAPACITY};
use super::worker::{PageOutcome, PageWorker};
use crate::errors::{EolError, Result};
use crate::transport::PageTransport;

/// Counters for a finished search run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSummary {
    /// Number of pages derived from page 1.
    pub page_count: u32,
    /// Pages fetched and delivered.
    pub pages_fetched: u32,
    /// Pages never requested because the run was already failing.
    pub pages_skipped: u32,
    /// Pages that failed.
    pub pages_failed: u32,
    /// Items delivered to the sink.
    pub items: usize,
}

impl FetchSummary {
    fn record(&mut self, status: PageStatus) {
        match status {
            PageStatus::Fetched { items } => {
                self.pages_fetched += 1;
                self.items += items;
            }
            PageStatus::Skipped => self.pages_skipped += 1,
            PageStatus::Failed => self.pages_failed += 1,
        }
    }
}

/// Outcome of a page after its failure, if any, went into the scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageStatus {
    Fetched { items: usize },
    Skipped,
    Failed,
}

/// Applies the recording rule: failures go to the scope, first one wins.
fn settle(scope: &CancellationScope, outcome: PageOutcome) -> PageStatus {
    match outcome {
        PageOutcome::Fetched(summary) => PageStatus::Fetched {
            items: summary.items,
        },
        PageOutcome::Skipped => PageStatus::Skipped,
        PageOutcome::Failed(err) => {
            scope.fail(err);
            PageStatus::Failed
        }
    }
}

/// A search in progress.
///
/// Read the stream to completion, then wait on the outcome. The stream keeps
/// yielding items even if the run fails; dropping it early fails the run.
#[derive(Debug)]
pub struct SupervisorRun {
    stream: ResultStream,
    outcome: RunOutcome,
}

impl SupervisorRun {
    /// Splits the run into its item stream and its outcome.
    #[must_use]
    pub fn into_parts(self) -> (ResultStream, RunOutcome) {
        (self.stream, self.outcome)
    }
}

/// The pending result of a [`SupervisorRun`].
#[derive(Debug)]
pub struct RunOutcome {
    handle: JoinHandle<Result<FetchSummary>>,
}

impl RunOutcome {
    /// Waits for every page task and returns the recorded error, if any.
    pub async fn wait(self) -> Result<FetchSummary> {
        self.handle
            .await
            .map_err(|e| EolError::Internal(format!("search supervisor did not finish: {e}")))?
    }
}

/// Runs paginated searches against one endpoint.
#[derive(Clone)]
pub struct FetchSupervisor {
    transport: Arc<dyn PageTransport>,
    endpoint: Url,
    sink_capacity: usize,
}

impl FetchSupervisor {
    /// Creates a supervisor for a search endpoint.
    #[must_use]
    pub fn new(transport: Arc<dyn PageTransport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
            sink_capacity: DEFAULT_SINK_CAPACITY,
        }
    }

    /// Sets the result sink capacity.
    #[must_use]
    pub fn with_sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity.max(1);
        self
    }

    /// Starts a search.
    ///
    /// Rejects an empty query before any request is made. Must be called
    /// from within a Tokio runtime.
    pub fn start(&self, query: SearchQuery) -> Result<SupervisorRun> {
        query.validate()?;

        let (sink, stream) = result_sink(self.sink_capacity);
        let scope = Arc::new(CancellationScope::new());
        let worker = PageWorker::new(self.transport.clone(), self.endpoint.clone(), query);

        let handle = tokio::spawn(supervise(worker, scope, sink).in_current_span());
        Ok(SupervisorRun {
            stream,
            outcome: RunOutcome { handle },
        })
    }
}

impl std::fmt::Debug for FetchSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchSupervisor")
            .field("endpoint", &self.endpoint.as_str())
            .field("sink_capacity", &self.sink_capacity)
            .finish()
    }
}

async fn supervise(
    worker: PageWorker,
    scope: Arc<CancellationScope>,
    sink: ResultSink,
) -> Result<FetchSummary> {
    let first = match worker.fetch(1, &scope, &sink).await {
        PageOutcome::Fetched(first) => first,
        outcome => {
            settle(&scope, outcome);
            sink.close();
            return Err(scope.take_error().unwrap_or_else(|| {
                EolError::Internal("page 1 was skipped on a fresh search".to_string())
            }));
        }
    };

    let page_count = first.page_count();
    info!(
        page_count,
        total_results = first.total_results,
        items_per_page = first.items_per_page,
        "Derived page count"
    );

    let mut summary = FetchSummary {
        page_count,
        ..Default::default()
    };
    summary.record(PageStatus::Fetched { items: first.items });

    let mut pages = Vec::new();
    let mut handles = Vec::new();
    for page in 2..=page_count {
        if scope.is_dying() {
            let remaining = page_count - page + 1;
            debug!(page, remaining, "Not launching remaining pages");
            summary.pages_skipped += remaining;
            break;
        }

        let worker = worker.clone();
        let scope = scope.clone();
        let sink = sink.clone();
        let task = async move {
            let outcome = worker.fetch(page, &scope, &sink).await;
            sink.close();
            settle(&scope, outcome)
        };
        pages.push(page);
        handles.push(tokio::spawn(task.in_current_span()));
    }

    for (page, joined) in pages.into_iter().zip(join_all(handles).await) {
        match joined {
            Ok(status) => summary.record(status),
            Err(err) => {
                let url = worker.url_for(page);
                scope.fail(EolError::for_page(
                    page,
                    url.as_str(),
                    EolError::Internal(format!("page task aborted: {err}")),
                ));
                summary.record(PageStatus::Failed);
            }
        }
    }

    sink.close();

    match scope.take_error() {
        Some(err) => {
            warn!(
                error = %err,
                pages_fetched = summary.pages_fetched,
                pages_failed = summary.pages_failed,
                pages_skipped = summary.pages_skipped,
                "Search failed"
            );
            Err(err)
        }
        None => {
            info!(pages = summary.pages_fetched, items = summary.items, "Search pages complete");
            Ok(summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::pages::TaxonPage;
    use crate::search::models::{PageBatch, ResultItem};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use rand::Rng;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Transport with per-page latency and failures that records calls.
    #[derive(Default)]
    struct ScriptedTransport {
        total_results: f64,
        items_per_page: f64,
        delays: HashMap<u32, Duration>,
        failures: HashMap<u32, ErrorKind>,
        jitter_ms: Option<u64>,
        calls: Mutex<Vec<u32>>,
        events: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(total_results: f64, items_per_page: f64) -> Self {
            Self {
                total_results,
                items_per_page,
                ..Default::default()
            }
        }

        fn delay(mut self, page: u32, ms: u64) -> Self {
            self.delays.insert(page, Duration::from_millis(ms));
            self
        }

        fn fail(mut self, page: u32, kind: ErrorKind) -> Self {
            self.failures.insert(page, kind);
            self
        }

        fn jitter(mut self, max_ms: u64) -> Self {
            self.jitter_ms = Some(max_ms);
            self
        }

        fn calls(&self) -> Vec<u32> {
            let mut calls = self.calls.lock().clone();
            calls.sort_unstable();
            calls
        }

        fn items_on(&self, page: u32) -> Vec<ResultItem> {
            let per_page = self.items_per_page as i64;
            let start = i64::from(page - 1) * per_page;
            let end = (start + per_page).min(self.total_results as i64);
            (start..end)
                .map(|n| ResultItem::new(n, format!("item {n}"), format!("l{n}"), ""))
                .collect()
        }
    }

    fn page_of(url: &Url) -> u32 {
        url.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap()
    }

    #[async_trait]
    impl PageTransport for ScriptedTransport {
        async fn fetch_page(&self, url: &Url) -> Result<PageBatch> {
            let page = page_of(url);
            self.calls.lock().push(page);
            self.events.lock().push(format!("start {page}"));

            let mut delay = self.delays.get(&page).copied().unwrap_or_default();
            if let Some(max) = self.jitter_ms {
                delay += Duration::from_millis(rand::thread_rng().gen_range(0..=max));
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.events.lock().push(format!("end {page}"));

            match self.failures.get(&page) {
                Some(ErrorKind::NotFound) => Err(EolError::NotFound("status 404".to_string())),
                Some(ErrorKind::Decode) => Err(EolError::Decode("bad body".to_string())),
                Some(_) => Err(EolError::Transport("status 500".to_string())),
                None => Ok(PageBatch::new(
                    self.items_on(page),
                    self.total_results,
                    self.items_per_page,
                )),
            }
        }

        async fn fetch_taxon_page(&self, _url: &Url) -> Result<TaxonPage> {
            Err(EolError::Internal("not scripted".to_string()))
        }
    }

    fn supervisor(transport: Arc<ScriptedTransport>) -> FetchSupervisor {
        let endpoint = Url::parse("http://eol.org/api/search/1.0.json").unwrap();
        FetchSupervisor::new(transport, endpoint)
    }

    async fn run(
        transport: Arc<ScriptedTransport>,
    ) -> (Vec<ResultItem>, Result<FetchSummary>) {
        let run = supervisor(transport).start(SearchQuery::new("Ursus")).unwrap();
        let (stream, finish) = run.into_parts();
        let items = stream.drain().await;
        (items, finish.wait().await)
    }

    #[tokio::test]
    async fn test_fetches_every_derived_page_once() {
        let transport = Arc::new(ScriptedTransport::new(157.0, 30.0));
        let (items, outcome) = run(transport.clone()).await;

        let summary = outcome.unwrap();
        assert_eq!(summary.page_count, 6);
        assert_eq!(summary.pages_fetched, 6);
        assert_eq!(summary.items, 157);
        assert_eq!(items.len(), 157);
        assert_eq!(transport.calls(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_single_page_does_not_fan_out() {
        let transport = Arc::new(ScriptedTransport::new(10.0, 30.0));
        let (items, outcome) = run(transport.clone()).await;

        assert_eq!(outcome.unwrap().page_count, 1);
        assert_eq!(items.len(), 10);
        assert_eq!(transport.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_page_one_items_come_first() {
        // page 1 is slow, later pages are instant
        let transport = Arc::new(ScriptedTransport::new(90.0, 30.0).delay(1, 40));
        let (items, outcome) = run(transport).await;

        assert!(outcome.is_ok());
        let ids: Vec<i64> = items.iter().take(30).map(|i| i.id).collect();
        assert_eq!(ids, (0..30).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_page_one_completes_before_other_requests() {
        let transport = Arc::new(ScriptedTransport::new(120.0, 30.0).delay(1, 20));
        let (_, outcome) = run(transport.clone()).await;

        assert!(outcome.is_ok());
        let events = transport.events.lock().clone();
        assert_eq!(events.len(), 8);
        assert_eq!(&events[..2], &["start 1".to_string(), "end 1".to_string()]);
    }

    #[tokio::test]
    async fn test_page_one_failure_stops_everything() {
        let transport = Arc::new(ScriptedTransport::new(157.0, 30.0).fail(1, ErrorKind::Transport));
        let (items, outcome) = run(transport.clone()).await;

        let err = outcome.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.page(), Some(1));
        assert!(items.is_empty());
        assert_eq!(transport.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_failure_is_reported_with_page() {
        let transport = Arc::new(ScriptedTransport::new(150.0, 30.0).fail(3, ErrorKind::NotFound));
        let (_, outcome) = run(transport).await;

        let err = outcome.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.page(), Some(3));
    }

    #[tokio::test]
    async fn test_first_failure_in_time_wins() {
        let transport = Arc::new(
            ScriptedTransport::new(150.0, 30.0)
                .fail(2, ErrorKind::Decode)
                .delay(2, 80)
                .fail(5, ErrorKind::NotFound)
                .delay(5, 5),
        );
        let (_, outcome) = run(transport).await;

        let err = outcome.unwrap_err();
        assert_eq!(err.page(), Some(5));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_in_flight_pages_still_deliver_after_failure() {
        // page 3 is already running when page 2 fails and must not be aborted
        let transport = Arc::new(
            ScriptedTransport::new(90.0, 30.0)
                .fail(2, ErrorKind::Transport)
                .delay(2, 10)
                .delay(3, 60),
        );
        let (items, outcome) = run(transport.clone()).await;

        assert_eq!(outcome.unwrap_err().page(), Some(2));
        assert_eq!(transport.calls(), vec![1, 2, 3]);
        assert_eq!(items.len(), 60);
        assert!(items.iter().any(|item| item.id == 89));
    }

    #[tokio::test]
    async fn test_no_new_launches_after_failure() {
        // page 2 fails without yielding, so every later page sees the dying flag
        let transport = Arc::new(ScriptedTransport::new(300.0, 30.0).fail(2, ErrorKind::Transport));
        let (items, outcome) = run(transport.clone()).await;

        assert_eq!(outcome.unwrap_err().page(), Some(2));
        assert_eq!(transport.calls(), vec![1, 2]);
        assert_eq!(items.len(), 30);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stream_closes_once_under_random_latency() {
        for round in 0..25 {
            let mut transport = ScriptedTransport::new(157.0, 30.0).jitter(15);
            if round % 3 == 0 {
                transport = transport.fail(4, ErrorKind::Transport);
            }
            let transport = Arc::new(transport);
            let run = supervisor(transport.clone())
                .with_sink_capacity(1)
                .start(SearchQuery::new("Ursus"))
                .unwrap();
            let (mut stream, finish) = run.into_parts();

            let mut received = 0usize;
            while stream.next_item().await.is_some() {
                received += 1;
            }
            // once closed the stream stays closed
            assert!(stream.next_item().await.is_none());

            match finish.wait().await {
                Ok(summary) => {
                    assert_eq!(summary.items, received);
                    assert_eq!(received, 157);
                }
                Err(err) => {
                    assert_eq!(err.page(), Some(4));
                    assert!(received <= 157);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_start() {
        let transport = Arc::new(ScriptedTransport::new(10.0, 30.0));
        let err = supervisor(transport.clone()).start(SearchQuery::new("")).unwrap_err();

        assert!(err.is_validation());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_stream_fails_the_run() {
        let transport = Arc::new(ScriptedTransport::new(157.0, 30.0));
        let run = supervisor(transport)
            .with_sink_capacity(1)
            .start(SearchQuery::new("Ursus"))
            .unwrap();
        let (stream, finish) = run.into_parts();
        drop(stream);

        let err = finish.wait().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.page(), Some(1));
    }
}
