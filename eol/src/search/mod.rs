//! Paginated search.
//!
//! This module provides:
//! - `SearchQuery` and request URL derivation
//! - Response models and page-count derivation
//! - The bounded result sink shared by page workers
//! - Per-search cancellation state
//! - Page workers and the fan-out supervisor

mod models;
mod query;
mod scope;
mod sink;
mod supervisor;
mod worker;

pub use models::{page_count, PageBatch, ResultItem};
pub use query::{search_endpoint, SearchQuery, SEARCH_PATH};
pub use scope::{CancellationScope, WorkerGuard};
pub use sink::{result_sink, ResultSink, ResultStream, DEFAULT_SINK_CAPACITY};
pub use supervisor::{FetchSummary, FetchSupervisor, RunOutcome, SupervisorRun};
pub use worker::{PageOutcome, PageSummary, PageWorker};
