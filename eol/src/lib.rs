//! # eol
//!
//! An async client for the Encyclopedia of Life (EOL) API.
//!
//! The interesting part is search: EOL returns results in numbered pages
//! and only says how many pages exist once the first one arrives. The client
//! provides:
//!
//! - **Paginated fan-out**: page 1 is fetched first, then every remaining
//!   page is fetched concurrently
//! - **Ordered merge**: page 1's items always lead the result, later pages
//!   follow in completion order through a bounded channel
//! - **All-or-nothing results**: the first page failure is recorded, stops
//!   pages that have not started yet, and fails the whole search
//! - **Taxon page lookup**: a single request for one EOL page
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eol::prelude::*;
//!
//! let client = EolClient::new(EolConfig::default())?;
//! let bears = client.search(&SearchQuery::new("Ursus")).await?;
//! println!("{} results, first: {}", bears.len(), bears[0].title);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pages;
pub mod search;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{EolClient, SearchResults};
    pub use crate::config::{EolConfig, FetchConfig, LoggingConfig};
    pub use crate::errors::{EolError, ErrorKind, Result};
    pub use crate::logging::init_logging;
    pub use crate::pages::{Media, TaxonPage, TaxonPageQuery, Vetted};
    pub use crate::search::{FetchSummary, FetchSupervisor, ResultItem, SearchQuery};
    pub use crate::transport::PageTransport;

    #[cfg(feature = "http")]
    pub use crate::transport::HttpTransport;
}
