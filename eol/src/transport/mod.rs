//! Network access used by the client.
//!
//! The search machinery never talks HTTP directly: it hands fully built
//! request URLs to a [`PageTransport`] and gets decoded payloads back. The
//! default implementation is [`HttpTransport`]; tests substitute their own.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpTransport;

use async_trait::async_trait;
use url::Url;

use crate::errors::Result;
use crate::pages::TaxonPage;
use crate::search::PageBatch;

/// Protocol for fetching and decoding API responses.
///
/// Implementations must be atomic per call: either a fully decoded payload
/// or an error, never a partially populated value. A 404 maps to
/// `NotFound`, any other failed request to `Transport`, and an undecodable
/// body to `Decode`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageTransport: Send + Sync {
    /// Fetches one page of search results.
    async fn fetch_page(&self, url: &Url) -> Result<PageBatch>;

    /// Fetches one taxon page.
    async fn fetch_taxon_page(&self, url: &Url) -> Result<TaxonPage>;
}
