//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, trace};
use url::Url;

use super::PageTransport;
use crate::config::FetchConfig;
use crate::errors::{EolError, Result};
use crate::pages::TaxonPage;
use crate::search::PageBatch;

/// Transport that performs plain HTTP GETs and decodes JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpTransport {
    /// Builds a transport from a fetch configuration.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| EolError::Config(format!("invalid header name {key:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| EolError::Config(format!("invalid value for header {key:?}: {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EolError::Config(format!("cannot build http client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let start = Instant::now();
        trace!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| EolError::Transport(format!("could not get http response: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(EolError::NotFound(format!("status {status} from {url}")));
        }
        if !status.is_success() {
            return Err(EolError::Transport(format!("status {status} from {url}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EolError::Transport(format!("could not read http response body: {e}")))?;
        let decoded = serde_json::from_slice(&body)
            .map_err(|e| EolError::Decode(format!("could not decode response from {url}: {e}")))?;

        debug!(
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fetched"
        );
        Ok(decoded)
    }
}

#[async_trait]
impl PageTransport for HttpTransport {
    async fn fetch_page(&self, url: &Url) -> Result<PageBatch> {
        self.get_json(url).await
    }

    async fn fetch_taxon_page(&self, url: &Url) -> Result<TaxonPage> {
        self.get_json(url).await
    }
}
