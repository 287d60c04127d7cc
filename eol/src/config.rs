//! Configuration types for the EOL client.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::errors::{EolError, Result};

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Request timeout in seconds. Zero disables the timeout.
    #[serde(default)]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Additional headers to include.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_user_agent() -> String {
    concat!("eol-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 0.0,
            user_agent: default_user_agent(),
            headers: HashMap::new(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Gets timeout as Duration, or `None` when requests never time out.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_seconds > 0.0 && self.timeout_seconds.is_finite() {
            Some(Duration::from_secs_f64(self.timeout_seconds))
        } else {
            None
        }
    }
}

/// Configuration for log output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Combined configuration for the EOL client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EolConfig {
    /// API root; endpoint paths are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Capacity of the result sink shared by page workers.
    #[serde(default = "default_sink_capacity")]
    pub sink_capacity: usize,
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_base_url() -> String {
    "http://eol.org/api/".to_string()
}

fn default_sink_capacity() -> usize {
    5
}

impl Default for EolConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sink_capacity: default_sink_capacity(),
            fetch: FetchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EolConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the result sink capacity.
    #[must_use]
    pub fn with_sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity;
        self
    }

    /// Replaces the fetch configuration.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EolError::Config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EolError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        self.api_root()?;
        if self.sink_capacity == 0 {
            return Err(EolError::Config("sink_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Returns the parsed API root, normalised to end with a slash.
    pub fn api_root(&self) -> Result<Url> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)?;
        if url.cannot_be_a_base() {
            return Err(EolError::Config(format!("{} cannot be a base url", self.base_url)));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EolConfig::default();
        assert_eq!(config.sink_capacity, 5);
        assert_eq!(config.base_url, "http://eol.org/api/");
        assert!(config.fetch.timeout().is_none());
        assert!(config.fetch.user_agent.starts_with("eol-rs/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fetch_config_builder() {
        let config = FetchConfig::new()
            .with_timeout(2.5)
            .with_user_agent("custom-agent")
            .with_header("X-Api-Key", "secret");

        assert_eq!(config.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.user_agent, "custom-agent");
        assert_eq!(config.headers.get("X-Api-Key"), Some(&"secret".to_string()));
    }

    #[test]
    fn test_api_root_appends_slash() {
        let config = EolConfig::new().with_base_url("http://localhost:8080/api");
        assert_eq!(config.api_root().unwrap().as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = EolConfig::from_json_str(r#"{"sink_capacity": 16}"#).unwrap();
        assert_eq!(config.sink_capacity, 16);
        assert_eq!(config.base_url, "http://eol.org/api/");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = EolConfig::from_json_str(r#"{"sink_capacity": 0}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let err = EolConfig::new().with_base_url("not a url").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"base_url": "http://127.0.0.1:9000/", "fetch": {{"timeout_seconds": 1}}}}"#)
            .unwrap();

        let config = EolConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000/");
        assert_eq!(config.fetch.timeout(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = EolConfig::from_file("/nonexistent/eol.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
