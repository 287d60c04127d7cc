//! Error types for the EOL client.
//!
//! Every failure is classified into one of a small set of kinds so callers can
//! branch on what went wrong without parsing messages. Failures that happen
//! while fetching one page of a paginated search are wrapped with the page
//! number and request URL before they are recorded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for EOL client operations.
pub type Result<T> = std::result::Result<T, EolError>;

/// Classification of an [`EolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input, detected before any I/O.
    Validation,
    /// The remote API reported that the resource does not exist.
    NotFound,
    /// Connection failure or a non-2xx response.
    Transport,
    /// The response body could not be decoded.
    Decode,
    /// Invalid client configuration.
    Config,
    /// A bug or an unexpected runtime condition (panicked task, closed stream).
    Internal,
}

impl ErrorKind {
    /// Returns the kind as a stable snake_case string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Transport => "transport",
            Self::Decode => "decode",
            Self::Config => "config",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for the EOL client.
#[derive(Debug, Error)]
pub enum EolError {
    /// Invalid input such as an empty search term.
    #[error("validation error: {0}")]
    Validation(String),

    /// The remote API answered 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network failure or a non-2xx status other than 404.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body is not a valid payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unexpected runtime failure.
    #[error("internal error: {0}")]
    Internal(String),

    /// A failure while fetching one page of a search.
    #[error("page {page} failed ({url}): {source}")]
    Page {
        /// The page number that failed.
        page: u32,
        /// The request URL for that page.
        url: String,
        /// The underlying failure.
        #[source]
        source: Box<EolError>,
    },
}

impl EolError {
    /// Wraps an error with the page number and request URL it came from.
    #[must_use]
    pub fn for_page(page: u32, url: impl Into<String>, source: EolError) -> Self {
        Self::Page {
            page,
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Returns the kind of this error, looking through page context.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Config(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Page { source, .. } => source.kind(),
        }
    }

    /// Returns the page number this error is attributed to, if any.
    #[must_use]
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Page { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Returns the request URL this error is attributed to, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Page { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Whether this error was raised before any network activity.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("kind".to_string(), serde_json::json!(self.kind().as_str()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        if let Some(page) = self.page() {
            map.insert("page".to_string(), serde_json::json!(page));
        }
        if let Some(url) = self.url() {
            map.insert("url".to_string(), serde_json::json!(url));
        }
        map
    }
}

impl From<serde_json::Error> for EolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for EolError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid url: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_sees_through_page_context() {
        let err = EolError::for_page(
            3,
            "http://eol.org/api/search/1.0.json?q=Ursus&page=3",
            EolError::NotFound("404 Not Found".to_string()),
        );

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.page(), Some(3));
        assert!(err.url().unwrap().ends_with("page=3"));
    }

    #[test]
    fn test_page_error_message_names_page_and_cause() {
        let err = EolError::for_page(4, "http://x/4", EolError::Transport("503".to_string()));
        let message = err.to_string();

        assert!(message.contains("page 4"));
        assert!(message.contains("http://x/4"));
        assert!(message.contains("503"));
    }

    #[test]
    fn test_plain_errors_have_no_page() {
        let err = EolError::Validation("empty query".to_string());
        assert_eq!(err.page(), None);
        assert_eq!(err.url(), None);
        assert!(err.is_validation());
    }

    #[test]
    fn test_error_to_dict() {
        let err = EolError::for_page(2, "http://x/2", EolError::Decode("eof".to_string()));
        let dict = err.to_dict();

        assert_eq!(dict.get("kind"), Some(&serde_json::json!("decode")));
        assert_eq!(dict.get("page"), Some(&serde_json::json!(2)));
        assert_eq!(dict.get("url"), Some(&serde_json::json!("http://x/2")));
    }

    #[test]
    fn test_serde_json_error_is_decode() {
        let err: EolError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::Transport.as_str(), "transport");
    }
}
