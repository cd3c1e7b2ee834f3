//! Unified error handling for the manualflow crate
//!
//! Errors fall into two tiers. Fatal errors ([`Error::CatalogUnavailable`],
//! [`Error::CorruptCheckpoint`]) abort the run before any work starts and
//! propagate to the process boundary. Per-task errors ([`FetchError`]) are
//! values contained within a single task execution and never terminate the
//! worker pool.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching a manual page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error (connection reset, DNS failure, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit signal from the server (429)
    #[error("Rate limited by server (status {0})")]
    RateLimited(u16),

    /// Retryable server error (5xx)
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Non-retryable client error (404 and friends)
    #[error("Client error: {0}")]
    ClientError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// All retry attempts exhausted
    #[error("Maximum retry attempts exceeded")]
    RetriesExhausted,

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::ServerError(_) | Self::Timeout => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::ClientError(_) | Self::RetriesExhausted | Self::InvalidUrl(_) => false,
        }
    }
}

/// Unified error type for the manualflow crate
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog snapshot cannot be read or parsed. Fatal: the run has no
    /// task list to work from.
    #[error("Catalog snapshot unavailable at {path}: {source}")]
    CatalogUnavailable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A checkpoint file exists but cannot be parsed. Fatal: aborting is the
    /// only option that does not risk overwriting prior progress.
    #[error("Corrupt checkpoint at {path}: {source}")]
    CorruptCheckpoint {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Fatal errors abort the run; everything else is contained per task
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CatalogUnavailable { .. } | Self::CorruptCheckpoint { .. }
        )
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_retryable() {
        assert!(FetchError::RateLimited(429).is_retryable());
        assert!(FetchError::ServerError(503).is_retryable());
        assert!(FetchError::Timeout.is_retryable());

        assert!(!FetchError::ClientError(404).is_retryable());
        assert!(!FetchError::RetriesExhausted.is_retryable());
        assert!(!FetchError::InvalidUrl("not a url".into()).is_retryable());
    }

    #[test]
    fn test_fatal_classification() {
        let corrupt = Error::CorruptCheckpoint {
            path: PathBuf::from("workflows.json"),
            source: serde_json::from_str::<serde_json::Value>("{")
                .expect_err("truncated JSON must fail to parse"),
        };
        assert!(corrupt.is_fatal());

        let fetch = Error::Fetch(FetchError::Timeout);
        assert!(!fetch.is_fatal());
    }

    #[test]
    fn test_error_conversion() {
        let fetch = FetchError::RetriesExhausted;
        let unified: Error = fetch.into();
        assert!(matches!(unified, Error::Fetch(_)));
    }
}
