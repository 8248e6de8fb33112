//! Error types for the search pipeline.
//!
//! Defines:
//! - `SearchError` for failures while executing a query against a source
//! - `StorageError` for failures of the recent-history persistence layer
//!
//! Neither type ever reaches the rendering layer directly: query failures
//! become an error status on the query state, storage failures degrade the
//! history store to memory-only operation.

use thiserror::Error;

/// Failure while running a search against a source
#[derive(Debug, Error)]
pub enum SearchError {
    /// Transport-level failure (connection refused, timeout, ...)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status code
    #[error("backend returned status {0}")]
    Status(u16),

    /// The response body could not be decoded
    #[error("could not decode search response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The endpoint URL could not be built
    #[error("invalid search endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The local catalog could not be read
    #[error("catalog unavailable: {0}")]
    Catalog(String),

    /// No thread could be started to run the query
    #[error("could not start search: {0}")]
    Spawn(std::io::Error),
}

/// Failure of the recent-history persistence layer
#[derive(Debug, Error)]
pub enum StorageError {
    /// No usable storage location exists on this system
    #[error("history storage unavailable: {0}")]
    Unavailable(String),

    #[error("history storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history storage holds malformed data: {0}")]
    Format(#[from] serde_json::Error),
}
