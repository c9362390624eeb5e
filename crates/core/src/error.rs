//! Error types surfaced by the core crate.

use std::path::PathBuf;

use thiserror::Error;

/// A dataset could not be fetched or did not have the expected shape.
///
/// Loads are all-or-nothing: whenever this is returned no part of the
/// dataset has been accepted.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the dataset file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The HTTP request could not be completed.
    #[error("request to {url} failed: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("{url} responded with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The document is not valid JSON for the dataset.
    #[error("{dataset} could not be parsed: {source}")]
    Parse {
        /// Dataset name.
        dataset: &'static str,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The document parsed but its structure is not usable.
    #[error("{dataset} has an unexpected shape: {reason}")]
    Shape {
        /// Dataset name.
        dataset: &'static str,
        /// Human readable description of the mismatch.
        reason: String,
    },
}

/// Failure reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure for the given key file.
    #[error("storage I/O failed for {}: {source}", path.display())]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The stored text could not be encoded or decoded.
    #[error("stored value for `{key}` is invalid: {source}")]
    Encoding {
        /// Storage key.
        key: String,
        /// JSON failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a bulletin board operation. No state changes when returned.
#[derive(Debug, Error)]
pub enum BoardError {
    /// A required field was empty after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    /// No post with the given id exists.
    #[error("post #{0} not found")]
    NotFound(u64),
    /// The acting author does not own the post and developer mode is off.
    #[error("only the author of post #{0} may change it")]
    Forbidden(u64),
    /// Persisting the board failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure toggling the acquired flag of a record.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The key does not name a record of the loaded catalog.
    #[error("no record with key `{0}`")]
    UnknownKey(String),
    /// Persisting the acquired set failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
