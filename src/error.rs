//! Store Errors
//!
//! One error type for every backend. Not-found is never an error; it is a
//! [`PostLookup`](crate::post::PostLookup) value.

use std::path::PathBuf;

/// Result alias used across the crate.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by post stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Local posts file missing or unreadable
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Local posts file is not a JSON array
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File that could not be parsed
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A record failed validation at the parse boundary
    #[error("invalid record {record}: {reason}")]
    InvalidRecord {
        /// Array index (local) or document key (remote)
        record: String,
        /// What was wrong with it
        reason: String,
    },

    /// Request failed before a response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// Remote store answered with a non-success status
    #[error("remote store error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the error body, or the raw body
        message: String,
    },

    /// Remote response could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Configuration invalid or incomplete
    #[error("configuration error: {0}")]
    Config(String),

    /// Simulated failure
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create an invalid-record error.
    pub fn invalid_record(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure happened talking to the remote store.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Api { .. } | Self::Decode(_) | Self::Unavailable(_)
        )
    }
}
