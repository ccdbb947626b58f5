//! Error types for parlor.

use std::io;
use thiserror::Error;

/// Result type alias for parlor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in parlor operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store answered, but rejected the command.
    #[error("Store command failed: {0}")]
    StoreCommand(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Local I/O error (config file, stdout).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied an unusable argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether the failure is a transport problem the caller may retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        if err.kind() == redis::ErrorKind::IoError
            || err.is_timeout()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
        {
            Self::StoreUnavailable(err.to_string())
        } else {
            Self::StoreCommand(err.to_string())
        }
    }
}
