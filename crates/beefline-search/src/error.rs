//! Search error types.

use thiserror::Error;

/// Errors reported by a listing query service.
///
/// These never reach the view: the controller logs them and surfaces a
/// generic message instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The request could not be sent or the connection failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The service answered with an error status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The service future panicked.
    #[error("Query service panicked: {0}")]
    Panicked(String),
}

/// Errors from a key-value storage port.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read or write the backing medium.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or deserialize a stored value.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store is unusable (for example a poisoned lock).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
