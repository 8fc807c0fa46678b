//! Error types for the sync module.

use thiserror::Error;

/// Failures of the remote call itself, as opposed to errors the backing
/// store reports in its reply.
///
/// These never reach the caller of a reconciliation: the result interpreter
/// turns them into a failed `SyncResult`.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level error (connection refused, reset, ...).
    #[error("transport error: {0}")]
    TransportError(String),

    /// Request or reply could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
