//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Batch scope or lookup named a domain that does not exist.
    #[error("domain not found: {0}")]
    DomainNotFound(String),

    /// A domain with this name already exists.
    #[error("domain already exists: {0}")]
    DomainExists(String),

    /// Post not found.
    #[error("post not found: {0}")]
    PostNotFound(String),

    /// Document content serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another post of the domain already uses this slug.
    #[error("slug already in use: {0}")]
    SlugTaken(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Background task failed.
    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
