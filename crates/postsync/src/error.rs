//! Error types for the Postsync facade.

use postsync_core::{CoreError, DocumentId, PostId};
use postsync_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Postsync operations.
///
/// Remote and transport failures of a reconciliation are not errors: they
/// come back inside the `SyncResult`.
#[derive(Debug, Error)]
pub enum PostsyncError {
    /// Input collections violated an invariant (duplicate id).
    #[error("invalid input: {0}")]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The operation needs a signed-in user.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The domain does not exist or belongs to someone else.
    #[error("domain not found or access denied: {0}")]
    DomainNotFound(String),

    /// Another post of the domain already uses this slug.
    #[error("slug already in use: {0}")]
    SlugTaken(String),

    /// Post not found.
    #[error("post not found: {0}")]
    PostNotFound(PostId),

    /// Document not found.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),
}

/// Result type for Postsync operations.
pub type Result<T> = std::result::Result<T, PostsyncError>;
