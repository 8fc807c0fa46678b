//! Error types for Postsync Core.

use thiserror::Error;

use crate::types::PostId;

/// Which input collection of a diff an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// The caller's local working copy.
    Local,
    /// The last-synchronized baseline snapshot.
    Baseline,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Local => f.write_str("local"),
            Collection::Baseline => f.write_str("baseline"),
        }
    }
}

/// Core errors.
///
/// These are invariant violations on the caller's inputs. They are never
/// produced by remote or transport problems.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("duplicate post id {id} in {collection} collection")]
    DuplicateId { collection: Collection, id: PostId },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
