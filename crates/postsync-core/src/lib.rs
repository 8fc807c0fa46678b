//! # Postsync Core
//!
//! Pure primitives for Postsync: the post model, change classification and
//! the diff engine.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over post collections.
//!
//! ## Key Types
//!
//! - [`Post`] - The reconcilable entity
//! - [`PostDifferences`] - Updates, creates and deletes between two collections
//! - [`ChangeClassifier`] - Tracked-field table, comparator and patch builder
//! - [`SyncRequest`] - The batch sent to the backing store
//! - [`SyncResult`] - The caller-facing outcome of a reconciliation
//!
//! ## Diffing
//!
//! ```rust
//! use postsync_core::{diff, DomainId, Post};
//!
//! let domain = DomainId::new("d1");
//! let baseline = vec![Post::new("1", "Draft", domain.clone())];
//! let local = vec![Post::new("1", "Final", domain)];
//!
//! let changes = diff(&local, &baseline).unwrap();
//! assert_eq!(changes.updates.len(), 1);
//! assert_eq!(changes.updates[0].title.as_deref(), Some("Final"));
//! ```

pub mod batch;
pub mod classify;
pub mod diff;
pub mod document;
pub mod error;
pub mod post;
pub mod result;
pub mod slug;
pub mod types;

pub use batch::SyncRequest;
pub use classify::{ChangeClassifier, ClassifierOptions, PostCreate, PostUpdate, TrackedField};
pub use diff::{diff, PostDifferences};
pub use document::{empty_document_content, Document};
pub use error::{Collection, CoreError, Result};
pub use post::{DocumentRef, Domain, Post};
pub use result::SyncResult;
pub use slug::normalize_slug;
pub use types::{now_millis, DocumentId, DomainId, OwnerId, PostId};
