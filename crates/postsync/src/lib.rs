//! # Postsync
//!
//! Reconciliation of a locally edited post collection with its backing
//! store.
//!
//! ## Overview
//!
//! An editor loads the posts of a domain, lets the user change them, and
//! then hands two collections back: the edited `local` copy and the
//! `baseline` it started from. Postsync computes the minimal change set
//! between them and sends it to the backing store as one atomic batch.
//!
//! - **Diff**: pure and deterministic, never mutates its inputs
//! - **Dispatch**: empty change sets make no call at all
//! - **Result**: remote failures resolve to a `SyncResult`, never an error
//!
//! ## Usage
//!
//! ```rust,no_run
//! use postsync::{PostsyncConfig, Session, Workspace};
//! use postsync::core::OwnerId;
//! use postsync::store::{SqliteStore, Store};
//!
//! async fn example() {
//!     let store = SqliteStore::open("posts.db").unwrap();
//!     store.create_domain("example.com", &OwnerId::new("alice")).await.unwrap();
//!     let workspace = Workspace::new(store, PostsyncConfig::default());
//!
//!     let session = Session::authenticated("alice");
//!     workspace
//!         .manager()
//!         .create_post(&session, "example.com", "hello", Some("Hello"))
//!         .await
//!         .unwrap();
//!
//!     let baseline = workspace.manager().fetch_domain_posts("example.com").await.unwrap();
//!     let mut local = baseline.clone();
//!     local[0].title = "Hello, world".into();
//!
//!     let result = workspace
//!         .sync_posts(&local, &baseline, "example.com")
//!         .await
//!         .unwrap();
//!     assert!(result.success);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `postsync::core` - Post model, classifier and diff engine
//! - `postsync::store` - Backing-store abstraction, memory and SQLite
//! - `postsync::sync` - Dispatcher, wire messages and result interpreter

pub mod config;
pub mod error;
pub mod manager;
pub mod reconciler;
pub mod workspace;

// Re-export component crates
pub use postsync_core as core;
pub use postsync_store as store;
pub use postsync_sync as sync;

// Re-export main types for convenience
pub use config::{PostsyncConfig, DEFAULT_POST_TITLE};
pub use error::{PostsyncError, Result};
pub use manager::{DocumentLocation, PostManager, Session};
pub use reconciler::Reconciler;
pub use workspace::Workspace;

// Re-export commonly used core types
pub use postsync_core::{
    ClassifierOptions, Post, PostCreate, PostDifferences, PostId, PostUpdate, SyncResult,
};
