//! # Postsync Store
//!
//! Backing-store abstraction for Postsync. Provides a trait-based interface
//! for post persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts the authoritative post store behind the
//! [`Store`] trait. The reconciliation engine reaches it only through the
//! atomic batch procedure ([`Store::apply_batch`]); the remaining methods
//! serve the read side and post/document creation.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use postsync_core::{OwnerId, PostCreate};
//! use postsync_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     let store = SqliteStore::open("posts.db").unwrap();
//!
//!     let domain = store
//!         .create_domain("example", &OwnerId::new("alice"))
//!         .await
//!         .unwrap();
//!     let post = store
//!         .insert_post(&domain.id, &PostCreate::new("Hello"))
//!         .await
//!         .unwrap();
//!     println!("created {}", post.id);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **All or nothing**: a batch with any conflict leaves the store untouched
//! - **Scoped batches**: updates and deletes may only touch posts of the
//!   batch's domain
//! - **Unique slugs**: two posts of one domain may not share a non-null slug

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::Store;
