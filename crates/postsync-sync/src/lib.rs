//! # Postsync Sync
//!
//! Delivery of change sets to the backing store.
//!
//! ## Overview
//!
//! A change set computed by the diff engine is sent to the backing store
//! as one batch through the [`RemoteStore`] seam. The store applies it
//! atomically and replies with a [`SyncResult`](postsync_core::SyncResult)
//! or an error object; [`interpret`] folds every possible outcome,
//! including transport failures, into a `SyncResult`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use postsync_core::diff;
//! use postsync_store::MemoryStore;
//! use postsync_sync::{StoreRemote, SyncDispatcher};
//!
//! async fn example() {
//!     let dispatcher = SyncDispatcher::new(StoreRemote::new(MemoryStore::new()));
//!     let changes = diff(&[], &[]).unwrap();
//!     let result = dispatcher.dispatch(changes, "example.com").await;
//!     assert!(result.success);
//! }
//! ```
//!
//! ## Message Flow
//!
//! ```text
//! Dispatcher                          Backing store
//!   |-- SyncRequest {scope, ...} ------>|
//!   |<-- {"data": SyncResult} ----------|   applied or conflicted
//!   |<-- {"error": {message}} ----------|   refused
//! ```

pub mod dispatch;
pub mod error;
pub mod interpret;
pub mod messages;
pub mod remote;

pub use dispatch::SyncDispatcher;
pub use error::{Result, SyncError};
pub use interpret::interpret;
pub use messages::{
    decode_reply, decode_request, encode_reply, encode_request, RemoteError, RemoteErrorCode,
    RemoteReply,
};
pub use remote::{local::StoreRemote, RemoteStore};
