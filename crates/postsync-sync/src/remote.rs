//! Remote abstraction for the batch procedure.
//!
//! The dispatcher only knows [`RemoteStore`]. Implementations may talk to
//! an HTTP RPC endpoint, a database function, or (for tests and embedded
//! use) a local [`Store`](postsync_store::Store).

use std::sync::Arc;

use async_trait::async_trait;

use postsync_core::SyncRequest;

use crate::error::Result;
use crate::messages::RemoteReply;

/// The remote batch procedure.
///
/// Implementations must be thread-safe (Send + Sync). They are passed to the
/// dispatcher explicitly; there is no process-wide client.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Send one batch and wait for the reply.
    ///
    /// - `Ok(RemoteReply::Data)`: the store processed the batch.
    /// - `Ok(RemoteReply::Error)`: the store reported an error.
    /// - `Err`: the call itself failed (transport, decoding).
    async fn sync_posts(&self, request: &SyncRequest) -> Result<RemoteReply>;
}

#[async_trait]
impl<R: RemoteStore + ?Sized> RemoteStore for Arc<R> {
    async fn sync_posts(&self, request: &SyncRequest) -> Result<RemoteReply> {
        (**self).sync_posts(request).await
    }
}

/// An in-process remote backed by a [`Store`](postsync_store::Store).
///
/// Requests and replies go through the JSON wire codec, so this exercises
/// the same encoding a networked remote would.
pub mod local {
    use super::*;
    use postsync_store::{Store, StoreError};

    use crate::messages::{
        decode_reply, decode_request, encode_reply, encode_request, RemoteErrorCode,
    };

    /// Remote that serves batch requests from a local store.
    pub struct StoreRemote<S: Store> {
        store: S,
    }

    impl<S: Store> StoreRemote<S> {
        /// Serve batches from `store`.
        pub fn new(store: S) -> Self {
            Self { store }
        }

        /// Get the store reference.
        pub fn store(&self) -> &S {
            &self.store
        }

        /// Server side: decode a request, apply it, encode the reply.
        pub async fn serve(&self, bytes: &[u8]) -> Result<Vec<u8>> {
            let reply = match decode_request(bytes) {
                Ok(request) => self.apply(&request).await,
                Err(e) => RemoteReply::error(RemoteErrorCode::InvalidRequest, e.to_string()),
            };
            encode_reply(&reply)
        }

        async fn apply(&self, request: &SyncRequest) -> RemoteReply {
            match self.store.apply_batch(request).await {
                Ok(result) => RemoteReply::Data(result),
                Err(StoreError::DomainNotFound(scope)) => RemoteReply::error(
                    RemoteErrorCode::ScopeNotFound,
                    format!("domain not found: {}", scope),
                ),
                Err(e) => {
                    tracing::warn!(scope = %request.scope, error = %e, "store failed to apply batch");
                    RemoteReply::error(RemoteErrorCode::InternalError, e.to_string())
                }
            }
        }
    }

    #[async_trait]
    impl<S: Store> RemoteStore for StoreRemote<S> {
        async fn sync_posts(&self, request: &SyncRequest) -> Result<RemoteReply> {
            let bytes = encode_request(request)?;
            let reply = self.serve(&bytes).await?;
            decode_reply(&reply)
        }
    }
}
