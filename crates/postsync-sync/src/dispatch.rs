//! Sync dispatcher.
//!
//! Sends a change set to the backing store as a single batch.

use postsync_core::{PostDifferences, SyncRequest, SyncResult};

use crate::interpret::interpret;
use crate::remote::RemoteStore;

/// Sends change sets to a [`RemoteStore`].
pub struct SyncDispatcher<R: RemoteStore> {
    remote: R,
}

impl<R: RemoteStore> SyncDispatcher<R> {
    /// Create a dispatcher that talks to `remote`.
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    /// Get the remote reference.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Send `changes` for `scope` and interpret the reply.
    ///
    /// An empty change set succeeds without contacting the remote. Anything
    /// else is sent as exactly one request carrying all three lists; there
    /// is no retry, splitting or reordering.
    pub async fn dispatch(&self, changes: PostDifferences, scope: &str) -> SyncResult {
        if changes.is_empty() {
            tracing::debug!(scope, "no changes, skipping remote call");
            return SyncResult::ok();
        }

        let request = SyncRequest::new(scope, changes);
        tracing::debug!(
            scope,
            updates = request.updates.len(),
            creates = request.creates.len(),
            deletes = request.deletes.len(),
            "dispatching batch"
        );

        let result = interpret(self.remote.sync_posts(&request).await);
        if result.success {
            tracing::info!(scope, operations = request.operation_count(), "batch applied");
        }
        result
    }
}
