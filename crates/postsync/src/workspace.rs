//! A store-backed bundle of the manager and the reconciler.

use std::sync::Arc;

use postsync_core::{Post, SyncResult};
use postsync_store::Store;
use postsync_sync::StoreRemote;

use crate::config::PostsyncConfig;
use crate::error::Result;
use crate::manager::PostManager;
use crate::reconciler::Reconciler;

/// Everything needed to edit and sync the posts of one store.
///
/// The reconciler talks to the same store through [`StoreRemote`], so
/// batches go through the wire codec exactly as they would over a network.
pub struct Workspace<S: Store> {
    manager: PostManager<S>,
    reconciler: Reconciler<StoreRemote<Arc<S>>>,
    config: PostsyncConfig,
}

impl<S: Store> Workspace<S> {
    /// Create a workspace over `store`.
    pub fn new(store: S, config: PostsyncConfig) -> Self {
        let store = Arc::new(store);
        Self {
            manager: PostManager::new(Arc::clone(&store), config.clone()),
            reconciler: Reconciler::new(StoreRemote::new(store), config.classifier.clone()),
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        self.manager.store()
    }

    /// Get the configuration.
    pub fn config(&self) -> &PostsyncConfig {
        &self.config
    }

    pub fn manager(&self) -> &PostManager<S> {
        &self.manager
    }

    pub fn reconciler(&self) -> &Reconciler<StoreRemote<Arc<S>>> {
        &self.reconciler
    }

    /// Reconcile `local` against `baseline` for the domain `scope`.
    pub async fn sync_posts(&self, local: &[Post], baseline: &[Post], scope: &str) -> Result<SyncResult> {
        self.reconciler.sync_posts(local, baseline, scope).await
    }
}
