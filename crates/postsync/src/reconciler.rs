//! Reconciliation: diff a locally edited collection against its baseline and
//! push the difference to the backing store.

use postsync_core::{ChangeClassifier, ClassifierOptions, Post, PostDifferences, SyncResult};
use postsync_sync::{RemoteStore, SyncDispatcher};

use crate::error::Result;

/// Computes and dispatches change sets.
///
/// Holds no state between calls: the baseline is supplied fresh by the
/// caller every time.
pub struct Reconciler<R: RemoteStore> {
    classifier: ChangeClassifier,
    dispatcher: SyncDispatcher<R>,
}

impl<R: RemoteStore> Reconciler<R> {
    /// Create a reconciler that sends batches to `remote`.
    pub fn new(remote: R, options: ClassifierOptions) -> Self {
        Self {
            classifier: ChangeClassifier::new(options),
            dispatcher: SyncDispatcher::new(remote),
        }
    }

    /// Get the remote reference.
    pub fn remote(&self) -> &R {
        self.dispatcher.remote()
    }

    /// Get the classifier options.
    pub fn options(&self) -> &ClassifierOptions {
        self.classifier.options()
    }

    /// Compute the change set turning `baseline` into `local`.
    pub fn find_post_differences(&self, local: &[Post], baseline: &[Post]) -> Result<PostDifferences> {
        Ok(self.classifier.diff(local, baseline)?)
    }

    /// Diff and dispatch in one step.
    ///
    /// Fails only when an input collection carries a duplicate id. Remote
    /// errors, transport failures and conflicts all resolve to a
    /// [`SyncResult`].
    pub async fn sync_posts(
        &self,
        local: &[Post],
        baseline: &[Post],
        scope: &str,
    ) -> Result<SyncResult> {
        let changes = self.find_post_differences(local, baseline)?;
        Ok(self.dispatcher.dispatch(changes, scope).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PostsyncError;
    use async_trait::async_trait;
    use postsync_core::{Collection, CoreError, DomainId, PostId, SyncRequest};
    use postsync_sync::{RemoteReply, SyncError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRemote {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteStore for CountingRemote {
        async fn sync_posts(
            &self,
            _request: &SyncRequest,
        ) -> std::result::Result<RemoteReply, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SyncError::TransportError("offline".into()))
        }
    }

    fn post(id: &str, title: &str) -> Post {
        Post::new(PostId::new(id), title, DomainId::new("d"))
    }

    #[tokio::test]
    async fn test_unchanged_collection_makes_no_call() {
        let reconciler = Reconciler::new(CountingRemote::default(), ClassifierOptions::default());
        let posts = vec![post("1", "A"), post("2", "B")];

        let result = reconciler.sync_posts(&posts, &posts, "site").await.unwrap();

        assert_eq!(result, SyncResult::ok());
        assert_eq!(reconciler.remote().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_resolves_to_result() {
        let reconciler = Reconciler::new(CountingRemote::default(), ClassifierOptions::default());

        let result = reconciler
            .sync_posts(&[post("1", "B")], &[post("1", "A")], "site")
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.errors, vec!["transport error: offline".to_string()]);
        assert_eq!(reconciler.remote().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_an_error() {
        let reconciler = Reconciler::new(CountingRemote::default(), ClassifierOptions::default());
        let local = vec![post("1", "A"), post("1", "B")];

        let err = reconciler.sync_posts(&local, &[], "site").await.unwrap_err();

        assert!(matches!(
            err,
            PostsyncError::Core(CoreError::DuplicateId { collection: Collection::Local, .. })
        ));
        assert_eq!(reconciler.remote().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_options_are_applied() {
        let reconciler = Reconciler::new(
            CountingRemote::default(),
            ClassifierOptions::default().with_normalize_empty_slug(true),
        );
        let baseline = vec![post("1", "A")];
        let local = vec![post("1", "A").with_slug("")];

        let changes = reconciler.find_post_differences(&local, &baseline).unwrap();
        assert!(changes.is_empty());
    }
}
