//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use postsync::{PostsyncConfig, Session, Workspace};
use postsync_core::{Domain, DomainId, OwnerId, Post, PostCreate, PostId, SyncRequest, SyncResult};
use postsync_store::{MemoryStore, Store};
use postsync_sync::{RemoteReply, RemoteStore, SyncError};

/// Domain name used by [`TestFixture`].
pub const FIXTURE_DOMAIN: &str = "fixture.example";

/// Owner of the fixture domain.
pub const FIXTURE_OWNER: &str = "fixture-owner";

/// A plain post with only an id and a title.
pub fn post(id: &str, title: &str) -> Post {
    Post::new(PostId::new(id), title, DomainId::new(FIXTURE_DOMAIN))
}

/// A post with every tracked field set explicitly.
pub fn full_post(
    id: &str,
    title: &str,
    slug: Option<&str>,
    meta_description: Option<&str>,
    theme_id: Option<&str>,
) -> Post {
    let mut post = post(id, title);
    post.slug = slug.map(String::from);
    post.meta_description = meta_description.map(String::from);
    post.theme_id = theme_id.map(String::from);
    post
}

/// A test fixture with a memory store and one owned domain.
pub struct TestFixture {
    pub store: Arc<MemoryStore>,
    pub owner: OwnerId,
    pub domain: Domain,
}

impl TestFixture {
    /// Create a store with the fixture domain in it.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let owner = OwnerId::new(FIXTURE_OWNER);
        let domain = store
            .create_domain(FIXTURE_DOMAIN, &owner)
            .await
            .unwrap();
        Self {
            store,
            owner,
            domain,
        }
    }

    /// A session for the fixture owner.
    pub fn session(&self) -> Session {
        Session::authenticated(self.owner.clone())
    }

    /// A workspace sharing the fixture store.
    pub fn workspace(&self) -> Workspace<Arc<MemoryStore>> {
        Workspace::new(Arc::clone(&self.store), PostsyncConfig::default())
    }

    /// Insert a post directly into the store.
    pub async fn insert_post(&self, title: &str, slug: Option<&str>) -> Post {
        let create = PostCreate::new(title).with_slug(slug.map(String::from));
        self.store.insert_post(&self.domain.id, &create).await.unwrap()
    }

    /// Current posts of the fixture domain, as a fresh baseline.
    pub async fn baseline(&self) -> Vec<Post> {
        self.store
            .list_posts_by_domain(FIXTURE_DOMAIN)
            .await
            .unwrap()
    }
}

/// A reply a [`ScriptedRemote`] gives.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// `{"data": result}`.
    Data(SyncResult),
    /// `{"error": {"message": ...}}`.
    Error(String),
    /// The call itself fails.
    Transport(String),
}

impl ScriptedReply {
    fn into_outcome(self) -> Result<RemoteReply, SyncError> {
        match self {
            ScriptedReply::Data(result) => Ok(RemoteReply::Data(result)),
            ScriptedReply::Error(message) => Ok(RemoteReply::Error(postsync_sync::RemoteError {
                message,
                code: None,
            })),
            ScriptedReply::Transport(message) => Err(SyncError::TransportError(message)),
        }
    }
}

/// A remote that records requests and answers from a script.
///
/// Once the script runs out, every call succeeds.
#[derive(Default)]
pub struct ScriptedRemote {
    script: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<SyncRequest>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next calls with `replies`, in order.
    pub fn with_replies(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<SyncRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for ScriptedRemote {
    async fn sync_posts(&self, request: &SyncRequest) -> Result<RemoteReply, SyncError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(ScriptedReply::Data(SyncResult::ok()))
            .into_outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postsync::Reconciler;
    use postsync_core::ClassifierOptions;

    #[tokio::test]
    async fn test_fixture_round_trip() {
        let fixture = TestFixture::new().await;
        fixture.insert_post("One", Some("/one")).await;
        fixture.insert_post("Two", None).await;

        let baseline = fixture.baseline().await;
        assert_eq!(baseline.len(), 2);

        let mut local = baseline.clone();
        local.retain(|p| p.title != "Two");

        let result = fixture
            .workspace()
            .sync_posts(&local, &baseline, FIXTURE_DOMAIN)
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(fixture.baseline().await.len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let remote = ScriptedRemote::with_replies([
            ScriptedReply::Error("permission denied".into()),
            ScriptedReply::Transport("reset".into()),
        ]);
        let reconciler = Reconciler::new(remote, ClassifierOptions::default());
        let local = vec![post("1", "A")];

        let first = reconciler.sync_posts(&local, &[], "d").await.unwrap();
        let second = reconciler.sync_posts(&local, &[], "d").await.unwrap();
        let third = reconciler.sync_posts(&local, &[], "d").await.unwrap();

        assert_eq!(first, SyncResult::failure("permission denied"));
        assert_eq!(second, SyncResult::failure("transport error: reset"));
        assert_eq!(third, SyncResult::ok());
        assert_eq!(reconciler.remote().calls(), 3);
    }
}
