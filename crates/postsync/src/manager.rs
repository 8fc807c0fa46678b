//! Post management: the read side that feeds reconciliation, plus post and
//! document creation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use postsync_core::{
    empty_document_content, normalize_slug, Document, DocumentId, OwnerId, Post, PostCreate,
    PostId,
};
use postsync_store::{Store, StoreError};

use crate::config::PostsyncConfig;
use crate::error::{PostsyncError, Result};

/// The principal making a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<OwnerId>,
}

impl Session {
    /// A session with no signed-in user.
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// A session for `user`.
    pub fn authenticated(user: impl Into<OwnerId>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    /// The signed-in user, or `NotAuthenticated`.
    pub fn require_user(&self) -> Result<&OwnerId> {
        self.user.as_ref().ok_or(PostsyncError::NotAuthenticated)
    }
}

/// Where a document is published: the slug of its post and its own tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLocation {
    pub slug: Option<String>,
    pub tag: Option<String>,
}

/// Post and document operations over a [`Store`].
pub struct PostManager<S: Store> {
    store: Arc<S>,
    config: PostsyncConfig,
}

impl<S: Store> Clone for PostManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> PostManager<S> {
    /// Create a manager over a shared store.
    pub fn new(store: Arc<S>, config: PostsyncConfig) -> Self {
        Self { store, config }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Posts
    // ─────────────────────────────────────────────────────────────────────────

    /// All posts in domains owned by the session's user, newest first.
    pub async fn fetch_user_posts(&self, session: &Session) -> Result<Vec<Post>> {
        let user = session.require_user()?;
        Ok(self.store.list_posts_by_owner(user).await?)
    }

    /// All posts of a domain, newest first. Unknown domains have no posts.
    pub async fn fetch_domain_posts(&self, domain_name: &str) -> Result<Vec<Post>> {
        Ok(self.store.list_posts_by_domain(domain_name).await?)
    }

    /// Create a post in one of the user's domains.
    ///
    /// A missing title becomes the configured default; an empty slug is
    /// stored as `None`.
    pub async fn create_post(
        &self,
        session: &Session,
        domain_name: &str,
        slug: &str,
        title: Option<&str>,
    ) -> Result<Post> {
        let user = session.require_user()?;

        let domain = match self.store.get_domain(domain_name).await? {
            Some(domain) if &domain.owner_id == user => domain,
            _ => return Err(PostsyncError::DomainNotFound(domain_name.to_string())),
        };

        let title = title.unwrap_or(&self.config.default_post_title);
        let create = PostCreate::new(title).with_slug(normalize_slug(slug));
        let post = self
            .store
            .insert_post(&domain.id, &create)
            .await
            .map_err(|e| match e {
                StoreError::SlugTaken(slug) => PostsyncError::SlugTaken(slug),
                other => PostsyncError::Store(other),
            })?;

        tracing::info!(post_id = %post.id, domain = domain_name, "created post");
        Ok(post)
    }

    /// Look up which post now carries a domain's former slug.
    pub async fn resolve_redirect(&self, domain_name: &str, old_slug: &str) -> Result<Option<Post>> {
        let Some(post_id) = self.store.resolve_redirect(domain_name, old_slug).await? else {
            return Ok(None);
        };
        Ok(self.store.get_post(&post_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Documents
    // ─────────────────────────────────────────────────────────────────────────

    /// Documents of a post, newest first.
    pub async fn fetch_post_documents(&self, post_id: &PostId) -> Result<Vec<Document>> {
        Ok(self.store.list_documents(post_id).await?)
    }

    /// Attach an empty document to a post.
    pub async fn create_document(&self, post_id: &PostId, tag: Option<&str>) -> Result<Document> {
        if self.store.get_post(post_id).await?.is_none() {
            return Err(PostsyncError::PostNotFound(post_id.clone()));
        }

        let document = self
            .store
            .insert_document(post_id, tag, &empty_document_content(), None)
            .await?;

        tracing::debug!(document_id = %document.id, post_id = %post_id, "created document");
        Ok(document)
    }

    /// Slug of the document's post and the document's tag.
    pub async fn document_slug_and_tag(&self, document_id: &DocumentId) -> Result<DocumentLocation> {
        let document = self
            .store
            .get_document(document_id)
            .await?
            .ok_or_else(|| PostsyncError::DocumentNotFound(document_id.clone()))?;

        let slug = self
            .store
            .get_post(&document.post_id)
            .await?
            .filter(Post::is_published)
            .and_then(|post| post.slug);

        Ok(DocumentLocation {
            slug,
            tag: document.tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postsync_store::MemoryStore;

    async fn setup() -> PostManager<MemoryStore> {
        let store = MemoryStore::new();
        store
            .create_domain("alice.blog", &OwnerId::new("alice"))
            .await
            .unwrap();
        store
            .create_domain("bob.blog", &OwnerId::new("bob"))
            .await
            .unwrap();
        PostManager::new(Arc::new(store), PostsyncConfig::default())
    }

    #[tokio::test]
    async fn test_anonymous_session_rejected() {
        let manager = setup().await;

        let err = manager.fetch_user_posts(&Session::anonymous()).await.unwrap_err();
        assert!(matches!(err, PostsyncError::NotAuthenticated));

        let err = manager
            .create_post(&Session::anonymous(), "alice.blog", "hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PostsyncError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_create_post_defaults() {
        let manager = setup().await;
        let alice = Session::authenticated("alice");

        let post = manager
            .create_post(&alice, "alice.blog", "", None)
            .await
            .unwrap();

        assert_eq!(post.title, "Untitled");
        assert_eq!(post.slug, None);
    }

    #[tokio::test]
    async fn test_create_post_custom_default_title() {
        let store = MemoryStore::new();
        store
            .create_domain("alice.blog", &OwnerId::new("alice"))
            .await
            .unwrap();
        let manager = PostManager::new(
            Arc::new(store),
            PostsyncConfig::default().with_default_post_title("Draft"),
        );

        let post = manager
            .create_post(&Session::authenticated("alice"), "alice.blog", "x", None)
            .await
            .unwrap();
        assert_eq!(post.title, "Draft");
        assert_eq!(post.slug.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_create_post_in_foreign_domain() {
        let manager = setup().await;
        let alice = Session::authenticated("alice");

        let err = manager
            .create_post(&alice, "bob.blog", "mine", Some("Mine"))
            .await
            .unwrap_err();
        assert!(matches!(err, PostsyncError::DomainNotFound(ref name) if name == "bob.blog"));

        let err = manager
            .create_post(&alice, "nobody.blog", "mine", Some("Mine"))
            .await
            .unwrap_err();
        assert!(matches!(err, PostsyncError::DomainNotFound(_)));

        assert!(manager.fetch_domain_posts("bob.blog").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_post_with_taken_slug() {
        let manager = setup().await;
        let alice = Session::authenticated("alice");

        manager.create_post(&alice, "alice.blog", "/x", Some("A")).await.unwrap();
        let err = manager
            .create_post(&alice, "alice.blog", "/x", Some("B"))
            .await
            .unwrap_err();
        assert!(matches!(err, PostsyncError::SlugTaken(ref slug) if slug == "/x"));

        // Empty slugs never collide.
        manager.create_post(&alice, "alice.blog", "", Some("C")).await.unwrap();
        manager.create_post(&alice, "alice.blog", "", Some("D")).await.unwrap();

        let posts = manager.fetch_domain_posts("alice.blog").await.unwrap();
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|p| p.title != "B"));
    }

    #[tokio::test]
    async fn test_fetch_user_posts_only_own_domains() {
        let manager = setup().await;
        let alice = Session::authenticated("alice");
        let bob = Session::authenticated("bob");

        manager.create_post(&alice, "alice.blog", "a", Some("A")).await.unwrap();
        manager.create_post(&bob, "bob.blog", "b", Some("B")).await.unwrap();

        let posts = manager.fetch_user_posts(&alice).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "A");
    }

    #[tokio::test]
    async fn test_documents() {
        let manager = setup().await;
        let alice = Session::authenticated("alice");
        let post = manager
            .create_post(&alice, "alice.blog", "hello", Some("Hello"))
            .await
            .unwrap();

        let doc = manager.create_document(&post.id, Some("intro")).await.unwrap();
        assert_eq!(doc.content, empty_document_content());

        let docs = manager.fetch_post_documents(&post.id).await.unwrap();
        assert_eq!(docs.len(), 1);

        let location = manager.document_slug_and_tag(&doc.id).await.unwrap();
        assert_eq!(
            location,
            DocumentLocation {
                slug: Some("hello".into()),
                tag: Some("intro".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_document_for_missing_post() {
        let manager = setup().await;

        let err = manager
            .create_document(&PostId::new("missing"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PostsyncError::PostNotFound(_)));

        let err = manager
            .document_slug_and_tag(&DocumentId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, PostsyncError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn test_unpublished_document_has_no_slug() {
        let manager = setup().await;
        let post = manager
            .create_post(&Session::authenticated("alice"), "alice.blog", "", None)
            .await
            .unwrap();
        let doc = manager.create_document(&post.id, None).await.unwrap();

        let location = manager.document_slug_and_tag(&doc.id).await.unwrap();
        assert_eq!(location, DocumentLocation { slug: None, tag: None });
    }
}
