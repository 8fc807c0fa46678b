//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;

use postsync_core::{
    now_millis, Document, DocumentId, DocumentRef, Domain, DomainId, OwnerId, Post, PostCreate,
    PostId, SyncRequest, SyncResult,
};

use crate::error::{Result, StoreError};
use crate::traits::{conflict, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
/// Batches run against a copy of the state that replaces the original only
/// when the batch has no conflicts.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Clone, Default)]
struct MemoryStoreInner {
    /// Domains indexed by ID.
    domains: HashMap<DomainId, Domain>,

    /// Posts indexed by ID.
    posts: HashMap<PostId, Stored<Post>>,

    /// Documents indexed by ID.
    documents: HashMap<DocumentId, Stored<Document>>,

    /// Redirects: (domain_id, old_slug) -> post_id.
    redirects: HashMap<(DomainId, String), PostId>,

    /// Insertion counter, breaks ties between equal timestamps.
    next_seq: u64,
}

#[derive(Clone)]
struct Stored<T> {
    value: T,
    seq: u64,
}

impl MemoryStoreInner {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn domain_by_name(&self, domain_name: &str) -> Option<&Domain> {
        self.domains.values().find(|d| d.domain_name == domain_name)
    }

    /// Posts matching `filter`, newest first, with document refs attached.
    fn collect_posts(&self, filter: impl Fn(&Post) -> bool) -> Vec<Post> {
        let mut stored: Vec<&Stored<Post>> =
            self.posts.values().filter(|p| filter(&p.value)).collect();
        stored.sort_by(|a, b| {
            (b.value.created_at, b.seq).cmp(&(a.value.created_at, a.seq))
        });
        stored
            .into_iter()
            .map(|p| self.with_documents(p.value.clone()))
            .collect()
    }

    fn documents_of(&self, post_id: &PostId) -> Vec<Document> {
        let mut stored: Vec<&Stored<Document>> = self
            .documents
            .values()
            .filter(|d| &d.value.post_id == post_id)
            .collect();
        stored.sort_by(|a, b| {
            (b.value.created_at, b.seq).cmp(&(a.value.created_at, a.seq))
        });
        stored.into_iter().map(|d| d.value.clone()).collect()
    }

    fn with_documents(&self, mut post: Post) -> Post {
        post.documents = self
            .documents_of(&post.id)
            .into_iter()
            .map(|d| DocumentRef { id: d.id, tag: d.tag })
            .collect();
        post
    }

    fn slug_in_use(&self, domain_id: &DomainId, slug: &str) -> bool {
        self.posts
            .values()
            .any(|p| &p.value.domain_id == domain_id && p.value.slug.as_deref() == Some(slug))
    }

    /// Drop redirects whose old slug is carried by a post again.
    fn prune_redirects(&mut self, domain_id: &DomainId) {
        let live: HashSet<String> = self
            .posts
            .values()
            .filter(|p| &p.value.domain_id == domain_id)
            .filter_map(|p| p.value.slug.clone())
            .collect();
        self.redirects
            .retain(|(domain, slug), _| domain != domain_id || !live.contains(slug));
    }

    fn insert_post(&mut self, post: Post) {
        let seq = self.next_seq();
        self.posts.insert(post.id.clone(), Stored { value: post, seq });
    }

    /// Apply every operation of `request` to this state. Returns the
    /// conflicts found; the caller discards the state if there are any.
    fn apply_batch(&mut self, domain_id: &DomainId, request: &SyncRequest, now: i64) -> Vec<String> {
        let scope = request.scope.as_str();
        let mut conflicts = Vec::new();

        for update in &request.updates {
            let stored = match self.posts.get_mut(&update.id) {
                Some(stored) if &stored.value.domain_id == domain_id => stored,
                _ => {
                    conflicts.push(conflict::update_missing(&update.id, scope));
                    continue;
                }
            };

            let old_slug = stored.value.slug.clone();
            update.apply_to(&mut stored.value);
            stored.value.updated_at = now;

            if let Some(old) = old_slug {
                if stored.value.slug.as_deref() != Some(old.as_str()) {
                    self.redirects
                        .insert((domain_id.clone(), old), update.id.clone());
                }
            }
        }

        for create in &request.creates {
            let post = create
                .clone()
                .into_post(PostId::generate(), domain_id.clone(), now);
            self.insert_post(post);
        }

        for id in &request.deletes {
            match self.posts.get(id) {
                Some(stored) if &stored.value.domain_id == domain_id => {
                    self.posts.remove(id);
                    self.documents.retain(|_, d| &d.value.post_id != id);
                    self.redirects.retain(|_, post_id| post_id != id);
                }
                _ => conflicts.push(conflict::delete_missing(id, scope)),
            }
        }

        self.prune_redirects(domain_id);

        conflicts.extend(conflict::slug_collisions(
            self.posts
                .values()
                .filter(|p| &p.value.domain_id == domain_id)
                .filter_map(|p| p.value.slug.as_deref()),
            scope,
        ));

        conflicts
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_domain(&self, domain_name: &str, owner_id: &OwnerId) -> Result<Domain> {
        let mut inner = self.write()?;

        if inner.domain_by_name(domain_name).is_some() {
            return Err(StoreError::DomainExists(domain_name.to_string()));
        }

        let now = now_millis();
        let domain = Domain {
            id: DomainId::generate(),
            domain_name: domain_name.to_string(),
            owner_id: owner_id.clone(),
            title: None,
            description: None,
            created_at: now,
            updated_at: now,
        };
        inner.domains.insert(domain.id.clone(), domain.clone());
        Ok(domain)
    }

    async fn get_domain(&self, domain_name: &str) -> Result<Option<Domain>> {
        let inner = self.read()?;
        Ok(inner.domain_by_name(domain_name).cloned())
    }

    async fn list_posts_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Post>> {
        let inner = self.read()?;
        Ok(inner.collect_posts(|post| {
            inner
                .domains
                .get(&post.domain_id)
                .map_or(false, |d| &d.owner_id == owner_id)
        }))
    }

    async fn list_posts_by_domain(&self, domain_name: &str) -> Result<Vec<Post>> {
        let inner = self.read()?;
        let domain_id = match inner.domain_by_name(domain_name) {
            Some(domain) => domain.id.clone(),
            None => return Ok(Vec::new()),
        };
        Ok(inner.collect_posts(|post| post.domain_id == domain_id))
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<Post>> {
        let inner = self.read()?;
        Ok(inner
            .posts
            .get(id)
            .map(|p| inner.with_documents(p.value.clone())))
    }

    async fn insert_post(&self, domain_id: &DomainId, create: &PostCreate) -> Result<Post> {
        let mut inner = self.write()?;

        if !inner.domains.contains_key(domain_id) {
            return Err(StoreError::DomainNotFound(domain_id.to_string()));
        }

        if let Some(slug) = create.slug.as_deref() {
            if inner.slug_in_use(domain_id, slug) {
                return Err(StoreError::SlugTaken(slug.to_string()));
            }
        }

        let post = create
            .clone()
            .into_post(PostId::generate(), domain_id.clone(), now_millis());
        inner.insert_post(post.clone());
        inner.prune_redirects(domain_id);
        Ok(post)
    }

    async fn list_documents(&self, post_id: &PostId) -> Result<Vec<Document>> {
        let inner = self.read()?;
        Ok(inner.documents_of(post_id))
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>> {
        let inner = self.read()?;
        Ok(inner.documents.get(id).map(|d| d.value.clone()))
    }

    async fn insert_document(
        &self,
        post_id: &PostId,
        tag: Option<&str>,
        content: &Value,
        width: Option<u32>,
    ) -> Result<Document> {
        let mut inner = self.write()?;

        if !inner.posts.contains_key(post_id) {
            return Err(StoreError::PostNotFound(post_id.to_string()));
        }

        let now = now_millis();
        let document = Document {
            id: DocumentId::generate(),
            post_id: post_id.clone(),
            tag: tag.map(String::from),
            content: content.clone(),
            width,
            created_at: now,
            updated_at: now,
        };
        let seq = inner.next_seq();
        inner.documents.insert(
            document.id.clone(),
            Stored {
                value: document.clone(),
                seq,
            },
        );
        Ok(document)
    }

    async fn resolve_redirect(&self, domain_name: &str, old_slug: &str) -> Result<Option<PostId>> {
        let inner = self.read()?;
        let domain_id = match inner.domain_by_name(domain_name) {
            Some(domain) => domain.id.clone(),
            None => return Ok(None),
        };
        Ok(inner
            .redirects
            .get(&(domain_id, old_slug.to_string()))
            .cloned())
    }

    async fn apply_batch(&self, request: &SyncRequest) -> Result<SyncResult> {
        let mut inner = self.write()?;

        let domain_id = inner
            .domain_by_name(&request.scope)
            .map(|d| d.id.clone())
            .ok_or_else(|| StoreError::DomainNotFound(request.scope.clone()))?;

        let mut next = inner.clone();
        let conflicts = next.apply_batch(&domain_id, request, now_millis());

        if !conflicts.is_empty() {
            tracing::warn!(
                scope = %request.scope,
                conflicts = conflicts.len(),
                "sync batch rolled back"
            );
            return Ok(SyncResult::conflicted(conflicts));
        }

        *inner = next;
        tracing::info!(
            scope = %request.scope,
            updates = request.updates.len(),
            creates = request.creates.len(),
            deletes = request.deletes.len(),
            "sync batch applied"
        );
        Ok(SyncResult::ok())
    }
}
