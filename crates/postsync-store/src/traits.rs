//! Store trait: the abstract interface of the backing store.
//!
//! The reconciliation engine only ever talks to a store through a batch
//! procedure; everything else here serves the read side and the creation
//! helpers around it.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use postsync_core::{
    Document, DocumentId, Domain, DomainId, OwnerId, Post, PostCreate, PostId, SyncRequest,
    SyncResult,
};

use crate::error::Result;

/// The Store trait: async interface of the authoritative post store.
///
/// # Design Notes
///
/// - **Atomic batches**: [`Store::apply_batch`] applies every update, create
///   and delete of a request in one transaction. If any operation conflicts,
///   nothing is applied and the conflicts are reported in the result.
/// - **Store-assigned identity**: creates receive a fresh [`PostId`] here;
///   temporary ids from a working copy never reach the store.
/// - **Redirects**: changing a non-null slug through a batch records the old
///   slug so it keeps resolving to the post.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Domain Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a domain owned by `owner_id`.
    async fn create_domain(&self, domain_name: &str, owner_id: &OwnerId) -> Result<Domain>;

    /// Look up a domain by name.
    async fn get_domain(&self, domain_name: &str) -> Result<Option<Domain>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Post Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All posts in domains owned by `owner_id`, newest first.
    async fn list_posts_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Post>>;

    /// All posts of the named domain, newest first.
    async fn list_posts_by_domain(&self, domain_name: &str) -> Result<Vec<Post>>;

    /// Get a post by id.
    async fn get_post(&self, id: &PostId) -> Result<Option<Post>>;

    /// Insert a single post outside of a batch.
    async fn insert_post(&self, domain_id: &DomainId, create: &PostCreate) -> Result<Post>;

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Documents of a post, newest first.
    async fn list_documents(&self, post_id: &PostId) -> Result<Vec<Document>>;

    /// Get a document by id.
    async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>>;

    /// Attach a new document to a post.
    async fn insert_document(
        &self,
        post_id: &PostId,
        tag: Option<&str>,
        content: &Value,
        width: Option<u32>,
    ) -> Result<Document>;

    // ─────────────────────────────────────────────────────────────────────────
    // Redirects
    // ─────────────────────────────────────────────────────────────────────────

    /// The post that used to be published under `old_slug` in the domain.
    async fn resolve_redirect(&self, domain_name: &str, old_slug: &str) -> Result<Option<PostId>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Batch Procedure
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a sync batch as one transaction.
    ///
    /// # Returns
    /// - `Ok(SyncResult::ok())` if every operation was applied.
    /// - `Ok` with `success: false` and conflicts if any operation could not
    ///   be applied; in that case nothing was applied.
    /// - `Err(StoreError::DomainNotFound)` if the scope names no domain.
    async fn apply_batch(&self, request: &SyncRequest) -> Result<SyncResult>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn create_domain(&self, domain_name: &str, owner_id: &OwnerId) -> Result<Domain> {
        (**self).create_domain(domain_name, owner_id).await
    }

    async fn get_domain(&self, domain_name: &str) -> Result<Option<Domain>> {
        (**self).get_domain(domain_name).await
    }

    async fn list_posts_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Post>> {
        (**self).list_posts_by_owner(owner_id).await
    }

    async fn list_posts_by_domain(&self, domain_name: &str) -> Result<Vec<Post>> {
        (**self).list_posts_by_domain(domain_name).await
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<Post>> {
        (**self).get_post(id).await
    }

    async fn insert_post(&self, domain_id: &DomainId, create: &PostCreate) -> Result<Post> {
        (**self).insert_post(domain_id, create).await
    }

    async fn list_documents(&self, post_id: &PostId) -> Result<Vec<Document>> {
        (**self).list_documents(post_id).await
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>> {
        (**self).get_document(id).await
    }

    async fn insert_document(
        &self,
        post_id: &PostId,
        tag: Option<&str>,
        content: &Value,
        width: Option<u32>,
    ) -> Result<Document> {
        (**self).insert_document(post_id, tag, content, width).await
    }

    async fn resolve_redirect(&self, domain_name: &str, old_slug: &str) -> Result<Option<PostId>> {
        (**self).resolve_redirect(domain_name, old_slug).await
    }

    async fn apply_batch(&self, request: &SyncRequest) -> Result<SyncResult> {
        (**self).apply_batch(request).await
    }
}

/// Conflict messages shared by the store implementations, so both report
/// the same text for the same batch.
pub(crate) mod conflict {
    use std::collections::BTreeMap;

    use postsync_core::PostId;

    pub fn update_missing(id: &PostId, scope: &str) -> String {
        format!("update failed: post {} not found in domain {}", id, scope)
    }

    pub fn delete_missing(id: &PostId, scope: &str) -> String {
        format!("delete failed: post {} not found in domain {}", id, scope)
    }

    /// One message per slug carried by more than one post, in slug order.
    pub fn slug_collisions<'a>(
        slugs: impl IntoIterator<Item = &'a str>,
        scope: &str,
    ) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for slug in slugs {
            *counts.entry(slug).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(slug, count)| {
                format!(
                    "slug {} is used by {} posts in domain {}",
                    slug, count, scope
                )
            })
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_slug_collisions() {
            let found = slug_collisions(["/a", "/b", "/a", "/c", "/b", "/a"], "site");
            assert_eq!(
                found,
                vec![
                    "slug /a is used by 3 posts in domain site".to_string(),
                    "slug /b is used by 2 posts in domain site".to_string(),
                ]
            );
        }

        #[test]
        fn test_no_collisions() {
            assert!(slug_collisions(["/a", "/b"], "site").is_empty());
        }
    }
}
