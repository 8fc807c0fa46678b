//! Post and domain records.
//!
//! A [`Post`] is the reconcilable entity. Its fields fall into three groups:
//!
//! - `id`: identity, assigned by the backing store and never changed
//! - `title`, `slug`, `meta_description`, `theme_id`: tracked, mutable
//! - `domain_id`, `created_at`, `updated_at`, `documents`: derived, never
//!   compared and never sent in a change set
//!
//! Optional fields that are missing from serialized input deserialize to
//! `None`, so an unset field and an explicit `null` are the same value.

use serde::{Deserialize, Serialize};

use crate::types::{DocumentId, DomainId, OwnerId, PostId};

/// A post as seen by the author, either in a baseline snapshot or in the
/// local working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub theme_id: Option<String>,
    pub domain_id: DomainId,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    /// Documents attached to this post, filled in by the read side.
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

impl Post {
    /// Create a post with only identity, title and domain set.
    pub fn new(id: impl Into<PostId>, title: impl Into<String>, domain_id: DomainId) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: None,
            meta_description: None,
            theme_id: None,
            domain_id,
            created_at: 0,
            updated_at: 0,
            documents: Vec::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_meta_description(mut self, description: impl Into<String>) -> Self {
        self.meta_description = Some(description.into());
        self
    }

    pub fn with_theme(mut self, theme_id: impl Into<String>) -> Self {
        self.theme_id = Some(theme_id.into());
        self
    }

    pub fn with_timestamps(mut self, created_at: i64, updated_at: i64) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Whether the post is publicly reachable (has a non-empty slug).
    pub fn is_published(&self) -> bool {
        self.slug.as_deref().map_or(false, |slug| !slug.is_empty())
    }
}

/// Lightweight reference to a document, as listed alongside a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: DocumentId,
    #[serde(default)]
    pub tag: Option<String>,
}

/// A domain: the site a set of posts belongs to.
///
/// The domain name doubles as the scope of a sync batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub domain_name: String,
    pub owner_id: OwnerId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
