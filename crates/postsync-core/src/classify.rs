//! Change classification: which fields of a post are tracked, how they are
//! compared, and how partial records are built from them.
//!
//! [`TrackedField::ALL`] is the single table of tracked fields. The diff
//! engine never names a field itself: adding a tracked field means adding a
//! variant here, its arms on [`TrackedField`], and its slot on the record
//! types below.

use serde::{Deserialize, Deserializer, Serialize};

use crate::post::Post;
use crate::slug::normalize_slug_ref;
use crate::types::{DomainId, PostId};

/// A mutable post field that participates in change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackedField {
    Title,
    Slug,
    MetaDescription,
    ThemeId,
}

impl TrackedField {
    /// Every tracked field, in wire order.
    pub const ALL: [TrackedField; 4] = [
        TrackedField::Title,
        TrackedField::Slug,
        TrackedField::MetaDescription,
        TrackedField::ThemeId,
    ];

    /// Field name as it appears on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            TrackedField::Title => "title",
            TrackedField::Slug => "slug",
            TrackedField::MetaDescription => "meta_description",
            TrackedField::ThemeId => "theme_id",
        }
    }

    /// Read the raw value of this field. `None` means null or absent.
    pub fn read(self, post: &Post) -> Option<&str> {
        match self {
            TrackedField::Title => Some(post.title.as_str()),
            TrackedField::Slug => post.slug.as_deref(),
            TrackedField::MetaDescription => post.meta_description.as_deref(),
            TrackedField::ThemeId => post.theme_id.as_deref(),
        }
    }

    /// Write `value` into this field's slot on `update`.
    fn copy_into(self, value: Option<&str>, update: &mut PostUpdate) {
        let owned = value.map(str::to_string);
        match self {
            TrackedField::Title => update.title = Some(owned.unwrap_or_default()),
            TrackedField::Slug => update.slug = Some(owned),
            TrackedField::MetaDescription => update.meta_description = Some(owned),
            TrackedField::ThemeId => update.theme_id = Some(owned),
        }
    }
}

impl std::fmt::Display for TrackedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for change classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    /// Treat an empty-string slug as `None` when comparing and when building
    /// create/update records. Off by default: only post creation through the
    /// manager normalizes slugs unless this is set.
    pub normalize_empty_slug: bool,
}

impl ClassifierOptions {
    /// Sets whether empty slugs are normalized to `None`.
    pub fn with_normalize_empty_slug(mut self, normalize: bool) -> Self {
        self.normalize_empty_slug = normalize;
        self
    }
}

/// Compares posts field by field and builds partial records.
#[derive(Debug, Clone, Default)]
pub struct ChangeClassifier {
    options: ClassifierOptions,
}

impl ChangeClassifier {
    pub fn new(options: ClassifierOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// The value of `field` on `post` after normalization.
    pub fn normalized<'a>(&self, field: TrackedField, post: &'a Post) -> Option<&'a str> {
        let value = field.read(post);
        match field {
            TrackedField::Slug if self.options.normalize_empty_slug => normalize_slug_ref(value),
            _ => value,
        }
    }

    /// Tracked fields whose normalized values differ, in table order.
    pub fn changed_fields(&self, baseline: &Post, local: &Post) -> Vec<TrackedField> {
        TrackedField::ALL
            .into_iter()
            .filter(|&field| self.normalized(field, baseline) != self.normalized(field, local))
            .collect()
    }

    /// Whether any tracked field differs.
    pub fn has_changed(&self, baseline: &Post, local: &Post) -> bool {
        TrackedField::ALL
            .into_iter()
            .any(|field| self.normalized(field, baseline) != self.normalized(field, local))
    }

    /// Build an update carrying `local.id` and exactly the changed fields,
    /// or `None` when nothing tracked changed.
    pub fn build_update(&self, baseline: &Post, local: &Post) -> Option<PostUpdate> {
        let changed = self.changed_fields(baseline, local);
        if changed.is_empty() {
            return None;
        }

        let mut update = PostUpdate::new(local.id.clone());
        for field in changed {
            field.copy_into(self.normalized(field, local), &mut update);
        }
        Some(update)
    }

    /// Build a create record: every tracked field, no id, no derived fields.
    pub fn build_create(&self, local: &Post) -> PostCreate {
        let owned = |field| self.normalized(field, local).map(str::to_string);
        PostCreate {
            title: local.title.clone(),
            slug: owned(TrackedField::Slug),
            meta_description: owned(TrackedField::MetaDescription),
            theme_id: owned(TrackedField::ThemeId),
        }
    }
}

/// Partial update of an existing post.
///
/// `None` means the field is unchanged and is omitted on the wire.
/// For optional fields, `Some(None)` means the field was cleared and is sent
/// as an explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdate {
    pub id: PostId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub slug: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub meta_description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub theme_id: Option<Option<String>>,
}

impl PostUpdate {
    /// An update that changes nothing yet.
    pub fn new(id: PostId) -> Self {
        Self {
            id,
            title: None,
            slug: None,
            meta_description: None,
            theme_id: None,
        }
    }

    /// Fields this update carries, in table order.
    pub fn fields(&self) -> Vec<TrackedField> {
        TrackedField::ALL
            .into_iter()
            .filter(|field| match field {
                TrackedField::Title => self.title.is_some(),
                TrackedField::Slug => self.slug.is_some(),
                TrackedField::MetaDescription => self.meta_description.is_some(),
                TrackedField::ThemeId => self.theme_id.is_some(),
            })
            .collect()
    }

    /// Whether this update carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Apply the carried fields to `post`. Identity and derived fields are
    /// left untouched.
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(slug) = &self.slug {
            post.slug = slug.clone();
        }
        if let Some(description) = &self.meta_description {
            post.meta_description = description.clone();
        }
        if let Some(theme_id) = &self.theme_id {
            post.theme_id = theme_id.clone();
        }
    }
}

/// Record for a post that does not exist in the backing store yet.
///
/// Carries no id: the backing store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreate {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub theme_id: Option<String>,
}

impl PostCreate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: None,
            meta_description: None,
            theme_id: None,
        }
    }

    pub fn with_slug(mut self, slug: Option<String>) -> Self {
        self.slug = slug;
        self
    }

    /// Materialize the record as a stored post.
    pub fn into_post(self, id: PostId, domain_id: DomainId, now: i64) -> Post {
        Post {
            id,
            title: self.title,
            slug: self.slug,
            meta_description: self.meta_description,
            theme_id: self.theme_id,
            domain_id,
            created_at: now,
            updated_at: now,
            documents: Vec::new(),
        }
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
