//! Slug rules.

/// Normalize a user-entered slug: the empty string means "unpublished" and
/// is stored as `None`. Anything else is kept verbatim.
pub fn normalize_slug(slug: &str) -> Option<String> {
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// Normalize an optional slug in place of a borrowed value.
pub(crate) fn normalize_slug_ref(slug: Option<&str>) -> Option<&str> {
    slug.filter(|s| !s.is_empty())
}
