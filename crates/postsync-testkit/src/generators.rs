//! Proptest generators for property-based testing.

use std::collections::HashSet;

use proptest::prelude::*;

use postsync_core::{DomainId, Post, PostId};

/// Domain every generated post belongs to.
pub const GENERATED_DOMAIN: &str = "generated-domain";

/// Generate a post title.
pub fn title() -> impl Strategy<Value = String> {
    "[A-Za-z ]{0,12}".prop_map(String::from)
}

/// Generate an optional field value from a small alphabet, so that equal
/// values on both sides are common. Includes the empty string.
pub fn optional_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-c]{1,2}".prop_map(Some),
    ]
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=1_700_000_000_000i64
}

/// Generate a post with the given id.
pub fn post_with_id(id: PostId) -> impl Strategy<Value = Post> {
    (title(), optional_text(), optional_text(), optional_text(), timestamp()).prop_map(
        move |(title, slug, meta_description, theme_id, ts)| Post {
            id: id.clone(),
            title,
            slug,
            meta_description,
            theme_id,
            domain_id: DomainId::new(GENERATED_DOMAIN),
            created_at: ts,
            updated_at: ts,
            documents: Vec::new(),
        },
    )
}

/// Generate a collection of posts with unique ids `{prefix}{n}`.
pub fn post_collection(prefix: &'static str, max_len: usize) -> impl Strategy<Value = Vec<Post>> {
    (0..=max_len).prop_flat_map(move |len| {
        (0..len)
            .map(|i| post_with_id(PostId::new(format!("{}{}", prefix, i))))
            .collect::<Vec<_>>()
    })
}

/// What happens to one baseline post in the local copy.
#[derive(Debug, Clone)]
pub enum LocalEdit {
    /// Left as is.
    Keep,
    /// Removed locally.
    Remove,
    /// Tracked fields replaced.
    Edit {
        title: String,
        slug: Option<String>,
        meta_description: Option<String>,
        theme_id: Option<String>,
    },
    /// Only untracked fields touched.
    Touch(i64),
}

/// Generate a local edit.
pub fn local_edit() -> impl Strategy<Value = LocalEdit> {
    prop_oneof![
        3 => Just(LocalEdit::Keep),
        2 => Just(LocalEdit::Remove),
        3 => (title(), optional_text(), optional_text(), optional_text()).prop_map(
            |(title, slug, meta_description, theme_id)| LocalEdit::Edit {
                title,
                slug,
                meta_description,
                theme_id,
            }
        ),
        1 => timestamp().prop_map(LocalEdit::Touch),
    ]
}

/// A baseline and the locally edited copy derived from it.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub baseline: Vec<Post>,
    pub local: Vec<Post>,
}

impl EditSession {
    /// Ids present in the baseline.
    pub fn baseline_ids(&self) -> HashSet<&PostId> {
        self.baseline.iter().map(|p| &p.id).collect()
    }

    /// Ids present in the local copy.
    pub fn local_ids(&self) -> HashSet<&PostId> {
        self.local.iter().map(|p| &p.id).collect()
    }
}

impl Arbitrary for EditSession {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        post_collection("p", 8)
            .prop_flat_map(|baseline| {
                let edits = prop::collection::vec(local_edit(), baseline.len());
                let added = post_collection("new-", 4);
                (Just(baseline), edits, added, any::<prop::sample::Index>())
            })
            .prop_map(|(baseline, edits, added, insert_at)| {
                let mut local: Vec<Post> = baseline
                    .iter()
                    .zip(edits)
                    .filter_map(|(post, edit)| apply_edit(post, edit))
                    .collect();
                // New posts land somewhere in the middle, like an editor
                // inserting above existing rows.
                let at = insert_at.index(local.len() + 1);
                local.splice(at..at, added);
                EditSession { baseline, local }
            })
            .boxed()
    }
}

fn apply_edit(post: &Post, edit: LocalEdit) -> Option<Post> {
    let mut local = post.clone();
    match edit {
        LocalEdit::Keep => {}
        LocalEdit::Remove => return None,
        LocalEdit::Edit {
            title,
            slug,
            meta_description,
            theme_id,
        } => {
            local.title = title;
            local.slug = slug;
            local.meta_description = meta_description;
            local.theme_id = theme_id;
        }
        LocalEdit::Touch(ts) => local.updated_at = ts,
    }
    Some(local)
}
