//! End-to-end reconciliation against the in-memory and SQLite stores.
//!
//! Every scenario runs on both backends; they must agree.

use postsync::core::{DomainId, OwnerId, Post, PostId};
use postsync::store::{MemoryStore, SqliteStore, Store};
use postsync::{PostsyncConfig, Session, SyncResult, Workspace};
use tracing_subscriber::EnvFilter;

const DOMAIN: &str = "example.com";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn workspace<S: Store>(store: S) -> Workspace<S> {
    init_tracing();
    store
        .create_domain(DOMAIN, &OwnerId::new("alice"))
        .await
        .unwrap();
    Workspace::new(store, PostsyncConfig::default())
}

async fn seed<S: Store>(ws: &Workspace<S>, posts: &[(&str, &str)]) -> Vec<Post> {
    let alice = Session::authenticated("alice");
    for (slug, title) in posts {
        ws.manager()
            .create_post(&alice, DOMAIN, slug, Some(title))
            .await
            .unwrap();
    }
    ws.manager().fetch_domain_posts(DOMAIN).await.unwrap()
}

fn find<'a>(posts: &'a [Post], slug: &str) -> &'a Post {
    posts
        .iter()
        .find(|p| p.slug.as_deref() == Some(slug))
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

async fn full_cycle<S: Store>(store: S) {
    let ws = workspace(store).await;
    let baseline = seed(&ws, &[("/keep", "Keep"), ("/edit", "Edit"), ("/drop", "Drop")]).await;

    let mut local: Vec<Post> = baseline
        .iter()
        .filter(|p| p.slug.as_deref() != Some("/drop"))
        .cloned()
        .collect();
    for post in local.iter_mut() {
        if post.slug.as_deref() == Some("/edit") {
            post.title = "Edited".into();
            post.meta_description = Some("now with a description".into());
        }
    }
    local.push(Post::new(PostId::new("draft-1"), "Fresh", DomainId::new("ignored")).with_slug("/fresh"));

    let changes = ws.reconciler().find_post_differences(&local, &baseline).unwrap();
    assert_eq!(changes.updates.len(), 1);
    assert_eq!(changes.creates.len(), 1);
    assert_eq!(changes.deletes.len(), 1);

    let result = ws.sync_posts(&local, &baseline, DOMAIN).await.unwrap();
    assert_eq!(result, SyncResult::ok());

    let after = ws.manager().fetch_domain_posts(DOMAIN).await.unwrap();
    assert_eq!(after.len(), 3);
    assert_eq!(find(&after, "/edit").title, "Edited");
    assert_eq!(
        find(&after, "/edit").meta_description.as_deref(),
        Some("now with a description")
    );
    assert_eq!(find(&after, "/keep").title, "Keep");
    let fresh = find(&after, "/fresh");
    assert_eq!(fresh.title, "Fresh");
    assert_ne!(fresh.id, PostId::new("draft-1"));
    assert!(after.iter().all(|p| p.slug.as_deref() != Some("/drop")));

    // The refreshed collection is its own baseline: nothing left to send.
    let again = ws.sync_posts(&after, &after, DOMAIN).await.unwrap();
    assert_eq!(again, SyncResult::ok());
}

async fn conflict_rolls_back<S: Store>(store: S) {
    let ws = workspace(store).await;
    let baseline = seed(&ws, &[("/a", "A"), ("/b", "B")]).await;

    let mut local = baseline.clone();
    for post in local.iter_mut() {
        post.title = format!("{} (renamed)", post.title);
        if post.slug.as_deref() == Some("/b") {
            post.slug = Some("/a".into());
        }
    }

    let result = ws.sync_posts(&local, &baseline, DOMAIN).await.unwrap();
    assert!(!result.success);
    assert_eq!(
        result.conflicts,
        vec!["slug /a is used by 2 posts in domain example.com".to_string()]
    );
    assert!(result.errors.is_empty());

    // Nothing from the batch was applied.
    let after = ws.manager().fetch_domain_posts(DOMAIN).await.unwrap();
    assert_eq!(find(&after, "/a").title, "A");
    assert_eq!(find(&after, "/b").title, "B");
}

async fn stale_baseline_conflicts<S: Store>(store: S) {
    let ws = workspace(store).await;
    let baseline = seed(&ws, &[("/a", "A")]).await;

    // Someone else deletes the post in the meantime.
    ws.sync_posts(&[], &baseline, DOMAIN).await.unwrap();

    let mut local = baseline.clone();
    local[0].title = "Too late".into();
    let result = ws.sync_posts(&local, &baseline, DOMAIN).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.conflicts.len(), 1);
    assert!(result.conflicts[0].starts_with("update failed"));
}

async fn unknown_scope_is_reported<S: Store>(store: S) {
    let ws = workspace(store).await;
    let local = vec![Post::new(PostId::new("x"), "X", DomainId::new("d"))];

    let result = ws.sync_posts(&local, &[], "nowhere.com").await.unwrap();

    assert_eq!(result, SyncResult::failure("domain not found: nowhere.com"));
}

async fn slug_change_leaves_redirect<S: Store>(store: S) {
    let ws = workspace(store).await;
    let baseline = seed(&ws, &[("/old", "Moving")]).await;

    let mut local = baseline.clone();
    local[0].slug = Some("/new".into());
    let result = ws.sync_posts(&local, &baseline, DOMAIN).await.unwrap();
    assert!(result.success);

    let target = ws
        .manager()
        .resolve_redirect(DOMAIN, "/old")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(target.id, baseline[0].id);
    assert_eq!(target.slug.as_deref(), Some("/new"));

    assert!(ws
        .manager()
        .resolve_redirect(DOMAIN, "/never")
        .await
        .unwrap()
        .is_none());
}

async fn delete_cascades_documents<S: Store>(store: S) {
    let ws = workspace(store).await;
    let baseline = seed(&ws, &[("/doc", "With docs")]).await;
    let post_id = baseline[0].id.clone();
    let doc = ws.manager().create_document(&post_id, Some("main")).await.unwrap();

    let result = ws.sync_posts(&[], &baseline, DOMAIN).await.unwrap();
    assert!(result.success);

    assert!(ws.manager().fetch_post_documents(&post_id).await.unwrap().is_empty());
    assert!(ws.store().get_document(&doc.id).await.unwrap().is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Backends
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! on_both_backends {
    ($($name:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    super::$name(MemoryStore::new()).await;
                }
            )*
        }

        mod sqlite {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    super::$name(SqliteStore::open_memory().unwrap()).await;
                }
            )*
        }
    };
}

on_both_backends!(
    full_cycle,
    conflict_rolls_back,
    stale_baseline_conflicts,
    unknown_scope_is_reported,
    slug_change_leaves_redirect,
    delete_cascades_documents,
);

#[tokio::test]
async fn test_sqlite_survives_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.db");

    let baseline = {
        let ws = workspace(SqliteStore::open(&path).unwrap()).await;
        let baseline = seed(&ws, &[("/a", "A")]).await;
        let mut local = baseline.clone();
        local[0].title = "Persisted".into();
        assert!(ws.sync_posts(&local, &baseline, DOMAIN).await.unwrap().success);
        baseline
    };

    let ws = Workspace::new(SqliteStore::open(&path).unwrap(), PostsyncConfig::default());
    let posts = ws.manager().fetch_domain_posts(DOMAIN).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, baseline[0].id);
    assert_eq!(posts[0].title, "Persisted");
}
