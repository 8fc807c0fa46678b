//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use postsync_core::now_millis;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::debug!(from = current, to = CURRENT_VERSION, "migrated schema");
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Domains: one site per row, the domain name is the sync scope
        CREATE TABLE domains (
            id TEXT PRIMARY KEY,
            domain_name TEXT NOT NULL UNIQUE,
            owner_id TEXT NOT NULL,
            title TEXT,
            description TEXT,
            created_at INTEGER NOT NULL,      -- Unix ms
            updated_at INTEGER NOT NULL
        );

        -- Posts: the reconciled entities
        CREATE TABLE posts (
            id TEXT PRIMARY KEY,
            domain_id TEXT NOT NULL REFERENCES domains(id),
            title TEXT NOT NULL,
            slug TEXT,                        -- NULL = unpublished
            meta_description TEXT,
            theme_id TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Documents: opaque editor content attached to a post
        CREATE TABLE documents (
            id TEXT PRIMARY KEY,
            post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            tag TEXT,
            content TEXT NOT NULL,            -- JSON
            width INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Former slugs that should keep resolving to their post
        CREATE TABLE post_redirects (
            domain_id TEXT NOT NULL REFERENCES domains(id),
            old_slug TEXT NOT NULL,
            post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (domain_id, old_slug)
        );

        CREATE INDEX idx_domains_owner ON domains(owner_id);
        CREATE INDEX idx_posts_domain ON posts(domain_id, created_at);
        CREATE INDEX idx_posts_slug ON posts(domain_id, slug);
        CREATE INDEX idx_documents_post ON documents(post_id, created_at);
        "#,
    )?;

    Ok(())
}
