//! SQLite implementation of the Store trait.
//!
//! This is the persistent backing store for Postsync. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking. A sync batch
//! runs inside one SQL transaction that is rolled back on any conflict.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use postsync_core::{
    now_millis, Document, DocumentId, DocumentRef, Domain, DomainId, OwnerId, Post, PostCreate,
    PostId, SyncRequest, SyncResult,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{conflict, Store};

const POST_COLUMNS: &str =
    "p.id, p.domain_id, p.title, p.slug, p.meta_description, p.theme_id, p.created_at, p.updated_at";

const DOCUMENT_COLUMNS: &str = "id, post_id, tag, content, width, created_at, updated_at";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await?
    }
}

// Helper to convert a row to Post (documents filled in separately)
fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: PostId::new(row.get::<_, String>("id")?),
        domain_id: DomainId::new(row.get::<_, String>("domain_id")?),
        title: row.get("title")?,
        slug: row.get("slug")?,
        meta_description: row.get("meta_description")?,
        theme_id: row.get("theme_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        documents: Vec::new(),
    })
}

fn row_to_domain(row: &rusqlite::Row<'_>) -> rusqlite::Result<Domain> {
    Ok(Domain {
        id: DomainId::new(row.get::<_, String>("id")?),
        domain_name: row.get("domain_name")?,
        owner_id: OwnerId::new(row.get::<_, String>("owner_id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

// Document content is stored as JSON text; parsing happens after the row
// closure so that JSON errors surface as StoreError::Serialization.
fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Document, String)> {
    let document = Document {
        id: DocumentId::new(row.get::<_, String>("id")?),
        post_id: PostId::new(row.get::<_, String>("post_id")?),
        tag: row.get("tag")?,
        content: Value::Null,
        width: row.get("width")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    Ok((document, row.get("content")?))
}

fn parse_document((mut document, content): (Document, String)) -> Result<Document> {
    document.content = serde_json::from_str(&content)?;
    Ok(document)
}

fn query_posts(conn: &Connection, sql: &str, param: &str) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(sql)?;
    let posts = stmt
        .query_map(params![param], row_to_post)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    posts
        .into_iter()
        .map(|post| attach_documents(conn, post))
        .collect()
}

fn attach_documents(conn: &Connection, mut post: Post) -> Result<Post> {
    let mut stmt = conn.prepare(
        "SELECT id, tag FROM documents WHERE post_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;
    post.documents = stmt
        .query_map(params![post.id.as_str()], |row| {
            Ok(DocumentRef {
                id: DocumentId::new(row.get::<_, String>(0)?),
                tag: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(post)
}

fn domain_by_name(conn: &Connection, domain_name: &str) -> Result<Option<Domain>> {
    Ok(conn
        .query_row(
            "SELECT * FROM domains WHERE domain_name = ?1",
            params![domain_name],
            row_to_domain,
        )
        .optional()?)
}

fn post_in_domain(conn: &Connection, id: &PostId, domain_id: &DomainId) -> Result<Option<Post>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {} FROM posts p WHERE p.id = ?1 AND p.domain_id = ?2",
                POST_COLUMNS
            ),
            params![id.as_str(), domain_id.as_str()],
            row_to_post,
        )
        .optional()?)
}

fn insert_post_row(conn: &Connection, post: &Post) -> Result<()> {
    conn.execute(
        "INSERT INTO posts (
            id, domain_id, title, slug, meta_description, theme_id, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            post.id.as_str(),
            post.domain_id.as_str(),
            post.title,
            post.slug,
            post.meta_description,
            post.theme_id,
            post.created_at,
            post.updated_at,
        ],
    )?;
    Ok(())
}

fn slug_in_use(conn: &Connection, domain_id: &DomainId, slug: &str) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM posts WHERE domain_id = ?1 AND slug = ?2 LIMIT 1",
            params![domain_id.as_str(), slug],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

/// Drop redirects whose old slug is carried by a post again.
fn prune_redirects(conn: &Connection, domain_id: &DomainId) -> Result<()> {
    conn.execute(
        "DELETE FROM post_redirects WHERE domain_id = ?1 AND old_slug IN (
            SELECT slug FROM posts WHERE domain_id = ?1 AND slug IS NOT NULL
        )",
        params![domain_id.as_str()],
    )?;
    Ok(())
}

/// Apply every operation of `request` inside `tx`. Returns the conflicts
/// found; the caller rolls back if there are any.
fn apply_batch_in(
    tx: &rusqlite::Transaction<'_>,
    domain_id: &DomainId,
    request: &SyncRequest,
    now: i64,
) -> Result<Vec<String>> {
    let scope = request.scope.as_str();
    let mut conflicts = Vec::new();

    for update in &request.updates {
        let Some(mut post) = post_in_domain(tx, &update.id, domain_id)? else {
            conflicts.push(conflict::update_missing(&update.id, scope));
            continue;
        };

        let old_slug = post.slug.clone();
        update.apply_to(&mut post);

        tx.execute(
            "UPDATE posts SET title = ?2, slug = ?3, meta_description = ?4, theme_id = ?5,
                updated_at = ?6
             WHERE id = ?1",
            params![
                post.id.as_str(),
                post.title,
                post.slug,
                post.meta_description,
                post.theme_id,
                now,
            ],
        )?;

        if let Some(old) = old_slug {
            if post.slug.as_deref() != Some(old.as_str()) {
                tx.execute(
                    "INSERT OR REPLACE INTO post_redirects (domain_id, old_slug, post_id, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![domain_id.as_str(), old, post.id.as_str(), now],
                )?;
            }
        }
    }

    for create in &request.creates {
        let post = create
            .clone()
            .into_post(PostId::generate(), domain_id.clone(), now);
        insert_post_row(tx, &post)?;
    }

    for id in &request.deletes {
        if post_in_domain(tx, id, domain_id)?.is_none() {
            conflicts.push(conflict::delete_missing(id, scope));
            continue;
        }
        tx.execute("DELETE FROM documents WHERE post_id = ?1", params![id.as_str()])?;
        tx.execute("DELETE FROM post_redirects WHERE post_id = ?1", params![id.as_str()])?;
        tx.execute("DELETE FROM posts WHERE id = ?1", params![id.as_str()])?;
    }

    prune_redirects(tx, domain_id)?;

    let mut stmt =
        tx.prepare("SELECT slug FROM posts WHERE domain_id = ?1 AND slug IS NOT NULL")?;
    let slugs = stmt
        .query_map(params![domain_id.as_str()], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    conflicts.extend(conflict::slug_collisions(slugs.iter().map(String::as_str), scope));

    Ok(conflicts)
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_domain(&self, domain_name: &str, owner_id: &OwnerId) -> Result<Domain> {
        let domain_name = domain_name.to_string();
        let owner_id = owner_id.clone();

        self.run(move |conn| {
            if domain_by_name(conn, &domain_name)?.is_some() {
                return Err(StoreError::DomainExists(domain_name));
            }

            let now = now_millis();
            let domain = Domain {
                id: DomainId::generate(),
                domain_name,
                owner_id,
                title: None,
                description: None,
                created_at: now,
                updated_at: now,
            };

            conn.execute(
                "INSERT INTO domains (
                    id, domain_name, owner_id, title, description, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    domain.id.as_str(),
                    domain.domain_name,
                    domain.owner_id.as_str(),
                    domain.title,
                    domain.description,
                    domain.created_at,
                    domain.updated_at,
                ],
            )?;
            Ok(domain)
        })
        .await
    }

    async fn get_domain(&self, domain_name: &str) -> Result<Option<Domain>> {
        let domain_name = domain_name.to_string();
        self.run(move |conn| domain_by_name(conn, &domain_name)).await
    }

    async fn list_posts_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Post>> {
        let owner_id = owner_id.clone();
        self.run(move |conn| {
            query_posts(
                conn,
                &format!(
                    "SELECT {} FROM posts p JOIN domains d ON d.id = p.domain_id
                     WHERE d.owner_id = ?1
                     ORDER BY p.created_at DESC, p.rowid DESC",
                    POST_COLUMNS
                ),
                owner_id.as_str(),
            )
        })
        .await
    }

    async fn list_posts_by_domain(&self, domain_name: &str) -> Result<Vec<Post>> {
        let domain_name = domain_name.to_string();
        self.run(move |conn| {
            query_posts(
                conn,
                &format!(
                    "SELECT {} FROM posts p JOIN domains d ON d.id = p.domain_id
                     WHERE d.domain_name = ?1
                     ORDER BY p.created_at DESC, p.rowid DESC",
                    POST_COLUMNS
                ),
                &domain_name,
            )
        })
        .await
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<Post>> {
        let id = id.clone();
        self.run(move |conn| {
            let post = conn
                .query_row(
                    &format!("SELECT {} FROM posts p WHERE p.id = ?1", POST_COLUMNS),
                    params![id.as_str()],
                    row_to_post,
                )
                .optional()?;
            post.map(|p| attach_documents(conn, p)).transpose()
        })
        .await
    }

    async fn insert_post(&self, domain_id: &DomainId, create: &PostCreate) -> Result<Post> {
        let domain_id = domain_id.clone();
        let create = create.clone();

        self.run(move |conn| {
            let exists: Option<String> = conn
                .query_row(
                    "SELECT id FROM domains WHERE id = ?1",
                    params![domain_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::DomainNotFound(domain_id.to_string()));
            }

            if let Some(slug) = create.slug.as_deref() {
                if slug_in_use(conn, &domain_id, slug)? {
                    return Err(StoreError::SlugTaken(slug.to_string()));
                }
            }

            let post = create.into_post(PostId::generate(), domain_id.clone(), now_millis());
            let tx = conn.transaction()?;
            insert_post_row(&tx, &post)?;
            prune_redirects(&tx, &domain_id)?;
            tx.commit()?;
            Ok(post)
        })
        .await
    }

    async fn list_documents(&self, post_id: &PostId) -> Result<Vec<Document>> {
        let post_id = post_id.clone();
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM documents WHERE post_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
                DOCUMENT_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![post_id.as_str()], row_to_document)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(parse_document).collect()
        })
        .await
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>> {
        let id = id.clone();
        self.run(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS),
                params![id.as_str()],
                row_to_document,
            )
            .optional()?
            .map(parse_document)
            .transpose()
        })
        .await
    }

    async fn insert_document(
        &self,
        post_id: &PostId,
        tag: Option<&str>,
        content: &Value,
        width: Option<u32>,
    ) -> Result<Document> {
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
        let content = serde_json::to_string(content)?;

        self.run(move |conn| {
            let exists: Option<String> = conn
                .query_row(
                    "SELECT id FROM posts WHERE id = ?1",
                    params![document.post_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::PostNotFound(document.post_id.to_string()));
            }

            conn.execute(
                "INSERT INTO documents (
                    id, post_id, tag, content, width, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    document.id.as_str(),
                    document.post_id.as_str(),
                    document.tag,
                    content,
                    document.width,
                    document.created_at,
                    document.updated_at,
                ],
            )?;
            Ok(document)
        })
        .await
    }

    async fn resolve_redirect(&self, domain_name: &str, old_slug: &str) -> Result<Option<PostId>> {
        let domain_name = domain_name.to_string();
        let old_slug = old_slug.to_string();

        self.run(move |conn| {
            let post_id: Option<String> = conn
                .query_row(
                    "SELECT r.post_id FROM post_redirects r
                     JOIN domains d ON d.id = r.domain_id
                     WHERE d.domain_name = ?1 AND r.old_slug = ?2",
                    params![domain_name, old_slug],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(post_id.map(PostId::new))
        })
        .await
    }

    async fn apply_batch(&self, request: &SyncRequest) -> Result<SyncResult> {
        let request = request.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let domain_id: Option<String> = tx
                .query_row(
                    "SELECT id FROM domains WHERE domain_name = ?1",
                    params![request.scope],
                    |row| row.get(0),
                )
                .optional()?;
            let domain_id = domain_id
                .map(DomainId::new)
                .ok_or_else(|| StoreError::DomainNotFound(request.scope.clone()))?;

            let conflicts = apply_batch_in(&tx, &domain_id, &request, now_millis())?;

            if !conflicts.is_empty() {
                tx.rollback()?;
                tracing::warn!(
                    scope = %request.scope,
                    conflicts = conflicts.len(),
                    "sync batch rolled back"
                );
                return Ok(SyncResult::conflicted(conflicts));
            }

            tx.commit()?;
            tracing::info!(
                scope = %request.scope,
                updates = request.updates.len(),
                creates = request.creates.len(),
                deletes = request.deletes.len(),
                "sync batch applied"
            );
            Ok(SyncResult::ok())
        })
        .await
    }
}
