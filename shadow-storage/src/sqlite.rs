//! SQLite storage backend.
//!
//! One connection guarded by a mutex; every port call is a short statement
//! or two against it.

use crate::ports::{MetaStore, PostStore, RelationshipStore, TermStore};
use crate::{StorageError, StorageResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use shadow_model::{NewTerm, ShadowTerm};
use shadow_types::{Post, PostId, PostStatus, TermId};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const TERM_COLUMNS: &str = "id, taxonomy, name, slug, post_id";

/// Persistent store for posts, shadow terms, relationships and post meta.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        debug!("Opened shadow term store at {}", path.display());
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn init_schema(&self) -> StorageResult<()> {
        self.conn()?.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY,
                post_type TEXT NOT NULL,
                title TEXT NOT NULL,
                slug TEXT NOT NULL,
                status TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS posts_type_title ON posts (post_type, title);

            CREATE TABLE IF NOT EXISTS terms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                taxonomy TEXT NOT NULL,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                post_id INTEGER,
                UNIQUE(taxonomy, slug)
            );

            CREATE TABLE IF NOT EXISTS term_relationships (
                object_id INTEGER NOT NULL,
                term_id INTEGER NOT NULL,
                UNIQUE(object_id, term_id)
            );

            CREATE TABLE IF NOT EXISTS post_meta (
                post_id INTEGER NOT NULL,
                meta_key TEXT NOT NULL,
                meta_value TEXT NOT NULL,
                UNIQUE(post_id, meta_key)
            );
            ",
        )?;
        Ok(())
    }

    fn query_term(
        conn: &Connection,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Option<ShadowTerm>> {
        let sql = format!("SELECT {TERM_COLUMNS} FROM terms WHERE {filter} ORDER BY id LIMIT 1");
        Ok(conn.query_row(&sql, params, term_from_row).optional()?)
    }

    fn slug_taken(conn: &Connection, taxonomy: &str, slug: &str, except: TermId) -> StorageResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM terms WHERE taxonomy = ?1 AND slug = ?2 AND id != ?3",
            params![taxonomy, slug, except.get()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn term_from_row(row: &Row<'_>) -> rusqlite::Result<ShadowTerm> {
    let post_id: Option<i64> = row.get(4)?;
    Ok(ShadowTerm {
        id: TermId::new(row.get(0)?),
        taxonomy: row.get(1)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        post_id: post_id.map(PostId::new),
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let status: String = row.get(4)?;
    Ok(Post {
        id: PostId::new(row.get(0)?),
        post_type: row.get(1)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        status: PostStatus::from(status),
    })
}

impl PostStore for SqliteStore {
    fn get_post(&self, id: PostId) -> StorageResult<Option<Post>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, post_type, title, slug, status FROM posts WHERE id = ?1",
                params![id.get()],
                post_from_row,
            )
            .optional()?)
    }

    fn find_posts_by_title(&self, post_type: &str, title: &str) -> StorageResult<Vec<PostId>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id FROM posts WHERE post_type = ?1 AND title = ?2 ORDER BY id")?;
        let ids = stmt
            .query_map(params![post_type, title], |row| row.get::<_, i64>(0))?
            .map(|r| r.map(PostId::new))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn save_post(&self, post: &Post) -> StorageResult<()> {
        if post.id.is_zero() {
            return Err(StorageError::InvalidData("post id must not be zero".into()));
        }
        self.conn()?.execute(
            "INSERT OR REPLACE INTO posts (id, post_type, title, slug, status) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![post.id.get(), post.post_type, post.title, post.slug, post.status.as_str()],
        )?;
        Ok(())
    }

    fn delete_post(&self, id: PostId) -> StorageResult<Option<Post>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx
            .query_row(
                "SELECT id, post_type, title, slug, status FROM posts WHERE id = ?1",
                params![id.get()],
                post_from_row,
            )
            .optional()?;
        if removed.is_some() {
            tx.execute("DELETE FROM posts WHERE id = ?1", params![id.get()])?;
            tx.execute("DELETE FROM term_relationships WHERE object_id = ?1", params![id.get()])?;
            tx.execute("DELETE FROM post_meta WHERE post_id = ?1", params![id.get()])?;
        }
        tx.commit()?;
        Ok(removed)
    }
}

impl TermStore for SqliteStore {
    fn get_term(&self, id: TermId) -> StorageResult<Option<ShadowTerm>> {
        Self::query_term(&*self.conn()?, "id = ?1", params![id.get()])
    }

    fn term_by_name(&self, taxonomy: &str, name: &str) -> StorageResult<Option<ShadowTerm>> {
        Self::query_term(&*self.conn()?, "taxonomy = ?1 AND name = ?2", params![taxonomy, name])
    }

    fn term_by_slug(&self, taxonomy: &str, slug: &str) -> StorageResult<Option<ShadowTerm>> {
        Self::query_term(&*self.conn()?, "taxonomy = ?1 AND slug = ?2", params![taxonomy, slug])
    }

    fn term_by_post(&self, taxonomy: &str, post_id: PostId) -> StorageResult<Option<ShadowTerm>> {
        Self::query_term(
            &*self.conn()?,
            "taxonomy = ?1 AND post_id = ?2",
            params![taxonomy, post_id.get()],
        )
    }

    fn insert_term(&self, term: &NewTerm) -> StorageResult<ShadowTerm> {
        if term.slug.is_empty() {
            return Err(StorageError::InvalidData("term slug must not be empty".into()));
        }
        let conn = self.conn()?;
        if Self::slug_taken(&conn, &term.taxonomy, &term.slug, TermId::default())? {
            return Err(StorageError::Conflict(format!(
                "term slug {} already exists in {}",
                term.slug, term.taxonomy
            )));
        }

        conn.execute(
            "INSERT INTO terms (taxonomy, name, slug, post_id) VALUES (?1, ?2, ?3, ?4)",
            params![term.taxonomy, term.name, term.slug, term.post_id.map(|p| p.get())],
        )?;
        Ok(ShadowTerm {
            id: TermId::new(conn.last_insert_rowid()),
            taxonomy: term.taxonomy.clone(),
            name: term.name.clone(),
            slug: term.slug.clone(),
            post_id: term.post_id,
        })
    }

    fn update_term(&self, id: TermId, name: &str, slug: &str) -> StorageResult<ShadowTerm> {
        let conn = self.conn()?;
        let existing = Self::query_term(&conn, "id = ?1", params![id.get()])?
            .ok_or_else(|| StorageError::NotFound(format!("term {id}")))?;
        if Self::slug_taken(&conn, &existing.taxonomy, slug, id)? {
            return Err(StorageError::Conflict(format!(
                "term slug {slug} already exists in {}",
                existing.taxonomy
            )));
        }

        conn.execute(
            "UPDATE terms SET name = ?1, slug = ?2 WHERE id = ?3",
            params![name, slug, id.get()],
        )?;
        Ok(ShadowTerm {
            name: name.to_string(),
            slug: slug.to_string(),
            ..existing
        })
    }

    fn delete_term(&self, id: TermId) -> StorageResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM terms WHERE id = ?1", params![id.get()])?;
        tx.execute("DELETE FROM term_relationships WHERE term_id = ?1", params![id.get()])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

impl RelationshipStore for SqliteStore {
    fn add_relationship(&self, object: PostId, term: TermId) -> StorageResult<bool> {
        let conn = self.conn()?;
        if Self::query_term(&conn, "id = ?1", params![term.get()])?.is_none() {
            return Err(StorageError::NotFound(format!("term {term}")));
        }
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO term_relationships (object_id, term_id) VALUES (?1, ?2)",
            params![object.get(), term.get()],
        )?;
        Ok(inserted > 0)
    }

    fn objects_in_term(&self, term: TermId) -> StorageResult<Vec<PostId>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT object_id FROM term_relationships WHERE term_id = ?1 ORDER BY object_id")?;
        let ids = stmt
            .query_map(params![term.get()], |row| row.get::<_, i64>(0))?
            .map(|r| r.map(PostId::new))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn terms_for_object(&self, object: PostId, taxonomy: &str) -> StorageResult<Vec<ShadowTerm>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.taxonomy, t.name, t.slug, t.post_id
             FROM terms t JOIN term_relationships r ON r.term_id = t.id
             WHERE r.object_id = ?1 AND t.taxonomy = ?2
             ORDER BY t.id",
        )?;
        let terms = stmt
            .query_map(params![object.get(), taxonomy], term_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(terms)
    }
}

impl MetaStore for SqliteStore {
    fn get_meta(&self, post: PostId, key: &str) -> StorageResult<Option<serde_json::Value>> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT meta_value FROM post_meta WHERE post_id = ?1 AND meta_key = ?2",
                params![post.get(), key],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|s| serde_json::from_str(&s).map_err(StorageError::from))
            .transpose()
    }

    fn set_meta(&self, post: PostId, key: &str, value: &serde_json::Value) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        self.conn()?.execute(
            "INSERT OR REPLACE INTO post_meta (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
            params![post.get(), key, raw],
        )?;
        Ok(())
    }

    fn delete_meta(&self, post: PostId, key: &str) -> StorageResult<bool> {
        let removed = self.conn()?.execute(
            "DELETE FROM post_meta WHERE post_id = ?1 AND meta_key = ?2",
            params![post.get(), key],
        )?;
        Ok(removed > 0)
    }
}
