//! Embedded SQLite link store
//!
//! One shared connection behind a mutex; statements run on tokio's blocking
//! pool so callers can await them like any remote store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::schema::{init_schema, needs_init};
use super::LinkStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Link, LinkPatch, NewLink, OwnerId};

const LINK_COLUMNS: &str = "id, created_at, title, url, category, description, user_id";

/// Link store backed by a SQLite table
#[derive(Clone)]
pub struct SqliteLinkStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLinkStore {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database at {:?}", path))?;

        if needs_init(&conn) {
            init_schema(&conn).context("Failed to initialize SQLite schema")?;
        }

        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Task("SQLite connection lock poisoned".to_string()))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl LinkStore for SqliteLinkStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Link>> {
        let owner = owner.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM links WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
                    LINK_COLUMNS
                ))
                .map_err(StoreError::from_sqlite)?;

            let rows = stmt
                .query_map(params![owner.as_str()], LinkRow::from_row)
                .map_err(StoreError::from_sqlite)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(StoreError::from_sqlite)?;

            debug!("Listed {} links for {}", rows.len(), owner);
            rows.into_iter().map(LinkRow::into_link).collect()
        })
        .await
    }

    async fn insert(&self, owner: &OwnerId, fields: &NewLink) -> StoreResult<Link> {
        let owner = owner.clone();
        let fields = fields.clone();
        self.with_conn(move |conn| {
            let id = Uuid::new_v4();
            let created_at = now_millis();

            conn.execute(
                r#"
                INSERT INTO links (id, created_at, title, url, category, description, user_id)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    id.to_string(),
                    created_at.timestamp_millis(),
                    fields.title,
                    fields.url,
                    fields.category,
                    fields.description,
                    owner.as_str(),
                ],
            )
            .map_err(StoreError::from_sqlite)?;

            debug!("Inserted link {} for {}", id, owner);
            Ok(Link {
                id,
                created_at,
                title: fields.title,
                url: fields.url,
                category: fields.category,
                description: fields.description,
                owner_id: owner,
            })
        })
        .await
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        owner: &OwnerId,
        patch: &LinkPatch,
    ) -> StoreResult<Link> {
        let owner = owner.clone();
        let patch = patch.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(StoreError::from_sqlite)?;

            let row = tx
                .query_row(
                    &format!(
                        "SELECT {} FROM links WHERE id = ? AND user_id = ?",
                        LINK_COLUMNS
                    ),
                    params![id.to_string(), owner.as_str()],
                    LinkRow::from_row,
                )
                .optional()
                .map_err(StoreError::from_sqlite)?
                .ok_or(StoreError::NotFoundOrForbidden { id })?;

            let mut link = row.into_link()?;
            link.apply(&patch);

            tx.execute(
                r#"
                UPDATE links SET title = ?, url = ?, category = ?, description = ?
                WHERE id = ? AND user_id = ?
                "#,
                params![
                    link.title,
                    link.url,
                    link.category,
                    link.description,
                    id.to_string(),
                    owner.as_str(),
                ],
            )
            .map_err(StoreError::from_sqlite)?;

            tx.commit().map_err(StoreError::from_sqlite)?;

            debug!("Updated link {} for {}", id, owner);
            Ok(link)
        })
        .await
    }

    async fn delete_by_id(&self, id: Uuid, owner: &OwnerId) -> StoreResult<()> {
        let owner = owner.clone();
        self.with_conn(move |conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM links WHERE id = ? AND user_id = ?",
                    params![id.to_string(), owner.as_str()],
                )
                .map_err(StoreError::from_sqlite)?;

            if deleted == 0 {
                return Err(StoreError::NotFoundOrForbidden { id });
            }

            debug!("Deleted link {} for {}", id, owner);
            Ok(())
        })
        .await
    }
}

/// Current time at the precision the table stores
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

// ==================== Internal structs ====================

struct LinkRow {
    id: String,
    created_at: i64,
    title: String,
    url: String,
    category: String,
    description: Option<String>,
    user_id: String,
}

impl LinkRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            created_at: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            category: row.get(4)?,
            description: row.get(5)?,
            user_id: row.get(6)?,
        })
    }

    fn into_link(self) -> StoreResult<Link> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Decode(format!("Invalid UUID {}: {}", self.id, e)))?;
        let created_at = DateTime::from_timestamp_millis(self.created_at).ok_or_else(|| {
            StoreError::Decode(format!("Invalid timestamp {}", self.created_at))
        })?;

        Ok(Link {
            id,
            created_at,
            title: self.title,
            url: self.url,
            category: self.category,
            description: self.description,
            owner_id: OwnerId::from(self.user_id),
        })
    }
}
