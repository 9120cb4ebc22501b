//! SQLite-backed document store.
//!
//! One JSON document per user in the `documents` table of
//! `~/.config/habitquest/habitquest.db`.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::{apply_patch, decode, DocumentStore};
use crate::error::StoreError;
use crate::snapshot::{Snapshot, SnapshotPatch};
use crate::storage::data_dir;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the database at `~/.config/habitquest/habitquest.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        Self::open_at(&data_dir()?.join("habitquest.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                user_id    TEXT PRIMARY KEY,
                body       TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_body(conn: &Connection, user_id: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
    }
}

#[async_trait::async_trait]
impl DocumentStore for SqliteStore {
    async fn get_document(&self, user_id: &str) -> Result<Option<Snapshot>, StoreError> {
        let body = Self::read_body(&self.lock(), user_id)?;
        body.map(|body| decode(user_id, body)).transpose()
    }

    async fn put_document(
        &self,
        user_id: &str,
        patch: &SnapshotPatch,
        merge: bool,
    ) -> Result<(), StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let stored = if merge {
            Self::read_body(&tx, user_id)?
        } else {
            None
        };
        let body = apply_patch(stored, patch, merge)?;
        tx.execute(
            "INSERT INTO documents (user_id, body, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![user_id, body.to_string(), Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        tracing::debug!(user_id, merge, "document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.get_document("u1").await.unwrap().is_none());

        let patch = SnapshotPatch {
            goals: Some(vec!["Run".into()]),
            ..Default::default()
        };
        store.put_document("u1", &patch, true).await.unwrap();
        let doc = store.get_document("u1").await.unwrap().unwrap();
        assert_eq!(doc.goals, ["Run"]);
        assert!(store.get_document("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_body_is_reported() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .lock()
            .execute(
                "INSERT INTO documents (user_id, body, updated_at) VALUES ('u1', '42', 'now')",
                [],
            )
            .unwrap();
        assert!(matches!(
            store.get_document("u1").await,
            Err(StoreError::Corrupt { .. })
        ));
    }
}
