// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. `Database` wraps the one `tokio_rusqlite::Connection`; query
//! functions accept `&Database` and go through `connection().call()`.
//! Do NOT create additional Connection instances for writes.

use docstore_core::DocStoreError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations::run_migrations;

/// Handle to the single SQLite connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file, applies PRAGMAs, and runs migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, DocStoreError> {
        let conn = Connection::open(path).await.map_err(DocStoreError::backend)?;
        Self::prepare(conn, wal_mode).await
    }

    /// Opens a private in-memory database. WAL does not apply.
    pub async fn open_in_memory() -> Result<Self, DocStoreError> {
        let conn = Connection::open_in_memory().await.map_err(DocStoreError::backend)?;
        Self::prepare(conn, false).await
    }

    async fn prepare(conn: Connection, wal_mode: bool) -> Result<Self, DocStoreError> {
        conn.call(move |conn| -> Result<(), DocStoreError> {
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.execute_batch(&format!(
                "PRAGMA journal_mode = {journal};
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;"
            ))
            .map_err(DocStoreError::backend)?;
            run_migrations(conn)
        })
        .await
        .map_err(flatten_err)?;
        debug!(wal_mode, "database opened and migrated");
        Ok(Self { conn })
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, waiting for queued statements to finish.
    pub async fn close(self) -> Result<(), DocStoreError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Converts a tokio-rusqlite error into [`DocStoreError::Backend`].
pub fn map_tr_err<E>(e: tokio_rusqlite::Error<E>) -> DocStoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    match e {
        tokio_rusqlite::Error::Error(inner) => DocStoreError::backend(inner),
        other => DocStoreError::backend(other.to_string()),
    }
}

/// Unwraps a `DocStoreError` raised inside a connection closure.
pub fn flatten_err(e: tokio_rusqlite::Error<DocStoreError>) -> DocStoreError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => DocStoreError::backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        assert!(db_path.exists());

        let tables: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'documents'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(tables, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();
        Database::open(path, true).await.unwrap().close().await.unwrap();
        Database::open(path, true).await.unwrap().close().await.unwrap();
    }
}
