// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the document backend traits.

use async_trait::async_trait;
use tokio::sync::{broadcast, OnceCell};
use tracing::debug;

use docstore_config::model::StorageConfig;
use docstore_core::{
    BackendAdapter, BackendKind, Change, CollectionPath, DocStoreError, DocumentBackend,
    DocumentPath, HealthStatus, Record,
};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed document backend.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query module. The database is lazily opened on the first call to
/// [`initialize`](Self::initialize).
pub struct SqliteBackend {
    config: StorageConfig,
    db: OnceCell<Database>,
    changes: broadcast::Sender<Change>,
}

impl SqliteBackend {
    /// Create a new backend with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](Self::initialize) is called.
    pub fn new(config: StorageConfig, channel_capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            config,
            db: OnceCell::new(),
            changes,
        }
    }

    /// Create and initialize a backend in one step.
    pub async fn open(config: StorageConfig, channel_capacity: usize) -> Result<Self, DocStoreError> {
        let backend = Self::new(config, channel_capacity);
        backend.initialize().await?;
        Ok(backend)
    }

    /// Opens the database at the configured path and runs migrations.
    pub async fn initialize(&self) -> Result<(), DocStoreError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| DocStoreError::backend("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite backend initialized");
        Ok(())
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, DocStoreError> {
        self.db
            .get()
            .ok_or_else(|| DocStoreError::backend("storage not initialized -- call initialize() first"))
    }
}

#[async_trait]
impl BackendAdapter for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    async fn health_check(&self) -> Result<HealthStatus, DocStoreError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocStoreError> {
        if let Some(db) = self.db.get() {
            if self.config.wal_mode {
                db.connection()
                    .call(|conn| -> Result<(), rusqlite::Error> {
                        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                        Ok(())
                    })
                    .await
                    .map_err(map_tr_err)?;
                debug!("shutdown: WAL checkpoint complete");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for SqliteBackend {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Record>, DocStoreError> {
        queries::documents::get_document(self.db()?, path).await
    }

    async fn set(&self, path: &DocumentPath, record: Record) -> Result<(), DocStoreError> {
        queries::documents::put_document(self.db()?, &self.changes, path, record).await?;
        debug!(%path, "sqlite: document set");
        Ok(())
    }

    async fn update(&self, path: &DocumentPath, fields: Record) -> Result<(), DocStoreError> {
        queries::documents::update_document(self.db()?, &self.changes, path, fields).await?;
        debug!(%path, "sqlite: document updated");
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocStoreError> {
        if queries::documents::delete_document(self.db()?, &self.changes, path).await? {
            debug!(%path, "sqlite: document deleted");
        }
        Ok(())
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<(String, Record)>, DocStoreError> {
        queries::documents::list_documents(self.db()?, path).await
    }

    fn watch(&self) -> broadcast::Receiver<Change> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstore_core::BackendKind;
    use serde_json::json;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            backend: BackendKind::Sqlite,
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn sqlite_backend_implements_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let backend = SqliteBackend::new(make_config(db_path.to_str().unwrap()), 8);

        assert_eq!(backend.name(), "sqlite");
        assert_eq!(backend.version(), semver::Version::new(0, 1, 0));
        assert_eq!(backend.kind(), BackendKind::Sqlite);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let backend = SqliteBackend::new(make_config(db_path.to_str().unwrap()), 8);

        backend.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let backend = SqliteBackend::new(make_config(db_path.to_str().unwrap()), 8);

        backend.initialize().await.unwrap();
        assert!(backend.initialize().await.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let backend = SqliteBackend::new(make_config(db_path.to_str().unwrap()), 8);

        assert!(backend.health_check().await.is_err());
        let path = DocumentPath::parse("Users/1").unwrap();
        assert!(matches!(
            backend.get(&path).await,
            Err(DocStoreError::Backend { .. })
        ));
    }

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("persist.db");
        let config = make_config(db_path.to_str().unwrap());
        let path = DocumentPath::parse("Usuarios/U1").unwrap();

        let backend = SqliteBackend::open(config.clone(), 8).await.unwrap();
        assert_eq!(backend.health_check().await.unwrap(), HealthStatus::Healthy);
        backend
            .set(&path, record(json!({"name": "Ana"})))
            .await
            .unwrap();
        backend.shutdown().await.unwrap();
        drop(backend);

        let reopened = SqliteBackend::open(config, 8).await.unwrap();
        let got = reopened.get(&path).await.unwrap().unwrap();
        assert_eq!(got["name"], "Ana");
    }
}
