// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend selection from configuration.

use std::sync::Arc;

use tracing::info;

use docstore_config::DocStoreConfig;
use docstore_core::{BackendAdapter, BackendKind, DocStoreError, DocumentBackend};
use docstore_memory::MemoryBackend;

/// Builds and initializes the backend named by `config.storage.backend`.
pub async fn open_backend(config: &DocStoreConfig) -> Result<Arc<dyn DocumentBackend>, DocStoreError> {
    let capacity = config.subscriptions.channel_capacity;
    let backend: Arc<dyn DocumentBackend> = match config.storage.backend {
        BackendKind::Memory => Arc::new(MemoryBackend::new(capacity)),
        #[cfg(feature = "sqlite")]
        BackendKind::Sqlite => Arc::new(
            docstore_sqlite::SqliteBackend::open(config.storage.clone(), capacity).await?,
        ),
        #[cfg(not(feature = "sqlite"))]
        BackendKind::Sqlite => {
            return Err(DocStoreError::Config(
                "the sqlite backend requires the `sqlite` feature".to_string(),
            ));
        }
    };
    info!(
        backend = backend.name(),
        version = %backend.version(),
        "document backend ready"
    );
    Ok(backend)
}
