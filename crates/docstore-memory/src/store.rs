// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered in-memory document map with a broadcast change feed.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use docstore_core::traits::merge_fields;
use docstore_core::{
    BackendAdapter, BackendKind, Change, CollectionPath, DocStoreError, DocumentBackend,
    DocumentPath, HealthStatus, Record, DEFAULT_CHANNEL_CAPACITY,
};

type Collections = BTreeMap<CollectionPath, BTreeMap<String, Record>>;

/// In-process backend.
///
/// Changes are published while the write lock is held, so subscribers see
/// them in commit order.
pub struct MemoryBackend {
    collections: RwLock<Collections>,
    changes: broadcast::Sender<Change>,
}

impl MemoryBackend {
    /// Creates an empty backend whose change feed buffers `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        Self {
            collections: RwLock::new(BTreeMap::new()),
            changes,
        }
    }

    /// Total number of stored documents across all collections.
    pub async fn document_count(&self) -> usize {
        self.collections.read().await.values().map(BTreeMap::len).sum()
    }

    fn publish(&self, path: &DocumentPath, record: Option<Record>) {
        // Sending fails only when nobody is subscribed.
        let _ = self.changes.send(Change {
            path: path.clone(),
            record,
        });
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl BackendAdapter for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn health_check(&self) -> Result<HealthStatus, DocStoreError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocStoreError> {
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Record>, DocStoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.parent())
            .and_then(|docs| docs.get(path.id()))
            .cloned())
    }

    async fn set(&self, path: &DocumentPath, record: Record) -> Result<(), DocStoreError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(path.parent())
            .or_default()
            .insert(path.id().to_string(), record.clone());
        self.publish(path, Some(record));
        debug!(%path, "memory: document set");
        Ok(())
    }

    async fn update(&self, path: &DocumentPath, fields: Record) -> Result<(), DocStoreError> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(&path.parent())
            .and_then(|docs| docs.get_mut(path.id()))
            .ok_or_else(|| DocStoreError::NotFound {
                path: path.to_string(),
            })?;
        merge_fields(existing, fields);
        let merged = existing.clone();
        self.publish(path, Some(merged));
        debug!(%path, "memory: document updated");
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocStoreError> {
        let mut collections = self.collections.write().await;
        let parent = path.parent();
        let removed = collections
            .get_mut(&parent)
            .and_then(|docs| docs.remove(path.id()))
            .is_some();
        if collections.get(&parent).is_some_and(BTreeMap::is_empty) {
            collections.remove(&parent);
        }
        if removed {
            self.publish(path, None);
            debug!(%path, "memory: document deleted");
        }
        Ok(())
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<(String, Record)>, DocStoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(path)
            .map(|docs| {
                docs.iter()
                    .map(|(id, record)| (id.clone(), record.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn watch(&self) -> broadcast::Receiver<Change> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn doc(path: &str) -> DocumentPath {
        DocumentPath::parse(path).unwrap()
    }

    #[tokio::test]
    async fn set_then_get_returns_record() {
        let backend = MemoryBackend::default();
        backend
            .set(&doc("Users/1"), record(json!({"name": "Ana"})))
            .await
            .unwrap();
        let got = backend.get(&doc("Users/1")).await.unwrap().unwrap();
        assert_eq!(got["name"], "Ana");
        assert!(backend.get(&doc("Users/2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_overwrites_entirely() {
        let backend = MemoryBackend::default();
        let path = doc("Users/1");
        backend
            .set(&path, record(json!({"name": "Ana", "age": 30})))
            .await
            .unwrap();
        backend
            .set(&path, record(json!({"name": "Eva"})))
            .await
            .unwrap();
        let got = backend.get(&path).await.unwrap().unwrap();
        assert_eq!(serde_json::Value::Object(got), json!({"name": "Eva"}));
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let backend = MemoryBackend::default();
        let err = backend
            .update(&doc("Users/404"), record(json!({"a": 1})))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(backend.document_count().await, 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_keeps_subcollections() {
        let backend = MemoryBackend::default();
        backend
            .set(&doc("Users/1"), record(json!({"a": 1})))
            .await
            .unwrap();
        backend
            .set(&doc("Users/1/Orders/9"), record(json!({"b": 2})))
            .await
            .unwrap();

        backend.delete(&doc("Users/1")).await.unwrap();
        backend.delete(&doc("Users/1")).await.unwrap();

        assert!(backend.get(&doc("Users/1")).await.unwrap().is_none());
        assert!(backend.get(&doc("Users/1/Orders/9")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_is_ordered_by_id_and_scoped_to_collection() {
        let backend = MemoryBackend::default();
        for id in ["c", "a", "b"] {
            backend
                .set(&doc(&format!("Items/{id}")), record(json!({"id": id})))
                .await
                .unwrap();
        }
        backend
            .set(&doc("Items/a/Nested/z"), record(json!({})))
            .await
            .unwrap();

        let listed = backend
            .list(&CollectionPath::parse("Items").unwrap())
            .await
            .unwrap();
        let ids: Vec<_> = listed.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn watch_sees_writes_in_commit_order() {
        let backend = MemoryBackend::new(8);
        let mut rx = backend.watch();
        let path = doc("Users/1");

        backend.set(&path, record(json!({"v": 1}))).await.unwrap();
        backend.update(&path, record(json!({"v": 2}))).await.unwrap();
        backend.delete(&path).await.unwrap();
        // Absent documents publish nothing.
        backend.delete(&path).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().record.unwrap()["v"], 1);
        assert_eq!(rx.recv().await.unwrap().record.unwrap()["v"], 2);
        assert!(rx.recv().await.unwrap().is_delete());
        assert!(rx.try_recv().is_err());
    }
}
