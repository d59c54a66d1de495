// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document backend trait: the primitives the façade is built on.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::DocStoreError;
use crate::id::auto_id;
use crate::traits::adapter::BackendAdapter;
use crate::types::{Change, CollectionPath, DocumentPath, Record};

/// Adapter for document-oriented storage backends.
///
/// Every committed write (set, update, delete) must be published on the
/// change feed returned by [`watch`](Self::watch) after it is durable.
#[async_trait]
pub trait DocumentBackend: BackendAdapter {
    /// Reads a document. Absent documents are `Ok(None)`.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Record>, DocStoreError>;

    /// Writes a document, replacing any existing contents.
    async fn set(&self, path: &DocumentPath, record: Record) -> Result<(), DocStoreError>;

    /// Merges top-level fields into an existing document.
    ///
    /// Returns [`DocStoreError::NotFound`] when the document does not exist.
    async fn update(&self, path: &DocumentPath, fields: Record) -> Result<(), DocStoreError>;

    /// Deletes a document. Deleting an absent document succeeds.
    async fn delete(&self, path: &DocumentPath) -> Result<(), DocStoreError>;

    /// Lists the documents directly inside a collection, ordered by id.
    async fn list(&self, path: &CollectionPath) -> Result<Vec<(String, Record)>, DocStoreError>;

    /// Subscribes to the change feed.
    fn watch(&self) -> broadcast::Receiver<Change>;

    /// Generates an id for a new document.
    fn generate_id(&self) -> String {
        auto_id()
    }
}

/// Merges `fields` over `existing` at the top level.
pub fn merge_fields(existing: &mut Record, fields: Record) {
    for (key, value) in fields {
        existing.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_replaces_named_fields_and_keeps_others() {
        let mut existing = json!({"name": "Ana", "age": 30, "tags": ["a"]})
            .as_object()
            .cloned()
            .unwrap();
        let fields = json!({"age": 31, "city": "Rosario"})
            .as_object()
            .cloned()
            .unwrap();
        merge_fields(&mut existing, fields);
        assert_eq!(
            serde_json::Value::Object(existing),
            json!({"name": "Ana", "age": 31, "tags": ["a"], "city": "Rosario"})
        );
    }
}
