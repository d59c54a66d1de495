// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The document-store façade.
//!
//! Every operation takes slash-separated paths, parses them into typed
//! paths, and delegates to the injected backend through a reference. Paths
//! with the wrong parity are rejected before any I/O.

use std::sync::Arc;

use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use docstore_config::validation::validate_config;
use docstore_config::DocStoreConfig;
use docstore_core::converter::to_record;
use docstore_core::{
    BackendAdapter, CollectionPath, Converter, DocStoreError, DocumentBackend, DocumentPath,
    JsonConverter,
};

use crate::backend::open_backend;
use crate::bootstrap::{seed_user, USERS_COLLECTION};
use crate::reference::{CollectionRef, DocumentRef};
use crate::snapshot::{DocumentSnapshot, Identified};

/// Path-addressed access to an injected [`DocumentBackend`].
///
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn DocumentBackend>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Validates `config` and opens the backend it names.
    pub async fn open(config: &DocStoreConfig) -> Result<Self, DocStoreError> {
        validate_config(config).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            DocStoreError::Config(messages.join("; "))
        })?;
        Ok(Self::new(open_backend(config).await?))
    }

    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }

    /// A typed reference to the document at `path`, using serde conversion.
    pub fn doc<T>(&self, path: &str) -> Result<DocumentRef<T>, DocStoreError>
    where
        T: Send + 'static,
        JsonConverter<T>: Converter<T>,
    {
        Ok(DocumentRef::new(
            Arc::clone(&self.backend),
            DocumentPath::parse(path)?,
            Arc::new(JsonConverter::new()),
        ))
    }

    /// A typed reference to the collection at `path`, using serde conversion.
    pub fn collection<T>(&self, path: &str) -> Result<CollectionRef<T>, DocStoreError>
    where
        T: Send + 'static,
        JsonConverter<T>: Converter<T>,
    {
        Ok(CollectionRef::new(
            Arc::clone(&self.backend),
            CollectionPath::parse(path)?,
            Arc::new(JsonConverter::new()),
        ))
    }

    /// Reads the document at `path`.
    pub async fn get_document<T>(&self, path: &str) -> Result<DocumentSnapshot<T>, DocStoreError>
    where
        T: DeserializeOwned + Serialize + Send + 'static,
    {
        self.doc::<T>(path)?.get().await
    }

    /// Streams the document at `path`: its current value, then its value
    /// after every change. `None` means absent or deleted.
    pub fn get_document_changes<T>(
        &self,
        path: &str,
    ) -> Result<BoxStream<'static, Result<Option<T>, DocStoreError>>, DocStoreError>
    where
        T: DeserializeOwned + Serialize + Send + 'static,
    {
        Ok(self.doc::<T>(path)?.listen())
    }

    /// Streams the collection at `path` as a listing ordered by id, re-emitted
    /// after every change to one of its documents.
    pub fn get_collection_changes<T>(
        &self,
        path: &str,
    ) -> Result<BoxStream<'static, Result<Vec<Identified<T>>, DocStoreError>>, DocStoreError>
    where
        T: DeserializeOwned + Serialize + Send + 'static,
    {
        Ok(self.collection::<T>(path)?.listen())
    }

    /// Writes `data` at the document `path`, replacing any existing contents.
    pub async fn create_document<T>(&self, data: &T, path: &str) -> Result<(), DocStoreError>
    where
        T: Serialize + ?Sized,
    {
        let path = DocumentPath::parse(path)?;
        let record = to_record(data).map_err(|source| DocStoreError::Conversion {
            path: path.to_string(),
            source,
        })?;
        self.backend.set(&path, record).await?;
        debug!(%path, "document created");
        Ok(())
    }

    /// Adds `data` to the collection at `path` under a generated id, which is
    /// returned.
    pub async fn create_document_with_auto_id<T>(
        &self,
        data: &T,
        path: &str,
    ) -> Result<String, DocStoreError>
    where
        T: Serialize + ?Sized,
    {
        let collection = CollectionPath::parse(path)?;
        let doc = collection.doc(&self.backend.generate_id())?;
        let record = to_record(data).map_err(|source| DocStoreError::Conversion {
            path: doc.to_string(),
            source,
        })?;
        self.backend.set(&doc, record).await?;
        debug!(path = %doc, "document created with generated id");
        Ok(doc.id().to_string())
    }

    /// Merges the top-level fields of `partial` into `{path}/{id}`.
    ///
    /// Fails with [`DocStoreError::NotFound`] if the document does not exist.
    pub async fn update_document<P>(
        &self,
        partial: &P,
        path: &str,
        id: &str,
    ) -> Result<(), DocStoreError>
    where
        P: Serialize + ?Sized,
    {
        self.doc::<serde_json::Value>(&format!("{path}/{id}"))?
            .update(partial)
            .await
    }

    /// Deletes `{path}/{id}`. Deleting an absent document succeeds.
    pub async fn delete_document_id(&self, path: &str, id: &str) -> Result<(), DocStoreError> {
        self.doc::<serde_json::Value>(&format!("{path}/{id}"))?
            .delete()
            .await
    }

    /// Deletes the document `doc` points at.
    pub async fn delete_doc_from_ref<T, C>(&self, doc: &DocumentRef<T, C>) -> Result<(), DocStoreError>
    where
        T: Send + 'static,
        C: Converter<T>,
    {
        self.backend.delete(doc.path()).await
    }

    /// Writes `Usuarios/{user_id}` and seeds each user sub-collection with
    /// one placeholder document.
    ///
    /// Not atomic: on failure the writes already committed stay in place and
    /// the backend error is returned unchanged.
    pub async fn create_user_with_subcollections<T>(
        &self,
        data: &T,
        user_id: &str,
    ) -> Result<(), DocStoreError>
    where
        T: Serialize + ?Sized,
    {
        let record = to_record(data).map_err(|source| DocStoreError::Conversion {
            path: format!("{USERS_COLLECTION}/{user_id}"),
            source,
        })?;
        seed_user(&self.backend, user_id, record).await
    }

    /// The id of the first document in the sub-collection `name` under the
    /// document at `path`, if it has any.
    pub async fn get_document_id_in_subcollection(
        &self,
        path: &str,
        name: &str,
    ) -> Result<Option<String>, DocStoreError> {
        self.doc::<serde_json::Value>(path)?
            .collection::<serde_json::Value>(name)?
            .first_id()
            .await
    }

    /// Reads `{collection_path}/{id}`. Errors are logged before being returned.
    pub async fn get_document_by_id<T>(
        &self,
        collection_path: &str,
        id: &str,
    ) -> Result<Option<T>, DocStoreError>
    where
        T: DeserializeOwned + Serialize + Send + 'static,
    {
        let result = async {
            let collection = self.collection::<T>(collection_path)?;
            let snapshot = collection.doc(id)?.get().await?;
            Ok::<_, DocStoreError>(snapshot.into_data())
        }
        .await;

        if let Err(e) = &result {
            error!(collection = collection_path, id, error = %e, "failed to read document by id");
        }
        result
    }
}
