// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed document and collection references.
//!
//! A reference is a path, a converter, and a backend handle. It caches no
//! data: every method goes to the backend.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::stream::BoxStream;
use serde::Serialize;
use tracing::debug;

use docstore_core::converter::to_record;
use docstore_core::{
    BackendAdapter, CollectionPath, Converter, DocStoreError, DocumentBackend, DocumentPath,
    JsonConverter,
};

use crate::snapshot::{DocumentSnapshot, Identified};
use crate::subscription::{collection_changes, decode, document_changes, identify};

/// Reference to a single document read and written as `T`.
pub struct DocumentRef<T, C = JsonConverter<T>> {
    backend: Arc<dyn DocumentBackend>,
    path: DocumentPath,
    converter: Arc<C>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> Clone for DocumentRef<T, C> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            path: self.path.clone(),
            converter: Arc::clone(&self.converter),
            _marker: PhantomData,
        }
    }
}

impl<T, C> fmt::Debug for DocumentRef<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRef")
            .field("path", &self.path)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl<T, C> DocumentRef<T, C>
where
    T: Send + 'static,
    C: Converter<T>,
{
    pub(crate) fn new(
        backend: Arc<dyn DocumentBackend>,
        path: DocumentPath,
        converter: Arc<C>,
    ) -> Self {
        Self {
            backend,
            path,
            converter,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// The collection containing this document.
    pub fn parent(&self) -> CollectionRef<T, C> {
        CollectionRef::new(
            Arc::clone(&self.backend),
            self.path.parent(),
            Arc::clone(&self.converter),
        )
    }

    /// Rebinds this reference to another application type and converter.
    pub fn with_converter<U, D>(self, converter: D) -> DocumentRef<U, D>
    where
        U: Send + 'static,
        D: Converter<U>,
    {
        DocumentRef::new(self.backend, self.path, Arc::new(converter))
    }

    /// A sub-collection under this document using the default converter.
    pub fn collection<U>(&self, name: &str) -> Result<CollectionRef<U>, DocStoreError>
    where
        U: Send + 'static,
        JsonConverter<U>: Converter<U>,
    {
        Ok(CollectionRef::new(
            Arc::clone(&self.backend),
            self.path.collection(name)?,
            Arc::new(JsonConverter::new()),
        ))
    }

    /// Reads the document.
    pub async fn get(&self) -> Result<DocumentSnapshot<T>, DocStoreError> {
        let data = self
            .backend
            .get(&self.path)
            .await?
            .map(|record| decode(&*self.converter, &self.path, record))
            .transpose()?;
        Ok(DocumentSnapshot::new(self.path.clone(), data))
    }

    /// Writes the document, replacing any existing contents.
    pub async fn set(&self, value: &T) -> Result<(), DocStoreError> {
        let record = self
            .converter
            .to_record(value)
            .map_err(|source| DocStoreError::Conversion {
                path: self.path.to_string(),
                source,
            })?;
        self.backend.set(&self.path, record).await
    }

    /// Merges the top-level fields of `partial` into the existing document.
    ///
    /// The converter is not applied: `partial` names backend fields directly.
    /// Fails with [`DocStoreError::NotFound`] if the document does not exist.
    pub async fn update<P>(&self, partial: &P) -> Result<(), DocStoreError>
    where
        P: Serialize + ?Sized,
    {
        let fields = to_record(partial).map_err(|source| DocStoreError::Conversion {
            path: self.path.to_string(),
            source,
        })?;
        self.backend.update(&self.path, fields).await
    }

    /// Deletes the document. Succeeds if it was already absent.
    pub async fn delete(&self) -> Result<(), DocStoreError> {
        self.backend.delete(&self.path).await
    }

    /// Streams the document's value now and after every change.
    pub fn listen(&self) -> BoxStream<'static, Result<Option<T>, DocStoreError>> {
        document_changes(
            Arc::clone(&self.backend),
            self.path.clone(),
            Arc::clone(&self.converter),
        )
    }
}

/// Reference to a collection whose documents are read and written as `T`.
pub struct CollectionRef<T, C = JsonConverter<T>> {
    backend: Arc<dyn DocumentBackend>,
    path: CollectionPath,
    converter: Arc<C>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> Clone for CollectionRef<T, C> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            path: self.path.clone(),
            converter: Arc::clone(&self.converter),
            _marker: PhantomData,
        }
    }
}

impl<T, C> fmt::Debug for CollectionRef<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionRef")
            .field("path", &self.path)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl<T, C> CollectionRef<T, C>
where
    T: Send + 'static,
    C: Converter<T>,
{
    pub(crate) fn new(
        backend: Arc<dyn DocumentBackend>,
        path: CollectionPath,
        converter: Arc<C>,
    ) -> Self {
        Self {
            backend,
            path,
            converter,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Rebinds this reference to another application type and converter.
    pub fn with_converter<U, D>(self, converter: D) -> CollectionRef<U, D>
    where
        U: Send + 'static,
        D: Converter<U>,
    {
        CollectionRef::new(self.backend, self.path, Arc::new(converter))
    }

    /// A document in this collection, sharing this reference's converter.
    pub fn doc(&self, id: &str) -> Result<DocumentRef<T, C>, DocStoreError> {
        Ok(DocumentRef::new(
            Arc::clone(&self.backend),
            self.path.doc(id)?,
            Arc::clone(&self.converter),
        ))
    }

    /// A not-yet-written document with a backend-generated id.
    pub fn new_doc(&self) -> Result<DocumentRef<T, C>, DocStoreError> {
        self.doc(&self.backend.generate_id())
    }

    /// Writes `value` as a new document with a generated id.
    pub async fn add(&self, value: &T) -> Result<DocumentRef<T, C>, DocStoreError> {
        let doc = self.new_doc()?;
        doc.set(value).await?;
        debug!(path = %doc.path(), "document added with generated id");
        Ok(doc)
    }

    /// Reads every document in the collection, ordered by id.
    pub async fn list(&self) -> Result<Vec<Identified<T>>, DocStoreError> {
        let listing = self.backend.list(&self.path).await?;
        identify(&*self.converter, &self.path, listing)
    }

    /// The id of the first document in backend order, if any.
    pub async fn first_id(&self) -> Result<Option<String>, DocStoreError> {
        let listing = self.backend.list(&self.path).await?;
        Ok(listing.into_iter().next().map(|(id, _)| id))
    }

    /// Streams the collection's listing now and after every change.
    pub fn listen(&self) -> BoxStream<'static, Result<Vec<Identified<T>>, DocStoreError>> {
        collection_changes(
            Arc::clone(&self.backend),
            self.path.clone(),
            Arc::clone(&self.converter),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstore_core::Record;
    use docstore_memory::MemoryBackend;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    /// Stores `name` upper-cased, reads it back lower-cased.
    struct ShoutingConverter;

    impl Converter<Item> for ShoutingConverter {
        fn to_record(&self, value: &Item) -> Result<Record, serde_json::Error> {
            to_record(&json!({ "NAME": value.name.to_uppercase() }))
        }

        fn from_record(&self, record: Record) -> Result<Item, serde_json::Error> {
            let name = record
                .get("NAME")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_lowercase();
            Ok(Item { name })
        }
    }

    fn items() -> CollectionRef<Item> {
        let backend: Arc<dyn DocumentBackend> = Arc::new(MemoryBackend::default());
        CollectionRef::new(
            backend,
            CollectionPath::parse("Items").unwrap(),
            Arc::new(JsonConverter::new()),
        )
    }

    #[tokio::test]
    async fn add_generates_id_and_roundtrips() {
        let items = items();
        let doc = items.add(&Item { name: "Ana".into() }).await.unwrap();
        assert_eq!(doc.id().len(), docstore_core::id::AUTO_ID_LEN);
        let snap = doc.get().await.unwrap();
        assert!(snap.exists());
        assert_eq!(snap.into_data().unwrap().name, "Ana");
    }

    #[tokio::test]
    async fn custom_converter_applies_both_ways() {
        let items = items().with_converter::<Item, _>(ShoutingConverter);
        let doc = items.doc("x").unwrap();
        doc.set(&Item { name: "ana".into() }).await.unwrap();

        let raw = doc
            .clone()
            .with_converter::<serde_json::Value, _>(JsonConverter::new())
            .get()
            .await
            .unwrap();
        assert_eq!(raw.into_data().unwrap(), json!({"NAME": "ANA"}));

        let listed = items.list().await.unwrap();
        assert_eq!(
            listed,
            vec![Identified {
                id: "x".into(),
                data: Item { name: "ana".into() }
            }]
        );
    }

    #[tokio::test]
    async fn conversion_failure_names_the_document() {
        let items = items();
        let raw = items
            .doc("bad")
            .unwrap()
            .with_converter::<serde_json::Value, _>(JsonConverter::new());
        raw.set(&json!({"unexpected": 1})).await.unwrap();

        let err = items.doc("bad").unwrap().get().await.unwrap_err();
        match err {
            DocStoreError::Conversion { path, .. } => assert_eq!(path, "Items/bad"),
            other => panic!("expected conversion error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_id_follows_backend_order() {
        let items = items();
        assert_eq!(items.first_id().await.unwrap(), None);
        for id in ["m", "b", "z"] {
            items
                .doc(id)
                .unwrap()
                .set(&Item { name: id.into() })
                .await
                .unwrap();
        }
        assert_eq!(items.first_id().await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn nested_collection_and_parent_navigation() {
        let items = items();
        let doc = items.doc("a").unwrap();
        let nested = doc.collection::<serde_json::Value>("Parts").unwrap();
        assert_eq!(nested.path().to_string(), "Items/a/Parts");
        assert_eq!(doc.parent().path(), items.path());
    }
}
