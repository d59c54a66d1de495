// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed document-store façade.
//!
//! [`DocumentStore`] wraps an injected [`DocumentBackend`] and exposes
//! path-addressed reads, writes, partial updates, deletes, and live
//! subscriptions over application types. Values cross the backend boundary
//! through a [`Converter`]; the default [`JsonConverter`] uses serde and
//! checks no schema.
//!
//! ```no_run
//! # async fn demo() -> Result<(), docstore::DocStoreError> {
//! use docstore::DocumentStore;
//! use serde_json::json;
//!
//! let store = DocumentStore::open(&docstore_config::DocStoreConfig::default()).await?;
//! let id = store
//!     .create_document_with_auto_id(&json!({"name": "Ana"}), "Usuarios")
//!     .await?;
//! let ana: Option<serde_json::Value> = store.get_document_by_id("Usuarios", &id).await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod bootstrap;
pub mod reference;
pub mod snapshot;
pub mod store;
mod subscription;

pub use backend::open_backend;
pub use bootstrap::{USERS_COLLECTION, USER_SUBCOLLECTIONS};
pub use reference::{CollectionRef, DocumentRef};
pub use snapshot::{DocumentSnapshot, Identified};
pub use store::DocumentStore;

pub use docstore_core::{
    BackendAdapter, CollectionPath, Converter, DocStoreError, DocumentBackend, DocumentPath,
    JsonConverter, Record, ResourcePath,
};
