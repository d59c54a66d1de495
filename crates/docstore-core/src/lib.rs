// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the docstore façade.
//!
//! This crate provides the backend trait definitions, error type, path
//! types, and converters used throughout the docstore workspace. Every
//! backend implements the traits defined here.

pub mod converter;
pub mod error;
pub mod id;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use converter::{Converter, JsonConverter};
pub use error::DocStoreError;
pub use id::auto_id;
pub use types::{
    BackendKind, Change, CollectionPath, DocumentPath, HealthStatus, Record, ResourcePath,
    DEFAULT_CHANNEL_CAPACITY,
};

pub use traits::{BackendAdapter, DocumentBackend};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docstore_error_has_all_variants() {
        let _path = DocStoreError::invalid_path("a//b", "test");
        let _not_found = DocStoreError::NotFound {
            path: "Users/1".into(),
        };
        let _conversion = DocStoreError::Conversion {
            path: "Users/1".into(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        let _backend = DocStoreError::backend(std::io::Error::other("test"));
        let _config = DocStoreError::Config("test".into());
        let _internal = DocStoreError::Internal("test".into());
    }

    #[test]
    fn not_found_is_detectable() {
        let err = DocStoreError::NotFound {
            path: "Users/1".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no document to update: Users/1");
        assert!(!DocStoreError::Internal("x".into()).is_not_found());
    }

    #[test]
    fn backend_traits_are_object_safe() {
        fn _assert_dyn(_: &dyn DocumentBackend) {}
        fn _assert_adapter<T: BackendAdapter>() {}
    }
}
