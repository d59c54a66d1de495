// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path, record, and change types shared by the façade and its backends.
//!
//! Paths alternate collection and document segments: an odd number of
//! segments names a collection, an even number names a document. Segment
//! characters are never inspected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::DocStoreError;

/// The backend-native shape of a stored document.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Default buffer size of a backend's broadcast change feed.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Splits a raw path into its non-empty segments.
///
/// Leading and trailing slashes are ignored; `//` and empty paths are rejected.
fn split_segments(raw: &str) -> Result<Vec<String>, DocStoreError> {
    if raw.contains("//") {
        return Err(DocStoreError::invalid_path(raw, "path must not contain `//`"));
    }
    let segments: Vec<String> = raw
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if segments.is_empty() {
        return Err(DocStoreError::invalid_path(raw, "path must not be empty"));
    }
    Ok(segments)
}

/// Path to a single document (even segment count).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Parses a document path, rejecting collection paths.
    pub fn parse(raw: &str) -> Result<Self, DocStoreError> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 != 0 {
            return Err(DocStoreError::invalid_path(
                raw,
                format!(
                    "a document reference needs an even number of segments, got {}",
                    segments.len()
                ),
            ));
        }
        Ok(Self { segments })
    }

    /// The document identifier (last segment).
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The collection containing this document.
    pub fn parent(&self) -> CollectionPath {
        CollectionPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }

    /// A sub-collection nested under this document.
    pub fn collection(&self, name: &str) -> Result<CollectionPath, DocStoreError> {
        CollectionPath::parse(&format!("{self}/{name}"))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for DocumentPath {
    type Err = DocStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Path to a collection (odd segment count).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Parses a collection path, rejecting document paths.
    pub fn parse(raw: &str) -> Result<Self, DocStoreError> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 != 1 {
            return Err(DocStoreError::invalid_path(
                raw,
                format!(
                    "a collection reference needs an odd number of segments, got {}",
                    segments.len()
                ),
            ));
        }
        Ok(Self { segments })
    }

    /// The collection name (last segment).
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The document owning this collection, or `None` for a root collection.
    pub fn parent(&self) -> Option<DocumentPath> {
        if self.segments.len() < 3 {
            return None;
        }
        Some(DocumentPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// A document inside this collection.
    pub fn doc(&self, id: &str) -> Result<DocumentPath, DocStoreError> {
        DocumentPath::parse(&format!("{self}/{id}"))
    }

    /// Returns true when `path` is a direct child of this collection.
    pub fn contains(&self, path: &DocumentPath) -> bool {
        path.segments.len() == self.segments.len() + 1
            && path.segments.starts_with(&self.segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for CollectionPath {
    type Err = DocStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A path resolved by segment parity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourcePath {
    Collection(CollectionPath),
    Document(DocumentPath),
}

impl ResourcePath {
    pub fn parse(raw: &str) -> Result<Self, DocStoreError> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 == 0 {
            Ok(Self::Document(DocumentPath { segments }))
        } else {
            Ok(Self::Collection(CollectionPath { segments }))
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(path) => path.fmt(f),
            Self::Document(path) => path.fmt(f),
        }
    }
}

/// A committed write published on a backend's change feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// The document that was written.
    pub path: DocumentPath,
    /// The document contents after the write; `None` when it was deleted.
    pub record: Option<Record>,
}

impl Change {
    pub fn is_delete(&self) -> bool {
        self.record.is_none()
    }
}

/// Health status reported by backend health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}

/// Identifies which backend implementation serves a store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    Sqlite,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_document_path() {
        let path = DocumentPath::parse("Users/42/Orders/7").unwrap();
        assert_eq!(path.id(), "7");
        assert_eq!(path.parent().to_string(), "Users/42/Orders");
        assert_eq!(path.to_string(), "Users/42/Orders/7");
    }

    #[test]
    fn collection_parent_is_owning_document() {
        let col = CollectionPath::parse("Users/42/Orders").unwrap();
        assert_eq!(col.id(), "Orders");
        assert_eq!(col.parent().unwrap().to_string(), "Users/42");
        assert!(CollectionPath::parse("Users").unwrap().parent().is_none());
    }

    #[test]
    fn rejects_wrong_parity() {
        assert!(matches!(
            DocumentPath::parse("Users"),
            Err(DocStoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            CollectionPath::parse("Users/42"),
            Err(DocStoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn rejects_empty_and_double_slash() {
        assert!(ResourcePath::parse("").is_err());
        assert!(ResourcePath::parse("///").is_err());
        assert!(ResourcePath::parse("Users//42").is_err());
    }

    #[test]
    fn ignores_surrounding_slashes() {
        let path = DocumentPath::parse("/Users/42/").unwrap();
        assert_eq!(path.to_string(), "Users/42");
    }

    #[test]
    fn collection_contains_only_direct_children() {
        let col = CollectionPath::parse("Users").unwrap();
        assert!(col.contains(&DocumentPath::parse("Users/1").unwrap()));
        assert!(!col.contains(&DocumentPath::parse("Users/1/Orders/2").unwrap()));
        assert!(!col.contains(&DocumentPath::parse("Admins/1").unwrap()));
    }

    #[test]
    fn nested_builders_concatenate() {
        let user = DocumentPath::parse("Usuarios/U1").unwrap();
        let sub = user.collection("AFIP").unwrap();
        assert_eq!(sub.to_string(), "Usuarios/U1/AFIP");
        assert_eq!(sub.doc("x").unwrap().to_string(), "Usuarios/U1/AFIP/x");
    }

    #[test]
    fn backend_kind_parses_lowercase() {
        use std::str::FromStr;
        assert_eq!(BackendKind::from_str("sqlite").unwrap(), BackendKind::Sqlite);
        assert_eq!(BackendKind::Memory.to_string(), "memory");
    }

    proptest! {
        #[test]
        fn parity_decides_reference_kind(segments in prop::collection::vec("[A-Za-z0-9_]{1,8}", 1..10)) {
            let raw = segments.join("/");
            let resolved = ResourcePath::parse(&raw).unwrap();
            if segments.len() % 2 == 1 {
                prop_assert!(resolved.is_collection());
            } else {
                prop_assert!(resolved.is_document());
            }
            prop_assert_eq!(resolved.to_string(), raw);
        }
    }
}
