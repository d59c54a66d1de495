// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read results handed to callers.

use docstore_core::DocumentPath;

/// A point-in-time read of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot<T> {
    path: DocumentPath,
    data: Option<T>,
}

impl<T> DocumentSnapshot<T> {
    pub(crate) fn new(path: DocumentPath, data: Option<T>) -> Self {
        Self { path, data }
    }

    /// Whether the document existed when it was read.
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// A collection member tagged with its document id.
#[derive(Debug, Clone, PartialEq)]
pub struct Identified<T> {
    pub id: String,
    pub data: T,
}
