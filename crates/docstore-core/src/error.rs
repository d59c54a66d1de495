// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the docstore façade and its backends.

use thiserror::Error;

/// The primary error type returned by backends and façade operations.
#[derive(Debug, Error)]
pub enum DocStoreError {
    /// A path string could not be resolved to the requested reference kind.
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The target document does not exist (only raised by partial updates).
    #[error("no document to update: {path}")]
    NotFound { path: String },

    /// A value could not be converted to or from a backend record.
    #[error("conversion failed for {path}: {source}")]
    Conversion {
        path: String,
        source: serde_json::Error,
    },

    /// Backend errors (connectivity, permissions, storage failure).
    #[error("backend error: {source}")]
    Backend {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DocStoreError {
    /// Builds an [`InvalidPath`](Self::InvalidPath) error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wraps any error as a [`Backend`](Self::Backend) error.
    pub fn backend(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend {
            source: source.into(),
        }
    }

    /// Returns true when this is a [`NotFound`](Self::NotFound) error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
