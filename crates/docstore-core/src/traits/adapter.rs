// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that every backend must implement.

use async_trait::async_trait;

use crate::error::DocStoreError;
use crate::types::{BackendKind, HealthStatus};

/// The base trait for all docstore backends.
///
/// Provides identity, lifecycle, and health check capabilities.
#[async_trait]
pub trait BackendAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this backend instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this backend.
    fn version(&self) -> semver::Version;

    /// Returns which backend implementation this is.
    fn kind(&self) -> BackendKind;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, DocStoreError>;

    /// Gracefully shuts down the backend, releasing any held resources.
    async fn shutdown(&self) -> Result<(), DocStoreError>;
}
