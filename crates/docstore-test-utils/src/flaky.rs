// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault-injecting backend wrapper.
//!
//! `FlakyBackend` forwards to an inner backend until told to fail. Writes
//! can be cut off after a fixed number of successes, and reads can be
//! switched off entirely. Injected failures surface as
//! [`DocStoreError::Backend`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use docstore_core::{
    BackendAdapter, BackendKind, Change, CollectionPath, DocStoreError, DocumentBackend,
    DocumentPath, HealthStatus, Record,
};

/// A backend that fails on demand.
pub struct FlakyBackend {
    inner: Arc<dyn DocumentBackend>,
    writes: AtomicUsize,
    write_limit: AtomicUsize,
    fail_reads: AtomicBool,
}

impl FlakyBackend {
    /// Wrap `inner`. Nothing fails until configured to.
    pub fn new(inner: Arc<dyn DocumentBackend>) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            write_limit: AtomicUsize::new(usize::MAX),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Allow `n` more writes to succeed, then fail every write after them.
    pub fn fail_writes_after(&self, n: usize) {
        let done = self.writes.load(Ordering::SeqCst);
        self.write_limit
            .store(done.saturating_add(n), Ordering::SeqCst);
    }

    /// Make `get` and `list` fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of writes that reached the inner backend.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The wrapped backend, for inspecting state behind the failures.
    pub fn inner(&self) -> &Arc<dyn DocumentBackend> {
        &self.inner
    }

    fn admit_write(&self, op: &str, path: &DocumentPath) -> Result<(), DocStoreError> {
        let limit = self.write_limit.load(Ordering::SeqCst);
        let admitted = self
            .writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < limit).then_some(n + 1)
            })
            .is_ok();
        if admitted {
            Ok(())
        } else {
            debug!(op, %path, "flaky: injected write failure");
            Err(DocStoreError::backend(format!("injected {op} failure at {path}")))
        }
    }

    fn admit_read(&self, what: &str) -> Result<(), DocStoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            debug!(what, "flaky: injected read failure");
            return Err(DocStoreError::backend(format!("injected read failure at {what}")));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendAdapter for FlakyBackend {
    fn name(&self) -> &str {
        "flaky"
    }

    fn version(&self) -> semver::Version {
        self.inner.version()
    }

    fn kind(&self) -> BackendKind {
        self.inner.kind()
    }

    async fn health_check(&self) -> Result<HealthStatus, DocStoreError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), DocStoreError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl DocumentBackend for FlakyBackend {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Record>, DocStoreError> {
        self.admit_read(&path.to_string())?;
        self.inner.get(path).await
    }

    async fn set(&self, path: &DocumentPath, record: Record) -> Result<(), DocStoreError> {
        self.admit_write("set", path)?;
        self.inner.set(path, record).await
    }

    async fn update(&self, path: &DocumentPath, fields: Record) -> Result<(), DocStoreError> {
        self.admit_write("update", path)?;
        self.inner.update(path, fields).await
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocStoreError> {
        self.admit_write("delete", path)?;
        self.inner.delete(path).await
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<(String, Record)>, DocStoreError> {
        self.admit_read(&path.to_string())?;
        self.inner.list(path).await
    }

    fn watch(&self) -> broadcast::Receiver<Change> {
        self.inner.watch()
    }

    fn generate_id(&self) -> String {
        self.inner.generate_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{memory_backend, record};
    use serde_json::json;

    fn doc(raw: &str) -> DocumentPath {
        DocumentPath::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn passes_through_by_default() {
        let flaky = FlakyBackend::new(memory_backend());
        flaky.set(&doc("A/1"), record(json!({"x": 1}))).await.unwrap();
        assert_eq!(flaky.write_count(), 1);
        assert!(flaky.get(&doc("A/1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn writes_fail_after_limit() {
        let flaky = FlakyBackend::new(memory_backend());
        flaky.fail_writes_after(2);
        flaky.set(&doc("A/1"), record(json!({}))).await.unwrap();
        flaky.set(&doc("A/2"), record(json!({}))).await.unwrap();
        let err = flaky.set(&doc("A/3"), record(json!({}))).await.unwrap_err();
        assert!(matches!(err, DocStoreError::Backend { .. }));
        assert_eq!(flaky.write_count(), 2);
        assert!(flaky.inner().get(&doc("A/3")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reads_can_be_switched_off() {
        let flaky = FlakyBackend::new(memory_backend());
        flaky.set_fail_reads(true);
        assert!(flaky.get(&doc("A/1")).await.is_err());
        assert!(flaky.list(&CollectionPath::parse("A").unwrap()).await.is_err());
        flaky.set_fail_reads(false);
        assert!(flaky.get(&doc("A/1")).await.unwrap().is_none());
    }
}
