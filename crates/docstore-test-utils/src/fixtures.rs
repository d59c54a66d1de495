// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small builders shared by tests.

use std::sync::Arc;

use docstore_core::{DocumentBackend, Record};
use docstore_memory::MemoryBackend;

/// Converts a JSON object literal into a [`Record`].
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("fixture record must be a JSON object, got {other}"),
    }
}

/// A fresh in-memory backend behind the trait object the façade expects.
pub fn memory_backend() -> Arc<dyn DocumentBackend> {
    Arc::new(MemoryBackend::default())
}
