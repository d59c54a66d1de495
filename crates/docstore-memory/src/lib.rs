// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process document backend for the docstore façade.
//!
//! Documents live in an ordered map keyed by collection and id behind an
//! async `RwLock`. Committed writes are published on a broadcast change feed.
//! Suited to tests and embedded use; nothing is persisted.

pub mod store;

pub use store::MemoryBackend;
