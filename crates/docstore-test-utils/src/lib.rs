// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for docstore integration tests.
//!
//! # Components
//!
//! - [`FlakyBackend`] - wraps a backend and fails writes or reads on demand
//! - [`fixtures`] - record builders and a shared in-memory backend

pub mod fixtures;
pub mod flaky;

pub use fixtures::{memory_backend, record};
pub use flaky::FlakyBackend;
