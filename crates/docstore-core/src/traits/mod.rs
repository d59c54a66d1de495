// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend trait definitions.
//!
//! Backends implement [`BackendAdapter`] and [`DocumentBackend`] and use
//! `#[async_trait]` so the façade can hold them as trait objects.

pub mod adapter;
pub mod backend;

pub use adapter::BackendAdapter;
pub use backend::{merge_fields, DocumentBackend};
