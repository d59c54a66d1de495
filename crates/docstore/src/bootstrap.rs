// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User bootstrap: a user document plus its fixed set of sub-collections.
//!
//! Writes are sequential and not atomic. A failure part-way leaves the user
//! document and the sub-collections seeded so far in place; the error is
//! returned unchanged and the committed prefix is logged.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use docstore_core::{CollectionPath, DocStoreError, DocumentBackend, DocumentPath, Record};

/// Top-level collection holding user documents.
pub const USERS_COLLECTION: &str = "Usuarios";

/// Sub-collections created under every new user, in creation order.
pub const USER_SUBCOLLECTIONS: [&str; 6] = [
    "certIngreso",
    "declaracionJurada",
    "facturacion",
    "infoPersonal",
    "planPago",
    "AFIP",
];

/// Contents of the document that materializes each sub-collection.
pub fn placeholder_record() -> Record {
    Record::from_iter([("initialized".to_string(), Value::Bool(true))])
}

/// Writes `Usuarios/{user_id}` and one placeholder document in each
/// sub-collection of [`USER_SUBCOLLECTIONS`].
pub(crate) async fn seed_user(
    backend: &Arc<dyn DocumentBackend>,
    user_id: &str,
    data: Record,
) -> Result<(), DocStoreError> {
    let user = DocumentPath::parse(&format!("{USERS_COLLECTION}/{user_id}"))?;
    backend.set(&user, data).await?;

    let mut seeded: Vec<&str> = Vec::with_capacity(USER_SUBCOLLECTIONS.len());
    for name in USER_SUBCOLLECTIONS {
        if let Err(e) = seed_subcollection(backend, &user, name).await {
            warn!(
                user = %user,
                failed = name,
                seeded = ?seeded,
                error = %e,
                "user bootstrap stopped part-way"
            );
            return Err(e);
        }
        seeded.push(name);
    }

    info!(user = %user, subcollections = seeded.len(), "user bootstrapped");
    Ok(())
}

async fn seed_subcollection(
    backend: &Arc<dyn DocumentBackend>,
    user: &DocumentPath,
    name: &str,
) -> Result<(), DocStoreError> {
    let collection: CollectionPath = user.collection(name)?;
    let doc = collection.doc(&backend.generate_id())?;
    backend.set(&doc, placeholder_record()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcollection_names_are_unique() {
        let mut names = USER_SUBCOLLECTIONS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), USER_SUBCOLLECTIONS.len());
    }

    #[test]
    fn placeholder_marks_initialized() {
        let record = placeholder_record();
        assert_eq!(record.len(), 1);
        assert_eq!(record["initialized"], Value::Bool(true));
    }
}
