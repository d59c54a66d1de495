// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document CRUD operations.
//!
//! Write functions publish the resulting [`Change`] from the writer thread
//! after the statement commits, so subscribers observe commit order.

use docstore_core::traits::merge_fields;
use docstore_core::{Change, CollectionPath, DocStoreError, DocumentPath, Record};
use rusqlite::{params, OptionalExtension};
use tokio::sync::broadcast;

use crate::database::{map_tr_err, Database};

fn encode(record: &Record) -> Result<String, DocStoreError> {
    serde_json::to_string(record).map_err(DocStoreError::backend)
}

fn decode(path: &str, text: &str) -> Result<Record, DocStoreError> {
    serde_json::from_str(text).map_err(|e| DocStoreError::Conversion {
        path: path.to_string(),
        source: e,
    })
}

fn decode_in_conn(text: &str) -> Result<Record, rusqlite::Error> {
    serde_json::from_str(text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Get a document by path.
pub async fn get_document(
    db: &Database,
    path: &DocumentPath,
) -> Result<Option<Record>, DocStoreError> {
    let key = path.to_string();
    let text = {
        let key = key.clone();
        db.connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT data FROM documents WHERE path = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?
    };
    text.map(|t| decode(&key, &t)).transpose()
}

/// Insert or fully replace a document.
pub async fn put_document(
    db: &Database,
    changes: &broadcast::Sender<Change>,
    path: &DocumentPath,
    record: Record,
) -> Result<(), DocStoreError> {
    let data = encode(&record)?;
    let key = path.to_string();
    let collection = path.parent().to_string();
    let doc_id = path.id().to_string();
    let change = Change {
        path: path.clone(),
        record: Some(record),
    };
    let changes = changes.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO documents (path, collection, doc_id, data)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(path) DO UPDATE SET
                    data = excluded.data,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, collection, doc_id, data],
            )?;
            let _ = changes.send(change);
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Merge top-level fields into an existing document.
///
/// Read, merge, and write happen in one transaction. Returns
/// [`DocStoreError::NotFound`] when the document does not exist.
pub async fn update_document(
    db: &Database,
    changes: &broadcast::Sender<Change>,
    path: &DocumentPath,
    fields: Record,
) -> Result<(), DocStoreError> {
    let key = path.to_string();
    let change_path = path.clone();
    let changes = changes.clone();
    let found = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let existing: Option<String> = tx
                .query_row(
                    "SELECT data FROM documents WHERE path = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(existing) = existing else {
                return Ok(false);
            };

            let mut merged = decode_in_conn(&existing)?;
            merge_fields(&mut merged, fields);
            let data = serde_json::to_string(&merged)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            tx.execute(
                "UPDATE documents
                 SET data = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE path = ?2",
                params![data, key],
            )?;
            tx.commit()?;

            let _ = changes.send(Change {
                path: change_path,
                record: Some(merged),
            });
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;

    if found {
        Ok(())
    } else {
        Err(DocStoreError::NotFound {
            path: path.to_string(),
        })
    }
}

/// Delete a document. Returns whether a row was removed.
pub async fn delete_document(
    db: &Database,
    changes: &broadcast::Sender<Change>,
    path: &DocumentPath,
) -> Result<bool, DocStoreError> {
    let key = path.to_string();
    let change_path = path.clone();
    let changes = changes.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let removed = conn.execute("DELETE FROM documents WHERE path = ?1", params![key])? > 0;
            if removed {
                let _ = changes.send(Change {
                    path: change_path,
                    record: None,
                });
            }
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}

/// List the documents directly inside a collection, ordered by id.
pub async fn list_documents(
    db: &Database,
    path: &CollectionPath,
) -> Result<Vec<(String, Record)>, DocStoreError> {
    let collection = path.to_string();
    let rows = {
        let collection = collection.clone();
        db.connection()
            .call(move |conn| -> Result<Vec<(String, String)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT doc_id, data FROM documents WHERE collection = ?1 ORDER BY doc_id ASC",
                )?;
                let rows = stmt
                    .query_map(params![collection], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)?
    };
    rows.into_iter()
        .map(|(id, text)| -> Result<(String, Record), DocStoreError> {
            let record = decode(&format!("{collection}/{id}"), &text)?;
            Ok((id, record))
        })
        .collect()
}
