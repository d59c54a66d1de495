// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live subscriptions built on a backend's change feed.
//!
//! The feed receiver is taken before the initial read, so no change committed
//! after subscription is missed. A lagging receiver re-reads current state
//! instead of replaying what it skipped. A stream ends after yielding an
//! error or when the backend's feed closes; dropping it unsubscribes.
//!
//! Backends publish a change before any read can observe it. After every
//! full read the queued changes are discarded, and if one of them touched
//! the watched path the read is repeated. What remains queued afterwards is
//! newer than the emitted state, so items never go back in time.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast::{self, error::{RecvError, TryRecvError}};
use tracing::{debug, warn};

use docstore_core::{
    Change, CollectionPath, Converter, DocStoreError, DocumentBackend, DocumentPath, Record,
};

use crate::snapshot::Identified;

/// Applies `converter` to a record read from `path`.
pub(crate) fn decode<T, C>(
    converter: &C,
    path: &impl Display,
    record: Record,
) -> Result<T, DocStoreError>
where
    C: Converter<T> + ?Sized,
{
    converter
        .from_record(record)
        .map_err(|source| DocStoreError::Conversion {
            path: path.to_string(),
            source,
        })
}

struct DocumentWatch {
    backend: Arc<dyn DocumentBackend>,
    path: DocumentPath,
    rx: broadcast::Receiver<Change>,
    primed: bool,
}

impl DocumentWatch {
    async fn next(&mut self) -> Option<Result<Option<Record>, DocStoreError>> {
        if !self.primed {
            self.primed = true;
            return Some(self.read_current().await);
        }
        loop {
            match self.rx.recv().await {
                Ok(change) if change.path == self.path => return Some(Ok(change.record)),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(path = %self.path, skipped, "document subscription lagged, re-reading");
                    return Some(self.read_current().await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    async fn read_current(&mut self) -> Result<Option<Record>, DocStoreError> {
        loop {
            let current = self.backend.get(&self.path).await?;
            let path = &self.path;
            if !discard_queued(&mut self.rx, |change| change.path == *path) {
                return Ok(current);
            }
        }
    }
}

struct CollectionWatch {
    backend: Arc<dyn DocumentBackend>,
    path: CollectionPath,
    rx: broadcast::Receiver<Change>,
    docs: Option<BTreeMap<String, Record>>,
}

impl CollectionWatch {
    async fn next(&mut self) -> Option<Result<Vec<(String, Record)>, DocStoreError>> {
        if self.docs.is_none() {
            return Some(self.resync().await);
        }
        loop {
            match self.rx.recv().await {
                Ok(change) if self.path.contains(&change.path) => {
                    let docs = self.docs.get_or_insert_with(BTreeMap::new);
                    let id = change.path.id().to_string();
                    match change.record {
                        Some(record) => {
                            docs.insert(id, record);
                        }
                        None => {
                            docs.remove(&id);
                        }
                    }
                    return Some(Ok(self.listing()));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(path = %self.path, skipped, "collection subscription lagged, re-listing");
                    return Some(self.resync().await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    async fn resync(&mut self) -> Result<Vec<(String, Record)>, DocStoreError> {
        let listed = loop {
            let listed = self.backend.list(&self.path).await?;
            let path = &self.path;
            if !discard_queued(&mut self.rx, |change| path.contains(&change.path)) {
                break listed;
            }
        };
        self.docs = Some(listed.iter().cloned().collect());
        Ok(listed)
    }

    fn listing(&self) -> Vec<(String, Record)> {
        self.docs
            .iter()
            .flatten()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }
}

/// Empties the receiver's queue.
///
/// Returns true when a discarded change was `relevant` or changes were lost
/// to lag, meaning the state just read may be older than the feed.
fn discard_queued(
    rx: &mut broadcast::Receiver<Change>,
    relevant: impl Fn(&Change) -> bool,
) -> bool {
    let mut stale = false;
    loop {
        match rx.try_recv() {
            Ok(change) => stale |= relevant(&change),
            Err(TryRecvError::Lagged(_)) => stale = true,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return stale,
        }
    }
}

/// Streams the current value of a document, then its value after every change.
///
/// `None` items mean the document is absent.
pub(crate) fn document_changes<T, C>(
    backend: Arc<dyn DocumentBackend>,
    path: DocumentPath,
    converter: Arc<C>,
) -> BoxStream<'static, Result<Option<T>, DocStoreError>>
where
    T: Send + 'static,
    C: Converter<T>,
{
    debug!(%path, "document subscription opened");
    let watch = DocumentWatch {
        rx: backend.watch(),
        backend,
        path,
        primed: false,
    };

    stream::unfold(Some((watch, converter)), |state| async move {
        let (mut watch, converter) = state?;
        let item = match watch.next().await? {
            Ok(record) => record
                .map(|record| decode(&*converter, &watch.path, record))
                .transpose(),
            Err(e) => Err(e),
        };
        let next = item.is_ok().then_some((watch, converter));
        Some((item, next))
    })
    .boxed()
}

/// Streams the documents of a collection ordered by id, re-emitting the
/// whole listing after every change to a direct child.
pub(crate) fn collection_changes<T, C>(
    backend: Arc<dyn DocumentBackend>,
    path: CollectionPath,
    converter: Arc<C>,
) -> BoxStream<'static, Result<Vec<Identified<T>>, DocStoreError>>
where
    T: Send + 'static,
    C: Converter<T>,
{
    debug!(%path, "collection subscription opened");
    let watch = CollectionWatch {
        rx: backend.watch(),
        backend,
        path,
        docs: None,
    };

    stream::unfold(Some((watch, converter)), |state| async move {
        let (mut watch, converter) = state?;
        let item = match watch.next().await? {
            Ok(listing) => identify(&*converter, &watch.path, listing),
            Err(e) => Err(e),
        };
        let next = item.is_ok().then_some((watch, converter));
        Some((item, next))
    })
    .boxed()
}

/// Converts a raw listing into id-tagged values.
pub(crate) fn identify<T, C>(
    converter: &C,
    collection: &CollectionPath,
    listing: Vec<(String, Record)>,
) -> Result<Vec<Identified<T>>, DocStoreError>
where
    C: Converter<T> + ?Sized,
{
    listing
        .into_iter()
        .map(|(id, record)| -> Result<Identified<T>, DocStoreError> {
            let data = decode(converter, &format_args!("{collection}/{id}"), record)?;
            Ok(Identified { id, data })
        })
        .collect()
}
