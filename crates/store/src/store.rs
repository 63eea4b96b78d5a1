//! Document store contract (mechanics only).
//!
//! The trait captures the primitive operations the original system performs
//! against its managed document database: single-document CRUD with
//! store-assigned ids and timestamps, equality/order collection queries, and
//! live snapshot subscriptions. Repositories depend only on this contract,
//! never on a concrete backend; the store client is passed into each
//! repository's constructor.
//!
//! ## Delivery semantics
//!
//! Subscriptions deliver the **full matching snapshot** on every change, not
//! incremental diffs. Each subscription owns an independent listener
//! registration released by its handle; an unreleased handle leaks the
//! listener for the lifetime of the store.
//!
//! ## Consistency
//!
//! Per-document last-write-wins. There is no cross-document atomicity:
//! callers performing multi-document flows (e.g. request update followed by
//! an inventory upsert) can observe partial failure.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

use stockroom_core::{DocumentId, DomainError};

use crate::document::{Document, ServerInstant};
use crate::query::Query;

/// Store operation error.
///
/// These are infrastructure failures (missing document, malformed write,
/// wire serialization, backend rejection) as opposed to domain errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,

    /// The write payload is unacceptable (non-object, reserved fields).
    #[error("invalid write: {0}")]
    InvalidWrite(String),

    /// (De)serialization at the store boundary failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The backend rejected the operation (connectivity, permissions,
    /// internal state).
    #[error("backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn invalid_write(msg: impl Into<String>) -> Self {
        Self::InvalidWrite(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => DomainError::NotFound,
            other => DomainError::remote(other.to_string()),
        }
    }
}

/// Snapshot listener: invoked with the full matching set after every change
/// (and once at registration with the current state).
pub type SnapshotListener = Arc<dyn Fn(&[Document]) + Send + Sync>;

/// Handle for a live listener registration.
///
/// The listener stays registered until `unsubscribe()` is called or the
/// handle is dropped. Callers must keep the handle alive for as long as
/// they want deliveries.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Release the listener registration.
    pub fn unsubscribe(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

/// Collection-organized document store.
pub trait DocumentStore: Send + Sync {
    /// Store a new document; the store assigns the id and both timestamps.
    fn add(&self, collection: &str, data: JsonValue) -> Result<Document, StoreError>;

    /// Fetch a single document. Absence is `Ok(None)`, not an error.
    fn get(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// Fetch all documents matching the query.
    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Shallow-merge `patch` into the document's payload and refresh
    /// `updated_at`. Fails with [`StoreError::NotFound`] if absent.
    fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: JsonValue,
    ) -> Result<Document, StoreError>;

    /// Hard delete. Fails with [`StoreError::NotFound`] if absent.
    fn delete(&self, collection: &str, id: DocumentId) -> Result<(), StoreError>;

    /// Register a live listener scoped to `query`. Fires once immediately
    /// with the current snapshot, then on every subsequent write to the
    /// collection.
    fn subscribe(&self, collection: &str, query: Query, listener: SnapshotListener)
    -> Subscription;

    /// Allocate an instant from the store clock, for payload fields that
    /// must carry server-assigned time (e.g. response timestamps).
    fn server_instant(&self) -> ServerInstant;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn add(&self, collection: &str, data: JsonValue) -> Result<Document, StoreError> {
        (**self).add(collection, data)
    }

    fn get(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError> {
        (**self).get(collection, id)
    }

    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        (**self).query(collection, query)
    }

    fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: JsonValue,
    ) -> Result<Document, StoreError> {
        (**self).update(collection, id, patch)
    }

    fn delete(&self, collection: &str, id: DocumentId) -> Result<(), StoreError> {
        (**self).delete(collection, id)
    }

    fn subscribe(
        &self,
        collection: &str,
        query: Query,
        listener: SnapshotListener,
    ) -> Subscription {
        (**self).subscribe(collection, query, listener)
    }

    fn server_instant(&self) -> ServerInstant {
        (**self).server_instant()
    }
}
