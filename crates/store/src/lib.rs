//! `stockroom-store` — the document-store abstraction.
//!
//! Every entity in the system lives as a schemaless document in a remote,
//! collection-organized store. This crate defines the primitive operations
//! the rest of the workspace depends on (add, get, query, partial update,
//! delete, live snapshot subscription, server-assigned instants) and an
//! in-memory backend used by tests, examples and local development.

pub mod document;
pub mod in_memory;
pub mod query;
pub mod store;

pub use document::{Document, ServerInstant, encode};
pub use in_memory::InMemoryStore;
pub use query::{CreatedOrder, FieldEq, Query};
pub use store::{DocumentStore, SnapshotListener, StoreError, Subscription};
