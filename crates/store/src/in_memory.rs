//! In-memory document store for tests/dev.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use serde_json::Value as JsonValue;

use stockroom_core::DocumentId;

use crate::document::{Document, RESERVED_FIELDS, ServerInstant};
use crate::query::{CreatedOrder, Query};
use crate::store::{DocumentStore, SnapshotListener, StoreError, Subscription};

struct Listener {
    id: u64,
    collection: String,
    query: Query,
    callback: SnapshotListener,
}

/// In-memory document store.
///
/// - No IO / no async
/// - Listeners are invoked synchronously on each write
/// - Not optimized for performance (per-collection linear scans)
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    listeners: Mutex<Vec<Listener>>,
    clock: AtomicU64,
    next_listener_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&self) -> ServerInstant {
        let seq = self.inner.clock.fetch_add(1, Ordering::SeqCst) + 1;
        ServerInstant::new(seq, Utc::now())
    }

    fn validated_payload(data: &JsonValue) -> Result<(), StoreError> {
        let Some(map) = data.as_object() else {
            return Err(StoreError::invalid_write("payload must be a JSON object"));
        };
        for key in RESERVED_FIELDS {
            if map.contains_key(key) {
                return Err(StoreError::invalid_write(format!(
                    "payload must not contain reserved field '{key}'"
                )));
            }
        }
        Ok(())
    }

    fn snapshot(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self
            .inner
            .collections
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;

        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| query.matches(&d.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        match query.order {
            CreatedOrder::Unordered => {}
            CreatedOrder::OldestFirst => docs.sort_by_key(|d| d.created_at),
            CreatedOrder::NewestFirst => {
                docs.sort_by_key(|d| d.created_at);
                docs.reverse();
            }
        }

        Ok(docs)
    }

    /// Deliver fresh snapshots to every listener on `collection`.
    ///
    /// The listener list is cloned before invocation so callbacks may
    /// re-enter the store (including subscribing/unsubscribing).
    fn notify(&self, collection: &str) {
        let interested: Vec<(Query, SnapshotListener)> = match self.inner.listeners.lock() {
            Ok(listeners) => listeners
                .iter()
                .filter(|l| l.collection == collection)
                .map(|l| (l.query.clone(), l.callback.clone()))
                .collect(),
            Err(_) => return,
        };

        for (query, callback) in interested {
            match self.snapshot(collection, &query) {
                Ok(snapshot) => callback(&snapshot),
                Err(e) => tracing::warn!(collection, error = %e, "dropping snapshot delivery"),
            }
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            inner: Arc::new(Inner::default()),
        }
    }
}

impl DocumentStore for InMemoryStore {
    fn add(&self, collection: &str, data: JsonValue) -> Result<Document, StoreError> {
        Self::validated_payload(&data)?;

        let now = self.tick();
        let doc = Document {
            id: DocumentId::new(),
            created_at: now,
            updated_at: now,
            data,
        };

        {
            let mut collections = self
                .inner
                .collections
                .write()
                .map_err(|_| StoreError::backend("lock poisoned"))?;
            collections
                .entry(collection.to_string())
                .or_default()
                .push(doc.clone());
        }

        self.notify(collection);
        Ok(doc)
    }

    fn get(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError> {
        let collections = self
            .inner
            .collections
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.snapshot(collection, query)
    }

    fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: JsonValue,
    ) -> Result<Document, StoreError> {
        Self::validated_payload(&patch)?;

        let updated = {
            let mut collections = self
                .inner
                .collections
                .write()
                .map_err(|_| StoreError::backend("lock poisoned"))?;

            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or(StoreError::NotFound)?;

            // Shallow field merge; `add` guarantees the payload is an object.
            if let (Some(target), Some(fields)) = (doc.data.as_object_mut(), patch.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }

            doc.updated_at = {
                let seq = self.inner.clock.fetch_add(1, Ordering::SeqCst) + 1;
                ServerInstant::new(seq, Utc::now())
            };
            doc.clone()
        };

        self.notify(collection);
        Ok(updated)
    }

    fn delete(&self, collection: &str, id: DocumentId) -> Result<(), StoreError> {
        {
            let mut collections = self
                .inner
                .collections
                .write()
                .map_err(|_| StoreError::backend("lock poisoned"))?;

            let docs = collections.get_mut(collection).ok_or(StoreError::NotFound)?;
            let position = docs
                .iter()
                .position(|d| d.id == id)
                .ok_or(StoreError::NotFound)?;
            docs.remove(position);
        }

        self.notify(collection);
        Ok(())
    }

    fn subscribe(
        &self,
        collection: &str,
        query: Query,
        listener: SnapshotListener,
    ) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::SeqCst);

        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push(Listener {
                id,
                collection: collection.to_string(),
                query: query.clone(),
                callback: listener.clone(),
            });
        }

        // Initial delivery: current state, before any further change.
        match self.snapshot(collection, &query) {
            Ok(snapshot) => listener(&snapshot),
            Err(e) => tracing::warn!(collection, error = %e, "dropping initial snapshot"),
        }

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut listeners) = inner.listeners.lock() {
                    listeners.retain(|l| l.id != id);
                }
            }
        })
    }

    fn server_instant(&self) -> ServerInstant {
        self.tick()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[test]
    fn add_then_get_round_trips() {
        let store = InMemoryStore::new();
        let doc = store.add("things", json!({"name": "crate", "count": 3})).unwrap();

        let fetched = store.get("things", doc.id).unwrap().unwrap();
        assert_eq!(fetched, doc);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[test]
    fn get_absent_is_none_not_error() {
        let store = InMemoryStore::new();
        assert!(store.get("things", DocumentId::new()).unwrap().is_none());
    }

    #[test]
    fn reserved_fields_are_rejected() {
        let store = InMemoryStore::new();
        let err = store.add("things", json!({"id": "x"})).unwrap_err();
        assert!(matches!(err, StoreError::InvalidWrite(_)));

        let doc = store.add("things", json!({"name": "a"})).unwrap();
        let err = store
            .update("things", doc.id, json!({"created_at": 1}))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidWrite(_)));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let store = InMemoryStore::new();
        let err = store.add("things", json!(42)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidWrite(_)));
    }

    #[test]
    fn update_merges_fields_and_refreshes_updated_at() {
        let store = InMemoryStore::new();
        let doc = store.add("things", json!({"name": "a", "count": 1})).unwrap();

        let updated = store.update("things", doc.id, json!({"count": 2})).unwrap();
        assert_eq!(updated.data, json!({"name": "a", "count": 2}));
        assert!(updated.updated_at > doc.updated_at);
        assert_eq!(updated.created_at, doc.created_at);
    }

    #[test]
    fn update_absent_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .update("things", DocumentId::new(), json!({"x": 1}))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn delete_removes_and_second_delete_fails() {
        let store = InMemoryStore::new();
        let doc = store.add("things", json!({"name": "a"})).unwrap();

        store.delete("things", doc.id).unwrap();
        assert!(store.get("things", doc.id).unwrap().is_none());
        assert!(matches!(
            store.delete("things", doc.id).unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[test]
    fn query_filters_and_orders_by_creation() {
        let store = InMemoryStore::new();
        store.add("things", json!({"kind": "a", "n": 1})).unwrap();
        store.add("things", json!({"kind": "b", "n": 2})).unwrap();
        store.add("things", json!({"kind": "a", "n": 3})).unwrap();

        let all = store
            .query("things", &Query::all().newest_first())
            .unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].created_at > all[1].created_at);
        assert!(all[1].created_at > all[2].created_at);

        let kind_a = store
            .query("things", &Query::where_eq("kind", json!("a")).oldest_first())
            .unwrap();
        assert_eq!(kind_a.len(), 2);
        assert_eq!(kind_a[0].data["n"], json!(1));
        assert_eq!(kind_a[1].data["n"], json!(3));
    }

    #[test]
    fn subscribe_fires_immediately_and_on_each_change() {
        let store = InMemoryStore::new();
        store.add("things", json!({"kind": "a"})).unwrap();

        let deliveries = Arc::new(AtomicUsize::new(0));
        let last_len = Arc::new(AtomicUsize::new(usize::MAX));

        let sub = {
            let deliveries = deliveries.clone();
            let last_len = last_len.clone();
            store.subscribe(
                "things",
                Query::all(),
                Arc::new(move |snapshot| {
                    deliveries.fetch_add(1, Ordering::SeqCst);
                    last_len.store(snapshot.len(), Ordering::SeqCst);
                }),
            )
        };

        assert_eq!(deliveries.load(Ordering::SeqCst), 1);
        assert_eq!(last_len.load(Ordering::SeqCst), 1);

        store.add("things", json!({"kind": "b"})).unwrap();
        assert_eq!(deliveries.load(Ordering::SeqCst), 2);
        assert_eq!(last_len.load(Ordering::SeqCst), 2);

        sub.unsubscribe();
        store.add("things", json!({"kind": "c"})).unwrap();
        assert_eq!(deliveries.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn filtered_subscription_sees_matching_snapshot_only() {
        let store = InMemoryStore::new();
        let seen = Arc::new(AtomicUsize::new(usize::MAX));

        let _sub = {
            let seen = seen.clone();
            store.subscribe(
                "things",
                Query::where_eq("kind", json!("a")),
                Arc::new(move |snapshot| {
                    seen.store(snapshot.len(), Ordering::SeqCst);
                }),
            )
        };
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        store.add("things", json!({"kind": "b"})).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        store.add("things", json!({"kind": "a"})).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_the_handle_detaches_the_listener() {
        let store = InMemoryStore::new();
        let deliveries = Arc::new(AtomicUsize::new(0));

        {
            let deliveries = deliveries.clone();
            let _sub = store.subscribe(
                "things",
                Query::all(),
                Arc::new(move |_| {
                    deliveries.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        store.add("things", json!({"kind": "a"})).unwrap();
        // Only the initial delivery happened.
        assert_eq!(deliveries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn server_instants_are_monotonic() {
        let store = InMemoryStore::new();
        let a = store.server_instant();
        let b = store.server_instant();
        let doc = store.add("things", json!({"n": 1})).unwrap();
        assert!(a < b);
        assert!(b < doc.created_at);
    }
}
