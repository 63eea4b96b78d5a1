//! `inventory` collection access.

use serde_json::json;

use stockroom_core::{DocumentId, DomainError, DomainResult, ProductId};
use stockroom_store::{Document, DocumentStore, Query, Subscription, encode};

use crate::item::{InventoryItem, NewInventoryItem, StockStatus};

const COLLECTION: &str = "inventory";

/// Stock record CRUD over the document store.
pub struct InventoryRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> InventoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn get_all(&self) -> DomainResult<Vec<InventoryItem>> {
        let docs = self
            .store
            .query(COLLECTION, &Query::all().newest_first())
            .map_err(|e| {
                tracing::error!(error = %e, "listing inventory failed");
                DomainError::from(e)
            })?;
        docs.iter()
            .map(|d| d.decode().map_err(DomainError::from))
            .collect()
    }

    pub fn get_by_id(&self, id: DocumentId) -> DomainResult<Option<InventoryItem>> {
        let doc = self.store.get(COLLECTION, id).map_err(|e| {
            tracing::error!(error = %e, "fetching inventory item failed");
            DomainError::from(e)
        })?;
        doc.map(|d| d.decode().map_err(DomainError::from)).transpose()
    }

    /// The stock record for a product, if one exists. Each product has at
    /// most one record.
    pub fn find_by_product(&self, product_id: ProductId) -> DomainResult<Option<InventoryItem>> {
        let query = Query::where_eq("product_id", json!(product_id));
        let docs = self.store.query(COLLECTION, &query).map_err(|e| {
            tracing::error!(error = %e, "inventory lookup failed");
            DomainError::from(e)
        })?;
        docs.first()
            .map(|d| d.decode().map_err(DomainError::from))
            .transpose()
    }

    /// Create a stock record; the status is derived from quantity and the
    /// low-stock threshold.
    pub fn create(&self, new: NewInventoryItem) -> DomainResult<InventoryItem> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if new.min_stock_level < 0 || new.max_stock_level < new.min_stock_level {
            return Err(DomainError::validation("invalid stock thresholds"));
        }

        let status = StockStatus::derive(new.quantity, new.min_stock_level);
        let mut data = encode(&new)?;
        data["status"] = json!(status);

        let doc = self.store.add(COLLECTION, data).map_err(|e| {
            tracing::error!(error = %e, "creating inventory item failed");
            DomainError::from(e)
        })?;

        tracing::info!(product = %new.product_id, quantity = new.quantity, "inventory item created");
        Ok(doc.decode()?)
    }

    /// Replace the quantity and recompute the status.
    pub fn set_quantity(&self, id: DocumentId, quantity: i64) -> DomainResult<InventoryItem> {
        let current = self.get_by_id(id)?.ok_or(DomainError::NotFound)?;
        let status = StockStatus::derive(quantity, current.min_stock_level);

        let doc = self
            .store
            .update(COLLECTION, id, json!({ "quantity": quantity, "status": status }))
            .map_err(|e| {
                tracing::error!(error = %e, "quantity update failed");
                DomainError::from(e)
            })?;
        Ok(doc.decode()?)
    }

    /// Add (or, with a negative delta, remove) stock and recompute status.
    ///
    /// This is a client-side read-modify-write: two concurrent calls for the
    /// same record race, and the later write wins with the earlier increment
    /// lost.
    pub fn add_stock(&self, id: DocumentId, delta: i64) -> DomainResult<InventoryItem> {
        let current = self.get_by_id(id)?.ok_or(DomainError::NotFound)?;
        self.set_quantity(id, current.quantity + delta)
    }

    pub fn set_published(&self, id: DocumentId, published: bool) -> DomainResult<InventoryItem> {
        let doc = self
            .store
            .update(COLLECTION, id, json!({ "published": published }))
            .map_err(|e| {
                tracing::error!(error = %e, "publish toggle failed");
                DomainError::from(e)
            })?;
        Ok(doc.decode()?)
    }

    /// Mark the item discontinued. The status stays until a quantity change
    /// recomputes it.
    pub fn discontinue(&self, id: DocumentId) -> DomainResult<InventoryItem> {
        let doc = self
            .store
            .update(COLLECTION, id, json!({ "status": StockStatus::Discontinued }))
            .map_err(|e| {
                tracing::error!(error = %e, "discontinue failed");
                DomainError::from(e)
            })?;
        Ok(doc.decode()?)
    }

    pub fn delete(&self, id: DocumentId) -> DomainResult<()> {
        self.store.delete(COLLECTION, id).map_err(|e| {
            tracing::error!(error = %e, "deleting inventory item failed");
            DomainError::from(e)
        })
    }

    /// Live catalog view: published items only. Fires immediately with the
    /// current snapshot and on every inventory change; the caller owns the
    /// returned handle.
    pub fn subscribe_published(
        &self,
        listener: impl Fn(Vec<InventoryItem>) + Send + Sync + 'static,
    ) -> Subscription {
        let query = Query::where_eq("published", json!(true)).newest_first();
        self.store.subscribe(
            COLLECTION,
            query,
            std::sync::Arc::new(move |docs: &[Document]| {
                let items: Vec<InventoryItem> = docs
                    .iter()
                    .filter_map(|d| match d.decode() {
                        Ok(item) => Some(item),
                        Err(e) => {
                            tracing::warn!(error = %e, "skipping undecodable inventory document");
                            None
                        }
                    })
                    .collect();
                listener(items);
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use stockroom_store::InMemoryStore;

    use super::*;

    fn repo() -> InventoryRepository<Arc<InMemoryStore>> {
        InventoryRepository::new(Arc::new(InMemoryStore::new()))
    }

    fn widget(quantity: i64) -> NewInventoryItem {
        NewInventoryItem {
            product_id: ProductId::new(),
            name: "Widget".to_string(),
            category: "hardware".to_string(),
            quantity,
            min_stock_level: 10,
            max_stock_level: 200,
            unit_price_cents: 1_250,
            location: "aisle 3".to_string(),
            published: false,
        }
    }

    #[test]
    fn create_derives_status_from_quantity() {
        let repo = repo();
        assert_eq!(repo.create(widget(100)).unwrap().status, StockStatus::InStock);
        assert_eq!(repo.create(widget(10)).unwrap().status, StockStatus::LowStock);
        assert_eq!(repo.create(widget(0)).unwrap().status, StockStatus::OutOfStock);
    }

    #[test]
    fn find_by_product_matches_exactly_one_record() {
        let repo = repo();
        let created = repo.create(widget(5)).unwrap();
        repo.create(widget(7)).unwrap();

        let found = repo.find_by_product(created.product_id).unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_product(ProductId::new()).unwrap().is_none());
    }

    #[test]
    fn quantity_changes_recompute_status() {
        let repo = repo();
        let item = repo.create(widget(100)).unwrap();

        let item = repo.set_quantity(item.id, 3).unwrap();
        assert_eq!(item.status, StockStatus::LowStock);

        let item = repo.add_stock(item.id, -3).unwrap();
        assert_eq!(item.quantity, 0);
        assert_eq!(item.status, StockStatus::OutOfStock);

        let item = repo.add_stock(item.id, 50).unwrap();
        assert_eq!(item.quantity, 50);
        assert_eq!(item.status, StockStatus::InStock);
    }

    #[test]
    fn discontinued_survives_until_quantity_change() {
        let repo = repo();
        let item = repo.create(widget(100)).unwrap();

        let item = repo.discontinue(item.id).unwrap();
        assert_eq!(item.status, StockStatus::Discontinued);

        let item = repo.set_quantity(item.id, 100).unwrap();
        assert_eq!(item.status, StockStatus::InStock);
    }

    #[test]
    fn published_subscription_tracks_the_catalog() {
        let repo = repo();
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

        let _sub = {
            let seen = seen.clone();
            repo.subscribe_published(move |items| {
                seen.lock().unwrap().push(items.len());
            })
        };

        let item = repo.create(widget(5)).unwrap();
        repo.set_published(item.id, true).unwrap();
        repo.set_published(item.id, false).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 0, 1, 0]);
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let repo = repo();
        let mut bad = widget(10);
        bad.max_stock_level = 5;
        assert!(matches!(
            repo.create(bad),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn missing_item_is_not_found() {
        let repo = repo();
        assert_eq!(repo.add_stock(DocumentId::new(), 1), Err(DomainError::NotFound));
    }
}
