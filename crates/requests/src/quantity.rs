//! Supplier quantity requests: the `quantity_requests` collection.

use serde::{Deserialize, Serialize};
use serde_json::json;

use stockroom_core::{DocumentId, DomainError, DomainResult, ProductId, UserId};
use stockroom_store::{DocumentStore, Query, ServerInstant, encode};

const COLLECTION: &str = "quantity_requests";

/// Lifecycle of a quantity request: pending until responded, terminal after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityRequestStatus {
    Pending,
    ApprovedFull,
    ApprovedPartial,
    Rejected,
}

impl QuantityRequestStatus {
    pub fn is_resolved(self) -> bool {
        self != QuantityRequestStatus::Pending
    }
}

/// A supplier's offer to deliver a quantity of a product.
///
/// `approved_quantity`, `responded_by` and `responded_at` are set together
/// when the request is resolved; an approved partial quantity never exceeds
/// the requested one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityRequest {
    pub id: DocumentId,
    pub created_at: ServerInstant,
    pub updated_at: ServerInstant,
    pub supplier_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    pub requested_quantity: u32,
    pub status: QuantityRequestStatus,
    pub approved_quantity: Option<u32>,
    pub responded_by: Option<UserId>,
    pub responded_at: Option<ServerInstant>,
    pub note: Option<String>,
}

/// Input for filing a quantity request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewQuantityRequest {
    pub supplier_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    pub requested_quantity: u32,
    pub note: Option<String>,
}

#[derive(Serialize)]
struct ResolutionPatch {
    status: QuantityRequestStatus,
    approved_quantity: Option<u32>,
    responded_by: UserId,
    responded_at: ServerInstant,
}

/// `quantity_requests` collection access.
pub struct QuantityRequestRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> QuantityRequestRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// File a request. Zero quantities are rejected here, so the approval
    /// workflow only ever sees positive requested amounts.
    pub fn create(&self, new: NewQuantityRequest) -> DomainResult<QuantityRequest> {
        if new.requested_quantity == 0 {
            return Err(DomainError::validation("requested quantity must be positive"));
        }
        if new.product_name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }

        let mut data = encode(&new)?;
        data["status"] = json!(QuantityRequestStatus::Pending);
        data["approved_quantity"] = json!(null);
        data["responded_by"] = json!(null);
        data["responded_at"] = json!(null);

        let doc = self.store.add(COLLECTION, data).map_err(|e| {
            tracing::error!(error = %e, "creating quantity request failed");
            DomainError::from(e)
        })?;

        tracing::info!(
            supplier = %new.supplier_id,
            product = %new.product_id,
            quantity = new.requested_quantity,
            "quantity request filed"
        );
        Ok(doc.decode()?)
    }

    pub fn get_by_id(&self, id: DocumentId) -> DomainResult<Option<QuantityRequest>> {
        let doc = self.store.get(COLLECTION, id).map_err(|e| {
            tracing::error!(error = %e, "fetching quantity request failed");
            DomainError::from(e)
        })?;
        doc.map(|d| d.decode().map_err(DomainError::from)).transpose()
    }

    /// Requests awaiting a response, oldest first.
    pub fn list_pending(&self) -> DomainResult<Vec<QuantityRequest>> {
        let query = Query::where_eq("status", json!(QuantityRequestStatus::Pending)).oldest_first();
        self.list(&query)
    }

    /// Everything a supplier has filed, newest first.
    pub fn list_for_supplier(&self, supplier_id: UserId) -> DomainResult<Vec<QuantityRequest>> {
        let query = Query::where_eq("supplier_id", json!(supplier_id)).newest_first();
        self.list(&query)
    }

    fn list(&self, query: &Query) -> DomainResult<Vec<QuantityRequest>> {
        let docs = self.store.query(COLLECTION, query).map_err(|e| {
            tracing::error!(error = %e, "listing quantity requests failed");
            DomainError::from(e)
        })?;
        docs.iter()
            .map(|d| d.decode().map_err(DomainError::from))
            .collect()
    }

    /// Persist a resolution. Callers go through the approval workflow, which
    /// owns the state-machine and quantity validation.
    pub(crate) fn resolve(
        &self,
        id: DocumentId,
        status: QuantityRequestStatus,
        approved_quantity: Option<u32>,
        responded_by: UserId,
        responded_at: ServerInstant,
    ) -> DomainResult<QuantityRequest> {
        let patch = ResolutionPatch {
            status,
            approved_quantity,
            responded_by,
            responded_at,
        };

        let doc = self
            .store
            .update(COLLECTION, id, encode(&patch)?)
            .map_err(|e| {
                tracing::error!(error = %e, "resolving quantity request failed");
                DomainError::from(e)
            })?;
        Ok(doc.decode()?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockroom_store::InMemoryStore;

    use super::*;

    fn repo() -> (Arc<InMemoryStore>, QuantityRequestRepository<Arc<InMemoryStore>>) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), QuantityRequestRepository::new(store))
    }

    fn bolts(quantity: u32) -> NewQuantityRequest {
        NewQuantityRequest {
            supplier_id: UserId::new(),
            product_id: ProductId::new(),
            product_name: "Hex bolts M8".to_string(),
            requested_quantity: quantity,
            note: None,
        }
    }

    #[test]
    fn filed_requests_start_pending_and_unapproved() {
        let (_store, repo) = repo();
        let request = repo.create(bolts(50)).unwrap();

        assert_eq!(request.status, QuantityRequestStatus::Pending);
        assert_eq!(request.approved_quantity, None);
        assert_eq!(request.responded_by, None);
        assert_eq!(request.responded_at, None);
    }

    #[test]
    fn zero_quantity_is_rejected_at_creation() {
        let (_store, repo) = repo();
        assert!(matches!(
            repo.create(bolts(0)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn pending_listing_excludes_resolved_requests() {
        let (store, repo) = repo();
        let first = repo.create(bolts(10)).unwrap();
        let second = repo.create(bolts(20)).unwrap();

        repo.resolve(
            first.id,
            QuantityRequestStatus::Rejected,
            None,
            UserId::new(),
            store.server_instant(),
        )
        .unwrap();

        let pending = repo.list_pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);
    }

    #[test]
    fn supplier_listing_is_scoped() {
        let (_store, repo) = repo();
        let mine = bolts(10);
        let supplier = mine.supplier_id;
        repo.create(mine).unwrap();
        repo.create(bolts(20)).unwrap();

        let listed = repo.list_for_supplier(supplier).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].supplier_id, supplier);
    }
}
