//! Supplier display requests: the `display_requests` collection.
//!
//! A display request is the first step of the supplier pipeline: once
//! accepted, the supplier files a quantity request for the listed product
//! and the two records are linked.

use serde::{Deserialize, Serialize};
use serde_json::json;

use stockroom_core::{DocumentId, DomainError, DomainResult, ProductId, UserId};
use stockroom_store::{DocumentStore, Query, ServerInstant, encode};

const COLLECTION: &str = "display_requests";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl DisplayRequestStatus {
    pub fn is_resolved(self) -> bool {
        self != DisplayRequestStatus::Pending
    }
}

/// Response to a pending display request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayDecision {
    Accept,
    Reject,
}

/// A supplier's request to list a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRequest {
    pub id: DocumentId,
    pub created_at: ServerInstant,
    pub updated_at: ServerInstant,
    pub supplier_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    pub status: DisplayRequestStatus,
    /// Set once the supplier files the follow-up quantity request.
    pub quantity_request_id: Option<DocumentId>,
    pub responded_by: Option<UserId>,
    pub responded_at: Option<ServerInstant>,
}

/// Input for filing a display request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDisplayRequest {
    pub supplier_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
}

/// `display_requests` collection access.
pub struct DisplayRequestRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> DisplayRequestRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create(&self, new: NewDisplayRequest) -> DomainResult<DisplayRequest> {
        if new.product_name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }

        let mut data = encode(&new)?;
        data["status"] = json!(DisplayRequestStatus::Pending);
        data["quantity_request_id"] = json!(null);
        data["responded_by"] = json!(null);
        data["responded_at"] = json!(null);

        let doc = self.store.add(COLLECTION, data).map_err(|e| {
            tracing::error!(error = %e, "creating display request failed");
            DomainError::from(e)
        })?;

        tracing::info!(supplier = %new.supplier_id, product = %new.product_id, "display request filed");
        Ok(doc.decode()?)
    }

    pub fn get_by_id(&self, id: DocumentId) -> DomainResult<Option<DisplayRequest>> {
        let doc = self.store.get(COLLECTION, id).map_err(|e| {
            tracing::error!(error = %e, "fetching display request failed");
            DomainError::from(e)
        })?;
        doc.map(|d| d.decode().map_err(DomainError::from)).transpose()
    }

    /// Requests awaiting a response, oldest first.
    pub fn list_pending(&self) -> DomainResult<Vec<DisplayRequest>> {
        let query = Query::where_eq("status", json!(DisplayRequestStatus::Pending)).oldest_first();
        let docs = self.store.query(COLLECTION, &query).map_err(|e| {
            tracing::error!(error = %e, "listing display requests failed");
            DomainError::from(e)
        })?;
        docs.iter()
            .map(|d| d.decode().map_err(DomainError::from))
            .collect()
    }

    /// Accept or reject a pending request. Terminal once resolved: a second
    /// response fails with NotFound like an absent id.
    pub fn respond(
        &self,
        id: DocumentId,
        decision: DisplayDecision,
        responded_by: UserId,
    ) -> DomainResult<DisplayRequest> {
        let request = self.get_by_id(id)?.ok_or(DomainError::NotFound)?;
        if request.status.is_resolved() {
            tracing::info!(request = %id, "display request already resolved");
            return Err(DomainError::NotFound);
        }

        let status = match decision {
            DisplayDecision::Accept => DisplayRequestStatus::Accepted,
            DisplayDecision::Reject => DisplayRequestStatus::Rejected,
        };

        let doc = self
            .store
            .update(
                COLLECTION,
                id,
                json!({
                    "status": status,
                    "responded_by": responded_by,
                    "responded_at": self.store.server_instant(),
                }),
            )
            .map_err(|e| {
                tracing::error!(error = %e, "responding to display request failed");
                DomainError::from(e)
            })?;

        tracing::info!(request = %id, status = ?status, "display request resolved");
        Ok(doc.decode()?)
    }

    /// Record the follow-up quantity request on an accepted display request.
    pub fn link_quantity_request(
        &self,
        id: DocumentId,
        quantity_request_id: DocumentId,
    ) -> DomainResult<DisplayRequest> {
        let request = self.get_by_id(id)?.ok_or(DomainError::NotFound)?;
        if request.status != DisplayRequestStatus::Accepted {
            return Err(DomainError::validation(
                "only accepted display requests can be linked to a quantity request",
            ));
        }

        let doc = self
            .store
            .update(
                COLLECTION,
                id,
                json!({ "quantity_request_id": quantity_request_id }),
            )
            .map_err(|e| {
                tracing::error!(error = %e, "linking display request failed");
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

    fn repo() -> DisplayRequestRepository<Arc<InMemoryStore>> {
        DisplayRequestRepository::new(Arc::new(InMemoryStore::new()))
    }

    fn listing() -> NewDisplayRequest {
        NewDisplayRequest {
            supplier_id: UserId::new(),
            product_id: ProductId::new(),
            product_name: "Hex bolts M8".to_string(),
        }
    }

    #[test]
    fn accept_records_responder_and_instant() {
        let repo = repo();
        let request = repo.create(listing()).unwrap();
        let admin = UserId::new();

        let request = repo.respond(request.id, DisplayDecision::Accept, admin).unwrap();
        assert_eq!(request.status, DisplayRequestStatus::Accepted);
        assert_eq!(request.responded_by, Some(admin));
        assert!(request.responded_at.is_some());
    }

    #[test]
    fn second_response_fails_like_an_absent_request() {
        let repo = repo();
        let request = repo.create(listing()).unwrap();

        repo.respond(request.id, DisplayDecision::Reject, UserId::new()).unwrap();
        let result = repo.respond(request.id, DisplayDecision::Accept, UserId::new());
        assert_eq!(result, Err(DomainError::NotFound));
    }

    #[test]
    fn linking_requires_acceptance() {
        let repo = repo();
        let request = repo.create(listing()).unwrap();

        let result = repo.link_quantity_request(request.id, DocumentId::new());
        assert!(matches!(result, Err(DomainError::Validation(_))));

        repo.respond(request.id, DisplayDecision::Accept, UserId::new()).unwrap();
        let linked_to = DocumentId::new();
        let request = repo.link_quantity_request(request.id, linked_to).unwrap();
        assert_eq!(request.quantity_request_id, Some(linked_to));
    }

    #[test]
    fn pending_listing_is_oldest_first() {
        let repo = repo();
        let first = repo.create(listing()).unwrap();
        let second = repo.create(listing()).unwrap();

        let pending = repo.list_pending().unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, first.id);
        assert_eq!(pending[1].id, second.id);
    }
}
