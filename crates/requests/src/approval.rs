//! Quantity-request approval: the bridge from supplier requests to stock.

use stockroom_core::{DocumentId, DomainError, DomainResult, UserId};
use stockroom_store::DocumentStore;

use stockroom_inventory::{
    InventoryItem, InventoryRepository, NewInventoryItem, default_thresholds,
};

use crate::quantity::{QuantityRequest, QuantityRequestRepository, QuantityRequestStatus};

/// Placeholder fields for stock created straight from an approval; curation
/// happens later in the inventory screens.
const DEFAULT_CATEGORY: &str = "uncategorized";
const DEFAULT_LOCATION: &str = "unassigned";

/// Warehouse-side response to a pending quantity request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// Approve the full requested quantity.
    ApproveFull,
    /// Approve a smaller delivery; must be positive and at most the
    /// requested quantity.
    ApprovePartial { approved_quantity: u32 },
    Reject,
}

/// What an approval did to the inventory.
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalOutcome {
    /// The request was rejected; inventory untouched.
    Rejected(QuantityRequest),
    /// First stock for this product: a record was created.
    InventoryCreated(QuantityRequest, InventoryItem),
    /// The product already had stock: its quantity was incremented.
    StockIncreased(QuantityRequest, InventoryItem),
}

/// Turns a response to a pending quantity request into the matching
/// inventory mutation.
///
/// State machine: pending → {approved_full, approved_partial, rejected},
/// terminal once resolved.
///
/// The request update and the inventory upsert are two independent writes
/// with no cross-document transaction; if the second fails the first is not
/// rolled back. The inventory increment itself is a read-modify-write, so
/// two concurrent approvals for the same product can lose one increment.
pub struct ApprovalWorkflow<S: DocumentStore> {
    store: S,
    requests: QuantityRequestRepository<S>,
    inventory: InventoryRepository<S>,
}

impl<S: DocumentStore + Clone> ApprovalWorkflow<S> {
    pub fn new(store: S) -> Self {
        Self {
            requests: QuantityRequestRepository::new(store.clone()),
            inventory: InventoryRepository::new(store.clone()),
            store,
        }
    }

    pub fn requests(&self) -> &QuantityRequestRepository<S> {
        &self.requests
    }

    pub fn inventory(&self) -> &InventoryRepository<S> {
        &self.inventory
    }

    /// Respond to a pending request.
    ///
    /// Fails with NotFound when the id is absent **or the request is already
    /// resolved**, and with a validation error for an out-of-range partial
    /// quantity. Validation happens before any write, so a failed response
    /// leaves both collections untouched.
    pub fn respond(
        &self,
        request_id: DocumentId,
        decision: ApprovalDecision,
        responded_by: UserId,
    ) -> DomainResult<ApprovalOutcome> {
        let request = self
            .requests
            .get_by_id(request_id)?
            .ok_or(DomainError::NotFound)?;

        if request.status.is_resolved() {
            tracing::info!(request = %request_id, status = ?request.status, "quantity request already resolved");
            return Err(DomainError::NotFound);
        }

        let (status, approved_quantity) = match decision {
            ApprovalDecision::ApproveFull => (
                QuantityRequestStatus::ApprovedFull,
                Some(request.requested_quantity),
            ),
            ApprovalDecision::ApprovePartial { approved_quantity } => {
                if approved_quantity == 0 {
                    return Err(DomainError::validation("approved quantity must be positive"));
                }
                if approved_quantity > request.requested_quantity {
                    return Err(DomainError::validation(format!(
                        "approved quantity {} exceeds requested {}",
                        approved_quantity, request.requested_quantity
                    )));
                }
                (QuantityRequestStatus::ApprovedPartial, Some(approved_quantity))
            }
            ApprovalDecision::Reject => (QuantityRequestStatus::Rejected, None),
        };

        let resolved = self.requests.resolve(
            request_id,
            status,
            approved_quantity,
            responded_by,
            self.store.server_instant(),
        )?;

        let Some(amount) = approved_quantity else {
            tracing::info!(request = %request_id, "quantity request rejected");
            return Ok(ApprovalOutcome::Rejected(resolved));
        };

        match self.inventory.find_by_product(resolved.product_id)? {
            Some(existing) => {
                let item = self.inventory.add_stock(existing.id, i64::from(amount))?;
                tracing::info!(
                    request = %request_id,
                    product = %resolved.product_id,
                    added = amount,
                    quantity = item.quantity,
                    "stock incremented from approval"
                );
                Ok(ApprovalOutcome::StockIncreased(resolved, item))
            }
            None => {
                let quantity = i64::from(amount);
                let (min_stock_level, max_stock_level) = default_thresholds(quantity);
                let item = self.inventory.create(NewInventoryItem {
                    product_id: resolved.product_id,
                    name: resolved.product_name.clone(),
                    category: DEFAULT_CATEGORY.to_string(),
                    quantity,
                    min_stock_level,
                    max_stock_level,
                    unit_price_cents: 0,
                    location: DEFAULT_LOCATION.to_string(),
                    published: false,
                })?;
                tracing::info!(
                    request = %request_id,
                    product = %resolved.product_id,
                    quantity,
                    "inventory record created from approval"
                );
                Ok(ApprovalOutcome::InventoryCreated(resolved, item))
            }
        }
    }
}
