//! `shipments` collection access: CRUD, live views, aggregate statistics.

use std::sync::Arc;

use serde_json::json;

use stockroom_core::{DocumentId, DomainError, DomainResult};
use stockroom_store::{Document, DocumentStore, Query, Subscription, encode};

use crate::shipment::{NewShipment, Shipment, ShipmentDirection, ShipmentPatch, ShipmentStatus};

const COLLECTION: &str = "shipments";

/// Aggregate shipment statistics, reduced client-side from the full set
/// (the store offers no server-side aggregation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShipmentStats {
    pub total: usize,
    pub incoming: usize,
    pub outgoing: usize,
    pub pending: usize,
    pub in_transit: usize,
    pub total_value_cents: u64,
}

/// Shipment CRUD over the document store.
pub struct ShipmentRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ShipmentRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All shipments, newest first.
    pub fn get_all(&self) -> DomainResult<Vec<Shipment>> {
        let docs = self
            .store
            .query(COLLECTION, &Query::all().newest_first())
            .map_err(|e| {
                tracing::error!(error = %e, "listing shipments failed");
                DomainError::from(e)
            })?;
        docs.iter()
            .map(|d| d.decode().map_err(DomainError::from))
            .collect()
    }

    /// A single shipment; absence is `Ok(None)`, not an error.
    pub fn get_by_id(&self, id: DocumentId) -> DomainResult<Option<Shipment>> {
        let doc = self.store.get(COLLECTION, id).map_err(|e| {
            tracing::error!(error = %e, "fetching shipment failed");
            DomainError::from(e)
        })?;
        doc.map(|d| d.decode().map_err(DomainError::from)).transpose()
    }

    /// Create a shipment. The initial status is derived from the direction;
    /// both timestamps come from the store clock.
    pub fn create(&self, new: NewShipment) -> DomainResult<Shipment> {
        if new.reference.trim().is_empty() {
            return Err(DomainError::validation("reference cannot be empty"));
        }

        let mut data = encode(&new)?;
        data["status"] = json!(new.direction.initial_status());

        let doc = self.store.add(COLLECTION, data).map_err(|e| {
            tracing::error!(error = %e, "creating shipment failed");
            DomainError::from(e)
        })?;

        tracing::info!(shipment = %doc.id, direction = ?new.direction, "shipment created");
        Ok(doc.decode()?)
    }

    /// Partial update; `updated_at` is always refreshed by the store.
    pub fn update(&self, id: DocumentId, patch: ShipmentPatch) -> DomainResult<Shipment> {
        let doc = self
            .store
            .update(COLLECTION, id, encode(&patch)?)
            .map_err(|e| {
                tracing::error!(error = %e, "updating shipment failed");
                DomainError::from(e)
            })?;
        Ok(doc.decode()?)
    }

    /// Advance the lifecycle status (the only way it changes after creation).
    pub fn update_status(&self, id: DocumentId, status: ShipmentStatus) -> DomainResult<Shipment> {
        let doc = self
            .store
            .update(COLLECTION, id, json!({ "status": status }))
            .map_err(|e| {
                tracing::error!(error = %e, "shipment status change failed");
                DomainError::from(e)
            })?;
        tracing::info!(shipment = %id, status = ?status, "shipment status changed");
        Ok(doc.decode()?)
    }

    /// Hard delete; there is no tombstone.
    pub fn delete(&self, id: DocumentId) -> DomainResult<()> {
        self.store.delete(COLLECTION, id).map_err(|e| {
            tracing::error!(error = %e, "deleting shipment failed");
            DomainError::from(e)
        })
    }

    /// Live view over all shipments, newest first. Fires immediately with
    /// the current snapshot and again on every change; the caller owns the
    /// returned handle and must keep it alive for deliveries.
    pub fn subscribe(
        &self,
        listener: impl Fn(Vec<Shipment>) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe_query(Query::all().newest_first(), listener)
    }

    /// Live view over one direction only.
    pub fn subscribe_by_direction(
        &self,
        direction: ShipmentDirection,
        listener: impl Fn(Vec<Shipment>) + Send + Sync + 'static,
    ) -> Subscription {
        let query = Query::where_eq("direction", json!(direction)).newest_first();
        self.subscribe_query(query, listener)
    }

    fn subscribe_query(
        &self,
        query: Query,
        listener: impl Fn(Vec<Shipment>) + Send + Sync + 'static,
    ) -> Subscription {
        self.store.subscribe(
            COLLECTION,
            query,
            Arc::new(move |docs: &[Document]| {
                let shipments: Vec<Shipment> = docs
                    .iter()
                    .filter_map(|d| match d.decode() {
                        Ok(shipment) => Some(shipment),
                        Err(e) => {
                            tracing::warn!(error = %e, "skipping undecodable shipment document");
                            None
                        }
                    })
                    .collect();
                listener(shipments);
            }),
        )
    }

    /// Aggregate statistics over the full collection.
    pub fn stats(&self) -> DomainResult<ShipmentStats> {
        let shipments = self.get_all()?;

        let mut stats = ShipmentStats {
            total: shipments.len(),
            ..Default::default()
        };
        for s in &shipments {
            match s.direction {
                ShipmentDirection::Incoming => stats.incoming += 1,
                ShipmentDirection::Outgoing => stats.outgoing += 1,
            }
            match s.status {
                ShipmentStatus::Pending => stats.pending += 1,
                ShipmentStatus::InTransit => stats.in_transit += 1,
                _ => {}
            }
            stats.total_value_cents += s.value_cents;
        }

        Ok(stats)
    }
}
