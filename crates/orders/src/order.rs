//! Orders: line items with computed totals and a status progression.
//!
//! Warehouse orders and customer orders share the same record shape and
//! live in separate collections; the repository is constructed per
//! collection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use stockroom_core::{DocumentId, DomainError, DomainResult, ProductId, UserId};
use stockroom_store::{Document, DocumentStore, Query, ServerInstant, Subscription, encode};

const ORDERS: &str = "orders";
const CUSTOMER_ORDERS: &str = "customer_orders";

/// Order progression. `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// A stored order line. `total_price_cents` is always
/// `quantity × unit_price_cents`, computed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_no: u32,
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price_cents: u64,
    pub total_price_cents: u64,
}

/// Input line: totals are derived, never supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
}

/// A line-itemed order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: DocumentId,
    pub created_at: ServerInstant,
    pub updated_at: ServerInstant,
    pub customer_id: Option<UserId>,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    /// Sum of the line totals.
    pub total_cents: u64,
}

/// Input for placing an order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_id: Option<UserId>,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Serialize)]
struct OrderRecord<'a> {
    customer_id: Option<UserId>,
    status: OrderStatus,
    lines: &'a [OrderLine],
    total_cents: u64,
}

/// Order collection access. One repository instance serves exactly one
/// collection; use [`OrderRepository::warehouse`] or
/// [`OrderRepository::customer`].
pub struct OrderRepository<S: DocumentStore> {
    store: S,
    collection: &'static str,
}

impl<S: DocumentStore> OrderRepository<S> {
    /// Internal warehouse orders.
    pub fn warehouse(store: S) -> Self {
        Self {
            store,
            collection: ORDERS,
        }
    }

    /// Storefront orders placed by customers.
    pub fn customer(store: S) -> Self {
        Self {
            store,
            collection: CUSTOMER_ORDERS,
        }
    }

    /// Place an order. Line totals and the order total are computed here;
    /// empty orders and zero-quantity lines are invalid.
    pub fn create(&self, new: NewOrder) -> DomainResult<Order> {
        if new.lines.is_empty() {
            return Err(DomainError::validation("an order needs at least one line"));
        }

        let mut lines = Vec::with_capacity(new.lines.len());
        let mut total_cents: u64 = 0;
        for (idx, line) in new.lines.into_iter().enumerate() {
            if line.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "line {} has zero quantity",
                    idx + 1
                )));
            }
            let line_total = u64::from(line.quantity) * line.unit_price_cents;
            total_cents += line_total;
            lines.push(OrderLine {
                line_no: idx as u32 + 1,
                product_id: line.product_id,
                name: line.name,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                total_price_cents: line_total,
            });
        }

        let record = OrderRecord {
            customer_id: new.customer_id,
            status: OrderStatus::Pending,
            lines: &lines,
            total_cents,
        };

        let doc = self
            .store
            .add(self.collection, encode(&record)?)
            .map_err(|e| {
                tracing::error!(error = %e, collection = self.collection, "creating order failed");
                DomainError::from(e)
            })?;

        tracing::info!(order = %doc.id, total_cents, lines = lines.len(), "order placed");
        Ok(doc.decode()?)
    }

    pub fn get_all(&self) -> DomainResult<Vec<Order>> {
        let docs = self
            .store
            .query(self.collection, &Query::all().newest_first())
            .map_err(|e| {
                tracing::error!(error = %e, collection = self.collection, "listing orders failed");
                DomainError::from(e)
            })?;
        docs.iter()
            .map(|d| d.decode().map_err(DomainError::from))
            .collect()
    }

    pub fn get_by_id(&self, id: DocumentId) -> DomainResult<Option<Order>> {
        let doc = self.store.get(self.collection, id).map_err(|e| {
            tracing::error!(error = %e, collection = self.collection, "fetching order failed");
            DomainError::from(e)
        })?;
        doc.map(|d| d.decode().map_err(DomainError::from)).transpose()
    }

    /// Advance the progression. Terminal orders refuse further transitions.
    pub fn update_status(&self, id: DocumentId, status: OrderStatus) -> DomainResult<Order> {
        let current = self.get_by_id(id)?.ok_or(DomainError::NotFound)?;
        if current.status.is_terminal() {
            return Err(DomainError::validation(format!(
                "order is already {:?}",
                current.status
            )));
        }

        let doc = self
            .store
            .update(self.collection, id, json!({ "status": status }))
            .map_err(|e| {
                tracing::error!(error = %e, "order status change failed");
                DomainError::from(e)
            })?;
        tracing::info!(order = %id, status = ?status, "order status changed");
        Ok(doc.decode()?)
    }

    /// Live view of one customer's orders, newest first.
    pub fn subscribe_by_customer(
        &self,
        customer_id: UserId,
        listener: impl Fn(Vec<Order>) + Send + Sync + 'static,
    ) -> Subscription {
        let query = Query::where_eq("customer_id", json!(customer_id)).newest_first();
        self.store.subscribe(
            self.collection,
            query,
            Arc::new(move |docs: &[Document]| {
                let orders: Vec<Order> = docs
                    .iter()
                    .filter_map(|d| match d.decode() {
                        Ok(order) => Some(order),
                        Err(e) => {
                            tracing::warn!(error = %e, "skipping undecodable order document");
                            None
                        }
                    })
                    .collect();
                listener(orders);
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use stockroom_store::InMemoryStore;

    use super::*;

    fn repo() -> OrderRepository<Arc<InMemoryStore>> {
        OrderRepository::customer(Arc::new(InMemoryStore::new()))
    }

    fn line(quantity: u32, unit_price_cents: u64) -> NewOrderLine {
        NewOrderLine {
            product_id: ProductId::new(),
            name: "Hex bolts M8".to_string(),
            quantity,
            unit_price_cents,
        }
    }

    #[test]
    fn totals_are_computed_per_line_and_summed() {
        let repo = repo();
        let order = repo
            .create(NewOrder {
                customer_id: Some(UserId::new()),
                lines: vec![line(3, 250), line(2, 1_000)],
            })
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].line_no, 1);
        assert_eq!(order.lines[0].total_price_cents, 750);
        assert_eq!(order.lines[1].total_price_cents, 2_000);
        assert_eq!(order.total_cents, 2_750);
    }

    #[test]
    fn empty_and_zero_quantity_orders_are_invalid() {
        let repo = repo();
        assert!(matches!(
            repo.create(NewOrder {
                customer_id: None,
                lines: vec![],
            }),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            repo.create(NewOrder {
                customer_id: None,
                lines: vec![line(0, 100)],
            }),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn progression_stops_at_terminal_states() {
        let repo = repo();
        let order = repo
            .create(NewOrder {
                customer_id: None,
                lines: vec![line(1, 100)],
            })
            .unwrap();

        let order = repo.update_status(order.id, OrderStatus::Confirmed).unwrap();
        let order = repo.update_status(order.id, OrderStatus::Shipped).unwrap();
        let order = repo.update_status(order.id, OrderStatus::Delivered).unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        let result = repo.update_status(order.id, OrderStatus::Pending);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn warehouse_and_customer_orders_do_not_mix() {
        let store = Arc::new(InMemoryStore::new());
        let warehouse = OrderRepository::warehouse(store.clone());
        let customer = OrderRepository::customer(store);

        warehouse
            .create(NewOrder {
                customer_id: None,
                lines: vec![line(1, 100)],
            })
            .unwrap();

        assert_eq!(warehouse.get_all().unwrap().len(), 1);
        assert!(customer.get_all().unwrap().is_empty());
    }

    #[test]
    fn customer_subscription_sees_only_their_orders() {
        let repo = repo();
        let customer = UserId::new();
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

        let _sub = {
            let seen = seen.clone();
            repo.subscribe_by_customer(customer, move |orders| {
                seen.lock().unwrap().push(orders.len());
            })
        };

        repo.create(NewOrder {
            customer_id: Some(UserId::new()),
            lines: vec![line(1, 100)],
        })
        .unwrap();
        repo.create(NewOrder {
            customer_id: Some(customer),
            lines: vec![line(2, 100)],
        })
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 0, 1]);
    }
}
