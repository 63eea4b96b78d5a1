//! Inventory item: quantity, thresholds, derived stock status.

use serde::{Deserialize, Serialize};

use stockroom_core::{DocumentId, ProductId};
use stockroom_store::ServerInstant;

/// Derived stock level indicator.
///
/// `Discontinued` is never produced by derivation; it is set explicitly and
/// survives until the next quantity change recomputes the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    Discontinued,
}

impl StockStatus {
    /// Recompute the status for a quantity against the low-stock threshold.
    ///
    /// Invariant: out_of_stock iff quantity ≤ 0; low_stock iff
    /// 0 < quantity ≤ min_stock_level; in_stock otherwise.
    pub fn derive(quantity: i64, min_stock_level: i64) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity <= min_stock_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

/// Default reorder thresholds for stock arriving without curated levels:
/// reorder at a tenth of the initial quantity (at least one unit), cap at
/// double.
pub fn default_thresholds(quantity: i64) -> (i64, i64) {
    let min = (quantity / 10).max(1);
    let max = quantity * 2;
    (min, max)
}

/// A stock record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: DocumentId,
    pub created_at: ServerInstant,
    pub updated_at: ServerInstant,
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub min_stock_level: i64,
    pub max_stock_level: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price_cents: u64,
    pub location: String,
    pub status: StockStatus,
    /// Whether the item is visible in the customer catalog.
    pub published: bool,
}

/// Input for creating a stock record. The status is always derived from
/// quantity and thresholds, never taken from the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInventoryItem {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub min_stock_level: i64,
    pub max_stock_level: i64,
    pub unit_price_cents: u64,
    pub location: String,
    pub published: bool,
}
