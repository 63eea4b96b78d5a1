//! `stockroom-inventory` — stock records and the inventory collection.

pub mod item;
pub mod repository;

pub use item::{InventoryItem, NewInventoryItem, StockStatus, default_thresholds};
pub use repository::InventoryRepository;
