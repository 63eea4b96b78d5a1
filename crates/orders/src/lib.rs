//! `stockroom-orders` — line-itemed order records.

pub mod order;

pub use order::{NewOrder, NewOrderLine, Order, OrderLine, OrderRepository, OrderStatus};
