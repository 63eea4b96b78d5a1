//! `stockroom-shipments` — shipment tracking.

pub mod repository;
pub mod shipment;

pub use repository::{ShipmentRepository, ShipmentStats};
pub use shipment::{NewShipment, Shipment, ShipmentDirection, ShipmentPatch, ShipmentStatus};
