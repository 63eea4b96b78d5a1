//! Shipment tracking records.

use serde::{Deserialize, Serialize};

use stockroom_core::DocumentId;
use stockroom_store::ServerInstant;

/// Whether goods move into or out of the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentDirection {
    Incoming,
    Outgoing,
}

impl ShipmentDirection {
    /// The status a freshly created shipment starts in: inbound freight is
    /// pending arrival, outbound freight enters processing.
    pub fn initial_status(self) -> ShipmentStatus {
        match self {
            ShipmentDirection::Incoming => ShipmentStatus::Pending,
            ShipmentDirection::Outgoing => ShipmentStatus::Processing,
        }
    }
}

/// Shipment lifecycle status. After creation it is advanced only by explicit
/// transition calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    ArrivingToday,
    ReadyToShip,
    Processing,
    Delivered,
    Cancelled,
}

/// A tracked shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: DocumentId,
    pub created_at: ServerInstant,
    pub updated_at: ServerInstant,
    pub direction: ShipmentDirection,
    pub status: ShipmentStatus,
    /// External tracking reference.
    pub reference: String,
    pub carrier: Option<String>,
    /// Declared value in smallest currency unit (e.g., cents).
    pub value_cents: u64,
    pub item_count: u32,
    pub notes: Option<String>,
}

/// Input for creating a shipment. The initial status is derived from the
/// direction, never supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewShipment {
    pub direction: ShipmentDirection,
    pub reference: String,
    pub carrier: Option<String>,
    pub value_cents: u64,
    pub item_count: u32,
    pub notes: Option<String>,
}

/// Partial shipment update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShipmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_cents: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
