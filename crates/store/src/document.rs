//! Stored document envelope and server-assigned instants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;

use stockroom_core::DocumentId;

use crate::store::StoreError;

/// Payload fields the store reserves for envelope metadata.
///
/// Writes carrying these keys are rejected; reads merge them into the
/// payload so typed entities can carry id and timestamps as plain fields.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// An instant assigned by the store at write time.
///
/// Ordering is by the store's monotonic sequence, never by client clocks:
/// two instants from the same store always compare in write order even when
/// wall clocks skew. The `at` reading is informational (display, reporting).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerInstant {
    seq: u64,
    at: DateTime<Utc>,
}

impl ServerInstant {
    pub fn new(seq: u64, at: DateTime<Utc>) -> Self {
        Self { seq, at }
    }

    pub fn sequence(&self) -> u64 {
        self.seq
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

impl core::fmt::Display for ServerInstant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{} ({})", self.seq, self.at.to_rfc3339())
    }
}

/// A stored document: store-assigned id and timestamps plus the schemaless
/// JSON payload supplied by the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub created_at: ServerInstant,
    pub updated_at: ServerInstant,
    pub data: JsonValue,
}

impl Document {
    /// Decode the payload into a typed entity.
    ///
    /// The envelope metadata is merged into the payload under the reserved
    /// keys first, so `T` may declare `id`, `created_at` and `updated_at`
    /// fields and receive the store-assigned values.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut value = self.data.clone();
        let Some(map) = value.as_object_mut() else {
            return Err(StoreError::serialization("document payload is not an object"));
        };

        map.insert("id".to_string(), to_json(&self.id)?);
        map.insert("created_at".to_string(), to_json(&self.created_at)?);
        map.insert("updated_at".to_string(), to_json(&self.updated_at)?);

        serde_json::from_value(value).map_err(|e| StoreError::serialization(e.to_string()))
    }
}

/// Serialize a typed payload into a storable JSON object.
///
/// Fails if the value does not serialize to an object (documents are maps,
/// not scalars or arrays).
pub fn encode<T: Serialize>(value: &T) -> Result<JsonValue, StoreError> {
    let json = to_json(value)?;
    if !json.is_object() {
        return Err(StoreError::invalid_write("payload must serialize to a JSON object"));
    }
    Ok(json)
}

fn to_json<T: Serialize>(value: &T) -> Result<JsonValue, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::serialization(e.to_string()))
}
