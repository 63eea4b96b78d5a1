//! Collection queries: field-equality filter + creation-order sort.

use serde_json::Value as JsonValue;

/// Sort order over document creation instants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CreatedOrder {
    /// Storage order (unspecified).
    #[default]
    Unordered,
    OldestFirst,
    NewestFirst,
}

/// Equality filter on a top-level payload field.
///
/// A document matches when the field exists and equals the value; absent
/// fields never match.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEq {
    pub field: String,
    pub value: JsonValue,
}

/// A collection query. The store supports exactly what the application
/// needs: at most one equality filter, ordered by creation instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub filter: Option<FieldEq>,
    pub order: CreatedOrder,
}

impl Query {
    /// Every document in the collection, storage order.
    pub fn all() -> Self {
        Self::default()
    }

    /// Documents whose `field` equals `value`.
    pub fn where_eq(field: impl Into<String>, value: JsonValue) -> Self {
        Self {
            filter: Some(FieldEq {
                field: field.into(),
                value,
            }),
            order: CreatedOrder::Unordered,
        }
    }

    pub fn newest_first(mut self) -> Self {
        self.order = CreatedOrder::NewestFirst;
        self
    }

    pub fn oldest_first(mut self) -> Self {
        self.order = CreatedOrder::OldestFirst;
        self
    }

    /// Whether a payload satisfies the filter.
    pub fn matches(&self, data: &JsonValue) -> bool {
        match &self.filter {
            None => true,
            Some(f) => data.get(&f.field) == Some(&f.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_matches_on_equality_only() {
        let q = Query::where_eq("direction", json!("incoming"));
        assert!(q.matches(&json!({"direction": "incoming", "value_cents": 10})));
        assert!(!q.matches(&json!({"direction": "outgoing"})));
        // Absent field never matches.
        assert!(!q.matches(&json!({"value_cents": 10})));
    }

    #[test]
    fn unfiltered_query_matches_everything() {
        assert!(Query::all().matches(&json!({"anything": 1})));
    }
}
