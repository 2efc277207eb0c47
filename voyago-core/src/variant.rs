use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A priced, capacity-bounded sellable unit of a service. Prices are integer
/// minor units. The `attributes` bag's shape depends on the parent's service
/// type (cabin_class/baggage for flights, room_category/bed_type for
/// hotels).
#[derive(Debug, Clone, Serialize)]
pub struct Variant {
    pub id: i64,
    pub service_id: i64,
    pub name: String,
    pub price_minor: i64,
    pub currency: String,
    pub capacity: Option<i32>,
    pub attributes: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVariant {
    pub name: String,
    pub price_minor: i64,
    pub currency: Option<String>,
    pub capacity: Option<i32>,
    pub attributes: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantUpdate {
    pub name: Option<String>,
    pub price_minor: Option<i64>,
    pub currency: Option<String>,
    pub capacity: Option<i32>,
    pub attributes: Option<Value>,
    pub is_active: Option<bool>,
}

impl VariantUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price_minor.is_none()
            && self.currency.is_none()
            && self.capacity.is_none()
            && self.attributes.is_none()
            && self.is_active.is_none()
    }
}

/// Optional per-key predicates over the JSONB attributes bag. Only present
/// keys become WHERE clauses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantAttributeFilter {
    pub cabin_class: Option<String>,
    pub checked_baggage: Option<String>,
    pub meal_included: Option<bool>,
    pub priority_boarding: Option<bool>,
}

impl VariantAttributeFilter {
    pub fn is_empty(&self) -> bool {
        self.cabin_class.is_none()
            && self.checked_baggage.is_none()
            && self.meal_included.is_none()
            && self.priority_boarding.is_none()
    }
}
