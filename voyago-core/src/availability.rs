use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookable time window with capacity counters, optionally tied to a
/// variant.
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub id: i64,
    pub service_id: i64,
    pub variant_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub total_capacity: i32,
    pub booked_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Availability {
    pub fn remaining(&self) -> i32 {
        self.total_capacity - self.booked_count
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAvailability {
    pub variant_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub total_capacity: i32,
}
