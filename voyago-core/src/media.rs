use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An image attached to a service. Ordered by `sort_order`; at most one per
/// service is primary, which the repository enforces transactionally.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceImage {
    pub id: i64,
    pub service_id: i64,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewImage {
    pub image_url: String,
    pub alt_text: Option<String>,
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_primary: bool,
}
