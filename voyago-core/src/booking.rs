use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Initiated,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Initiated => "INITIATED",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIATED" => Ok(PaymentStatus::Initiated),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// A booking aggregates items (service + optional variant + optional
/// availability) and participants. Standard order records; the only
/// coordination is row-level transactions at write time.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: i64,
    pub booking_code: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub status: BookingStatus,
    pub total_minor: i64,
    pub currency: String,
    pub items: Vec<BookingItem>,
    pub participants: Vec<Participant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingItem {
    pub id: i64,
    pub service_id: i64,
    pub variant_id: Option<i64>,
    pub availability_id: Option<i64>,
    pub quantity: i32,
    pub unit_price_minor: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub id: i64,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub customer_name: String,
    pub customer_email: String,
    pub currency: Option<String>,
    pub items: Vec<NewBookingItem>,
    #[serde(default)]
    pub participants: Vec<NewParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBookingItem {
    pub service_id: i64,
    pub variant_id: Option<i64>,
    pub availability_id: Option<i64>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Resolved from the variant's price when omitted.
    pub unit_price_minor: Option<i64>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewParticipant {
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub provider: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub gateway_payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    pub provider: String,
    pub amount_minor: i64,
    pub currency: Option<String>,
    pub status: Option<PaymentStatus>,
    pub gateway_payload: Option<Value>,
}
