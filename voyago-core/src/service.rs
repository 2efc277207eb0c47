use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Service kinds in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Tour,
    Hotel,
    Flight,
    Combo,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Tour => "TOUR",
            ServiceType::Hotel => "HOTEL",
            ServiceType::Flight => "FLIGHT",
            ServiceType::Combo => "COMBO",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOUR" => Ok(ServiceType::Tour),
            "HOTEL" => Ok(ServiceType::Hotel),
            "FLIGHT" => Ok(ServiceType::Flight),
            "COMBO" => Ok(ServiceType::Combo),
            other => Err(format!("unknown service type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Draft,
    Active,
    Inactive,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Draft => "DRAFT",
            ServiceStatus::Active => "ACTIVE",
            ServiceStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ServiceStatus::Draft),
            "ACTIVE" => Ok(ServiceStatus::Active),
            "INACTIVE" => Ok(ServiceStatus::Inactive),
            other => Err(format!("unknown service status: {}", other)),
        }
    }
}

/// Base catalog entity. The type-specific detail row rides along as
/// `details`; its absence is legal (a DRAFT service may not have one yet).
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub service_type: ServiceType,
    pub status: ServiceStatus,
    pub default_currency: String,
    pub metadata: Value,
    pub details: Option<TypeDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryDay {
    pub day: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct TourDetails {
    pub duration_days: Option<i32>,
    pub country: Option<String>,
    pub min_participants: Option<i32>,
    pub max_participants: Option<i32>,
    pub itinerary: Option<Vec<ItineraryDay>>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct HotelDetails {
    pub hotel_name: Option<String>,
    pub hotel_address: Option<String>,
    pub star_rating: Option<i32>,
    pub room_type: Option<String>,
    pub bed_type: Option<String>,
    pub room_size: Option<f64>,
    pub max_occupancy: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub cancellation_policy: Option<String>,
}

/// Flights keep a narrow schema: only the airline and flight number are
/// first-class. Everything else lives in `cabin_classes`, keyed by field
/// name.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FlightDetails {
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub cabin_classes: Value,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ComboDetails {
    pub includes_tour: bool,
    pub includes_hotel: bool,
    pub includes_flight: bool,
    pub description: Option<String>,
    pub special_offers: Option<String>,
}

/// Type-detail record, one of four shapes selected by `service_type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeDetails {
    Tour(TourDetails),
    Hotel(HotelDetails),
    Flight(FlightDetails),
    Combo(ComboDetails),
}

impl TypeDetails {
    pub fn service_type(&self) -> ServiceType {
        match self {
            TypeDetails::Tour(_) => ServiceType::Tour,
            TypeDetails::Hotel(_) => ServiceType::Hotel,
            TypeDetails::Flight(_) => ServiceType::Flight,
            TypeDetails::Combo(_) => ServiceType::Combo,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TourDetailsPatch {
    pub duration_days: Option<i32>,
    pub country: Option<String>,
    pub min_participants: Option<i32>,
    pub max_participants: Option<i32>,
    pub itinerary: Option<Vec<ItineraryDay>>,
}

#[derive(Debug, Clone, Default)]
pub struct HotelDetailsPatch {
    pub hotel_name: Option<String>,
    pub hotel_address: Option<String>,
    pub star_rating: Option<i32>,
    pub room_type: Option<String>,
    pub bed_type: Option<String>,
    pub room_size: Option<f64>,
    pub max_occupancy: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub cancellation_policy: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FlightDetailsPatch {
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub aircraft_type: Option<String>,
    pub baggage_allowance: Option<String>,
    pub departure_airport: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_airport: Option<String>,
    pub arrival_time: Option<String>,
    pub seat_class: Option<String>,
}

impl FlightDetailsPatch {
    /// The fields without physical columns, folded into a map keyed by field
    /// name, ready to merge into the `cabin_classes` bag.
    pub fn extras(&self) -> serde_json::Map<String, Value> {
        let mut map = serde_json::Map::new();
        let pairs = [
            ("aircraft_type", &self.aircraft_type),
            ("baggage_allowance", &self.baggage_allowance),
            ("departure_airport", &self.departure_airport),
            ("departure_time", &self.departure_time),
            ("arrival_airport", &self.arrival_airport),
            ("arrival_time", &self.arrival_time),
            ("seat_class", &self.seat_class),
        ];
        for (key, value) in pairs {
            if let Some(v) = value {
                map.insert(key.to_string(), Value::String(v.clone()));
            }
        }
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComboDetailsPatch {
    pub includes_tour: Option<bool>,
    pub includes_hotel: Option<bool>,
    pub includes_flight: Option<bool>,
    pub description: Option<String>,
    pub special_offers: Option<String>,
}

/// Per-type detail patch carried by create/update. All fields optional;
/// omitted fields are left untouched on update.
#[derive(Debug, Clone)]
pub enum DetailsPatch {
    Tour(TourDetailsPatch),
    Hotel(HotelDetailsPatch),
    Flight(FlightDetailsPatch),
    Combo(ComboDetailsPatch),
}

impl DetailsPatch {
    pub fn service_type(&self) -> ServiceType {
        match self {
            DetailsPatch::Tour(_) => ServiceType::Tour,
            DetailsPatch::Hotel(_) => ServiceType::Hotel,
            DetailsPatch::Flight(_) => ServiceType::Flight,
            DetailsPatch::Combo(_) => ServiceType::Combo,
        }
    }

    /// Whether the patch carries enough to justify creating a detail row.
    /// A service created without any of these fields gets no detail row at
    /// all, and readers must tolerate its absence.
    pub fn is_significant(&self) -> bool {
        match self {
            DetailsPatch::Tour(p) => {
                p.duration_days.is_some() || p.country.is_some() || p.itinerary.is_some()
            }
            DetailsPatch::Hotel(p) => p.hotel_name.is_some() || p.star_rating.is_some(),
            DetailsPatch::Flight(p) => p.airline.is_some() || p.flight_number.is_some(),
            DetailsPatch::Combo(p) => {
                p.includes_tour.is_some()
                    || p.includes_hotel.is_some()
                    || p.includes_flight.is_some()
                    || p.description.is_some()
                    || p.special_offers.is_some()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DetailsPatch::Tour(p) => {
                p.duration_days.is_none()
                    && p.country.is_none()
                    && p.min_participants.is_none()
                    && p.max_participants.is_none()
                    && p.itinerary.is_none()
            }
            DetailsPatch::Hotel(p) => {
                p.hotel_name.is_none()
                    && p.hotel_address.is_none()
                    && p.star_rating.is_none()
                    && p.room_type.is_none()
                    && p.bed_type.is_none()
                    && p.room_size.is_none()
                    && p.max_occupancy.is_none()
                    && p.amenities.is_none()
                    && p.check_in_time.is_none()
                    && p.check_out_time.is_none()
                    && p.cancellation_policy.is_none()
            }
            DetailsPatch::Flight(p) => {
                p.airline.is_none() && p.flight_number.is_none() && p.extras().is_empty()
            }
            DetailsPatch::Combo(p) => {
                p.includes_tour.is_none()
                    && p.includes_hotel.is_none()
                    && p.includes_flight.is_none()
                    && p.description.is_none()
                    && p.special_offers.is_none()
            }
        }
    }
}

/// Payload for `ServiceRepository::create`.
#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub service_type: ServiceType,
    pub status: Option<ServiceStatus>,
    pub default_currency: Option<String>,
    pub location: Option<String>,
    pub metadata: Option<Value>,
    pub details: Option<DetailsPatch>,
}

/// Partial update for `ServiceRepository::update`. A `None` field means
/// "leave untouched", never "set to null".
#[derive(Debug, Clone, Default)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
    pub status: Option<ServiceStatus>,
    pub default_currency: Option<String>,
    pub location: Option<String>,
    pub details: Option<DetailsPatch>,
}

impl ServiceUpdate {
    pub fn has_base_changes(&self) -> bool {
        self.name.is_some()
            || self.short_description.is_some()
            || self.description.is_some()
            || self.service_type.is_some()
            || self.status.is_some()
            || self.default_currency.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub service_type: Option<ServiceType>,
    pub status: Option<ServiceStatus>,
}
