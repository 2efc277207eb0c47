use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use voyago_core::service::{
    ComboDetailsPatch, DetailsPatch, FlightDetailsPatch, HotelDetailsPatch, ItineraryDay,
    NewService, Service, ServiceFilter, ServiceStatus, ServiceType, ServiceUpdate,
    TourDetailsPatch,
};
use voyago_core::validation::validate_active_description;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/services", get(list_services).post(create_service))
        .route(
            "/v1/services/{id}",
            get(get_service).patch(update_service).delete(delete_service),
        )
        .route("/v1/services/slug/{slug}", get(get_service_by_slug))
}

// ============================================================================
// Request Types
// ============================================================================

/// Type-specific fields, submitted merged into the service payload by the
/// admin forms. This is the one place UI field names are translated
/// (`room_types` -> `room_type`, `bed_types` -> `bed_type`,
/// `room_area` -> `room_size`) and sloppy values are normalized: numerics
/// coerce with blank/invalid becoming absent, and itinerary/amenities accept
/// either a pre-serialized JSON string or a native array.
#[derive(Debug, Default, Deserialize)]
pub struct DetailFields {
    // Tour
    #[serde(default, deserialize_with = "lenient_i32")]
    pub duration_days: Option<i32>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub min_participants: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub max_participants: Option<i32>,
    #[serde(default, deserialize_with = "string_or_itinerary")]
    pub itinerary: Option<Vec<ItineraryDay>>,

    // Hotel
    pub hotel_name: Option<String>,
    pub hotel_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub star_rating: Option<i32>,
    #[serde(alias = "room_types")]
    pub room_type: Option<String>,
    #[serde(alias = "bed_types")]
    pub bed_type: Option<String>,
    #[serde(default, alias = "room_area", deserialize_with = "lenient_f64")]
    pub room_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub max_occupancy: Option<i32>,
    #[serde(default, deserialize_with = "string_or_strings")]
    pub amenities: Option<Vec<String>>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub cancellation_policy: Option<String>,

    // Flight
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub aircraft_type: Option<String>,
    pub baggage_allowance: Option<String>,
    pub departure_airport: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_airport: Option<String>,
    pub arrival_time: Option<String>,
    pub seat_class: Option<String>,

    // Combo. `combo_description` keeps the combo blurb apart from the
    // service-level description in the merged payload.
    pub includes_tour: Option<bool>,
    pub includes_hotel: Option<bool>,
    pub includes_flight: Option<bool>,
    pub combo_description: Option<String>,
    pub special_offers: Option<String>,
}

impl DetailFields {
    /// Select the fields relevant to the target type; everything else in the
    /// merged payload is dropped here, before the repository sees it.
    fn into_patch(self, service_type: ServiceType) -> DetailsPatch {
        match service_type {
            ServiceType::Tour => DetailsPatch::Tour(TourDetailsPatch {
                duration_days: self.duration_days,
                country: self.country,
                min_participants: self.min_participants,
                max_participants: self.max_participants,
                itinerary: self.itinerary,
            }),
            ServiceType::Hotel => DetailsPatch::Hotel(HotelDetailsPatch {
                hotel_name: self.hotel_name,
                hotel_address: self.hotel_address,
                star_rating: self.star_rating,
                room_type: self.room_type,
                bed_type: self.bed_type,
                room_size: self.room_size,
                max_occupancy: self.max_occupancy,
                amenities: self.amenities,
                check_in_time: self.check_in_time,
                check_out_time: self.check_out_time,
                cancellation_policy: self.cancellation_policy,
            }),
            ServiceType::Flight => DetailsPatch::Flight(FlightDetailsPatch {
                airline: self.airline,
                flight_number: self.flight_number,
                aircraft_type: self.aircraft_type,
                baggage_allowance: self.baggage_allowance,
                departure_airport: self.departure_airport,
                departure_time: self.departure_time,
                arrival_airport: self.arrival_airport,
                arrival_time: self.arrival_time,
                seat_class: self.seat_class,
            }),
            ServiceType::Combo => DetailsPatch::Combo(ComboDetailsPatch {
                includes_tour: self.includes_tour,
                includes_hotel: self.includes_hotel,
                includes_flight: self.includes_flight,
                description: self.combo_description,
                special_offers: self.special_offers,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub service_type: ServiceType,
    pub status: Option<ServiceStatus>,
    pub default_currency: Option<String>,
    pub location: Option<String>,
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub details: DetailFields,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
    pub status: Option<ServiceStatus>,
    pub default_currency: Option<String>,
    pub location: Option<String>,
    #[serde(flatten)]
    pub details: DetailFields,
}

#[derive(Debug, Deserialize)]
pub struct ListServicesQuery {
    pub service_type: Option<ServiceType>,
    pub status: Option<ServiceStatus>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteServiceQuery {
    #[serde(default)]
    pub hard: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/services
async fn create_service(
    State(state): State<AppState>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    // Going live requires a real description, even at creation time.
    let status = req.status.unwrap_or(ServiceStatus::Draft);
    if status == ServiceStatus::Active {
        validate_active_description(req.description.as_deref())?;
    }

    let details = req.details.into_patch(req.service_type);
    let input = NewService {
        name: req.name,
        short_description: req.short_description,
        description: req.description,
        service_type: req.service_type,
        status: req.status,
        default_currency: req
            .default_currency
            .or_else(|| Some(state.default_currency.clone())),
        location: req.location,
        metadata: req.metadata,
        details: Some(details),
    };

    let service = state.services.create(input).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// PATCH /v1/services/{id}
/// Partial update: omitted fields stay untouched.
async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    let current = state
        .services
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {} not found", id)))?;

    // The ACTIVE description rule runs against the merged result state, not
    // just the patch.
    let resulting_status = req.status.unwrap_or(current.status);
    if resulting_status == ServiceStatus::Active {
        let merged = req
            .description
            .as_deref()
            .or(current.description.as_deref());
        validate_active_description(merged)?;
    }

    let target_type = req.service_type.unwrap_or(current.service_type);
    let details = req.details.into_patch(target_type);
    let update = ServiceUpdate {
        name: req.name,
        short_description: req.short_description,
        description: req.description,
        service_type: req.service_type,
        status: req.status,
        default_currency: req.default_currency,
        location: req.location,
        details: Some(details),
    };

    let service = state
        .services
        .update(id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {} not found", id)))?;
    Ok(Json(service))
}

/// GET /v1/services
async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ListServicesQuery>,
) -> Result<Json<Vec<Service>>, AppError> {
    let filter = ServiceFilter {
        service_type: query.service_type,
        status: query.status,
    };
    let services = state.services.list(filter).await?;
    Ok(Json(services))
}

/// GET /v1/services/{id}
async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Service>, AppError> {
    let service = state
        .services
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {} not found", id)))?;
    Ok(Json(service))
}

/// GET /v1/services/slug/{slug}
async fn get_service_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Service>, AppError> {
    let service = state
        .services
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service '{}' not found", slug)))?;
    Ok(Json(service))
}

/// DELETE /v1/services/{id}
/// Soft by default; ?hard=true removes the rows for good.
async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<DeleteServiceQuery>,
) -> Result<StatusCode, AppError> {
    let removed = if query.hard {
        state.services.hard_delete(id).await?
    } else {
        state.services.soft_delete(id).await?
    };
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("service {} not found", id)))
    }
}

// ============================================================================
// Boundary Normalization
// ============================================================================

fn coerce_i32(value: Option<Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_f64(value: Option<Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts either a pre-serialized JSON string or a native array, the two
/// shapes the admin forms actually send.
fn coerce_json_list<T: DeserializeOwned>(value: Option<Value>) -> Option<Vec<T>> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            serde_json::from_str(s).ok()
        }
        v @ Value::Array(_) => serde_json::from_value(v).ok(),
        _ => None,
    }
}

fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    Ok(coerce_i32(Option::<Value>::deserialize(deserializer)?))
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(coerce_f64(Option::<Value>::deserialize(deserializer)?))
}

fn string_or_strings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Ok(coerce_json_list(Option::<Value>::deserialize(deserializer)?))
}

fn string_or_itinerary<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<ItineraryDay>>, D::Error> {
    Ok(coerce_json_list(Option::<Value>::deserialize(deserializer)?))
}
