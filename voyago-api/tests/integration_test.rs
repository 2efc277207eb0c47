use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use voyago_api::{app, AppState};
use voyago_core::availability::{Availability, NewAvailability};
use voyago_core::booking::{Booking, BookingStatus, NewBooking, NewPayment, Payment, PaymentStatus};
use voyago_core::media::{NewImage, ServiceImage};
use voyago_core::repository::{
    AvailabilityRepository, BookingRepository, ImageRepository, ServiceRepository,
    VariantRepository,
};
use voyago_core::service::{
    ComboDetails, DetailsPatch, FlightDetails, HotelDetails, NewService, Service, ServiceFilter,
    ServiceStatus, ServiceUpdate, TourDetails, TypeDetails,
};
use voyago_core::slug::generate_slug;
use voyago_core::variant::{NewVariant, Variant, VariantAttributeFilter, VariantUpdate};
use voyago_core::{StoreError, StoreResult};

// ============================================================================
// In-memory fakes implementing the repository traits
// ============================================================================

#[derive(Default)]
struct FakeServices {
    rows: Mutex<HashMap<i64, Service>>,
    next_id: AtomicI64,
}

impl FakeServices {
    fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

fn details_from_patch(patch: &DetailsPatch) -> TypeDetails {
    match patch {
        DetailsPatch::Tour(p) => TypeDetails::Tour(TourDetails {
            duration_days: p.duration_days,
            country: p.country.clone(),
            min_participants: p.min_participants,
            max_participants: p.max_participants,
            itinerary: p.itinerary.clone(),
        }),
        DetailsPatch::Hotel(p) => TypeDetails::Hotel(HotelDetails {
            hotel_name: p.hotel_name.clone(),
            hotel_address: p.hotel_address.clone(),
            star_rating: p.star_rating,
            room_type: p.room_type.clone(),
            bed_type: p.bed_type.clone(),
            room_size: p.room_size,
            max_occupancy: p.max_occupancy,
            amenities: p.amenities.clone(),
            check_in_time: p.check_in_time.clone(),
            check_out_time: p.check_out_time.clone(),
            cancellation_policy: p.cancellation_policy.clone(),
        }),
        DetailsPatch::Flight(p) => TypeDetails::Flight(FlightDetails {
            airline: p.airline.clone(),
            flight_number: p.flight_number.clone(),
            cabin_classes: Value::Object(p.extras()),
        }),
        DetailsPatch::Combo(p) => TypeDetails::Combo(ComboDetails {
            includes_tour: p.includes_tour.unwrap_or(false),
            includes_hotel: p.includes_hotel.unwrap_or(false),
            includes_flight: p.includes_flight.unwrap_or(false),
            description: p.description.clone(),
            special_offers: p.special_offers.clone(),
        }),
    }
}

#[async_trait]
impl ServiceRepository for FakeServices {
    async fn create(&self, input: NewService) -> StoreResult<Service> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let mut metadata = match input.metadata {
            Some(v) if v.is_object() => v,
            _ => json!({}),
        };
        if let (Some(location), Some(obj)) = (&input.location, metadata.as_object_mut()) {
            obj.insert("location".to_string(), json!(location));
        }

        let details = input
            .details
            .as_ref()
            .filter(|d| d.is_significant())
            .map(details_from_patch);

        let now = Utc::now();
        let service = Service {
            id,
            name: input.name.clone(),
            slug: Some(generate_slug(&input.name, Some(id))),
            short_description: input.short_description,
            description: input.description,
            service_type: input.service_type,
            status: input.status.unwrap_or(ServiceStatus::Draft),
            default_currency: input.default_currency.unwrap_or_else(|| "USD".to_string()),
            metadata,
            details,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().insert(id, service.clone());
        Ok(service)
    }

    async fn update(&self, id: i64, update: ServiceUpdate) -> StoreResult<Option<Service>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(svc) = rows.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &update.name {
            svc.name = name.clone();
            svc.slug = Some(generate_slug(name, Some(id)));
        }
        if let Some(v) = &update.short_description {
            svc.short_description = Some(v.clone());
        }
        if let Some(v) = &update.description {
            svc.description = Some(v.clone());
        }
        if let Some(v) = update.service_type {
            svc.service_type = v;
        }
        if let Some(v) = update.status {
            svc.status = v;
        }
        if let Some(v) = &update.default_currency {
            svc.default_currency = v.clone();
        }
        if let Some(location) = &update.location {
            if let Some(obj) = svc.metadata.as_object_mut() {
                obj.insert("location".to_string(), json!(location));
            }
        }
        if let Some(patch) = &update.details {
            if !patch.is_empty() && (svc.details.is_some() || patch.is_significant()) {
                svc.details = Some(details_from_patch(patch));
            }
        }
        svc.updated_at = Utc::now();
        Ok(Some(svc.clone()))
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Service>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Service>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|s| s.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn list(&self, filter: ServiceFilter) -> StoreResult<Vec<Service>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|s| filter.service_type.map_or(true, |t| s.service_type == t))
            .filter(|s| filter.status.map_or(true, |st| s.status == st))
            .cloned()
            .collect())
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(svc) => {
                svc.status = ServiceStatus::Inactive;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hard_delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
struct FakeVariants {
    rows: Mutex<HashMap<i64, Variant>>,
    next_id: AtomicI64,
}

impl FakeVariants {
    fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl VariantRepository for FakeVariants {
    async fn create(&self, service_id: i64, input: NewVariant) -> StoreResult<Variant> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let variant = Variant {
            id,
            service_id,
            name: input.name,
            price_minor: input.price_minor,
            currency: input.currency.unwrap_or_else(|| "USD".to_string()),
            capacity: input.capacity,
            attributes: input.attributes.unwrap_or_else(|| json!({})),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().insert(id, variant.clone());
        Ok(variant)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Variant>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, id: i64, update: VariantUpdate) -> StoreResult<Option<Variant>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(v) = rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            v.name = name;
        }
        if let Some(price) = update.price_minor {
            v.price_minor = price;
        }
        if let Some(currency) = update.currency {
            v.currency = currency;
        }
        if let Some(capacity) = update.capacity {
            v.capacity = Some(capacity);
        }
        if let Some(attributes) = update.attributes {
            v.attributes = attributes;
        }
        if let Some(active) = update.is_active {
            v.is_active = active;
        }
        v.updated_at = Utc::now();
        Ok(Some(v.clone()))
    }

    async fn deactivate(&self, id: i64) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(v) => {
                v.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_for_service(&self, service_id: i64) -> StoreResult<Vec<Variant>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.service_id == service_id)
            .cloned()
            .collect())
    }

    async fn query_by_attributes(
        &self,
        service_id: i64,
        filter: VariantAttributeFilter,
    ) -> StoreResult<Vec<Variant>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.service_id == service_id && v.is_active)
            .filter(|v| {
                filter
                    .cabin_class
                    .as_deref()
                    .map_or(true, |want| v.attributes["cabin_class"] == want)
            })
            .filter(|v| {
                filter
                    .checked_baggage
                    .as_deref()
                    .map_or(true, |want| v.attributes["baggage"]["checked"] == want)
            })
            .filter(|v| {
                filter
                    .meal_included
                    .map_or(true, |want| v.attributes["meal_included"] == want)
            })
            .filter(|v| {
                filter
                    .priority_boarding
                    .map_or(true, |want| v.attributes["priority_boarding"] == want)
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeImages {
    rows: Mutex<HashMap<i64, ServiceImage>>,
    next_id: AtomicI64,
}

impl FakeImages {
    fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl ImageRepository for FakeImages {
    async fn add(&self, service_id: i64, input: NewImage) -> StoreResult<ServiceImage> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        if input.is_primary {
            for img in rows.values_mut().filter(|i| i.service_id == service_id) {
                img.is_primary = false;
            }
        }
        let image = ServiceImage {
            id,
            service_id,
            image_url: input.image_url,
            alt_text: input.alt_text,
            sort_order: input.sort_order.unwrap_or(0),
            is_primary: input.is_primary,
            created_at: Utc::now(),
        };
        rows.insert(id, image.clone());
        Ok(image)
    }

    async fn list_for_service(&self, service_id: i64) -> StoreResult<Vec<ServiceImage>> {
        let mut images: Vec<ServiceImage> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.service_id == service_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| (i.sort_order, i.id));
        Ok(images)
    }

    async fn set_primary(&self, id: i64) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let Some(service_id) = rows.get(&id).map(|i| i.service_id) else {
            return Ok(false);
        };
        for img in rows.values_mut().filter(|i| i.service_id == service_id) {
            img.is_primary = img.id == id;
        }
        Ok(true)
    }

    async fn delete(&self, id: i64) -> StoreResult<Option<String>> {
        Ok(self.rows.lock().unwrap().remove(&id).map(|i| i.image_url))
    }
}

#[derive(Default)]
struct FakeAvailabilities {
    rows: Mutex<HashMap<i64, Availability>>,
    next_id: AtomicI64,
}

impl FakeAvailabilities {
    fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl AvailabilityRepository for FakeAvailabilities {
    async fn create(&self, service_id: i64, input: NewAvailability) -> StoreResult<Availability> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let availability = Availability {
            id,
            service_id,
            variant_id: input.variant_id,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            total_capacity: input.total_capacity,
            booked_count: 0,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(id, availability.clone());
        Ok(availability)
    }

    async fn list_for_service(&self, service_id: i64) -> StoreResult<Vec<Availability>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.service_id == service_id)
            .cloned()
            .collect())
    }

    async fn reserve(&self, id: i64, quantity: i32) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(a) if a.booked_count + quantity <= a.total_capacity => {
                a.booked_count += quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, id: i64, quantity: i32) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(a) => {
                a.booked_count = (a.booked_count - quantity).max(0);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

struct FakeBookings {
    rows: Mutex<HashMap<i64, Booking>>,
    variants: Arc<FakeVariants>,
    availabilities: Arc<FakeAvailabilities>,
    next_id: AtomicI64,
}

impl FakeBookings {
    fn new(variants: Arc<FakeVariants>, availabilities: Arc<FakeAvailabilities>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            variants,
            availabilities,
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl BookingRepository for FakeBookings {
    async fn create(&self, input: NewBooking) -> StoreResult<Booking> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let currency = input.currency.unwrap_or_else(|| "USD".to_string());

        let mut items = Vec::new();
        for (i, item) in input.items.iter().enumerate() {
            let unit_price = match (item.unit_price_minor, item.variant_id) {
                (Some(price), _) => price,
                (None, Some(variant_id)) => {
                    self.variants
                        .get(variant_id)
                        .await?
                        .ok_or_else(|| StoreError::Database("unknown variant".into()))?
                        .price_minor
                }
                (None, None) => return Err(StoreError::Database("unpriced item".into())),
            };
            if let Some(availability_id) = item.availability_id {
                if !self.availabilities.reserve(availability_id, item.quantity).await? {
                    return Err(StoreError::conflict("availability_capacity"));
                }
            }
            items.push(voyago_core::booking::BookingItem {
                id: i as i64 + 1,
                service_id: item.service_id,
                variant_id: item.variant_id,
                availability_id: item.availability_id,
                quantity: item.quantity,
                unit_price_minor: unit_price,
                currency: currency.clone(),
            });
        }
        let total_minor = items
            .iter()
            .map(|i| i64::from(i.quantity) * i.unit_price_minor)
            .sum();

        let now = Utc::now();
        let booking = Booking {
            id,
            booking_code: uuid::Uuid::new_v4(),
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            status: BookingStatus::Pending,
            total_minor,
            currency,
            items,
            participants: input
                .participants
                .into_iter()
                .enumerate()
                .map(|(i, p)| voyago_core::booking::Participant {
                    id: i as i64 + 1,
                    full_name: p.full_name,
                    date_of_birth: p.date_of_birth,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().insert(id, booking.clone());
        Ok(booking)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Booking>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(b) => {
                b.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_payment(
        &self,
        booking_id: i64,
        input: NewPayment,
    ) -> StoreResult<Option<Payment>> {
        if !self.rows.lock().unwrap().contains_key(&booking_id) {
            return Ok(None);
        }
        Ok(Some(Payment {
            id: 1,
            booking_id,
            provider: input.provider,
            amount_minor: input.amount_minor,
            currency: input.currency.unwrap_or_else(|| "USD".to_string()),
            status: input.status.unwrap_or(PaymentStatus::Initiated),
            gateway_payload: input.gateway_payload.unwrap_or_else(|| json!({})),
            created_at: Utc::now(),
        }))
    }
}

// ============================================================================
// Harness
// ============================================================================

fn test_app() -> axum::Router {
    let variants = Arc::new(FakeVariants::new());
    let availabilities = Arc::new(FakeAvailabilities::new());
    let state = AppState {
        services: Arc::new(FakeServices::new()),
        variants: variants.clone(),
        images: Arc::new(FakeImages::new()),
        availabilities: availabilities.clone(),
        bookings: Arc::new(FakeBookings::new(variants, availabilities)),
        media_root: std::env::temp_dir().join("voyago-test-media"),
        default_currency: "USD".to_string(),
    };
    app(state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn health_check_responds() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_tour_service_with_details() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "Đà Lạt - Nha Trang 4N3Đ",
            "service_type": "TOUR",
            "duration_days": 4,
            "country": "Vietnam",
            "itinerary": [{"day": 1, "title": "Arrival in Đà Lạt"}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "da-lat-nha-trang-4n3d-1");
    assert_eq!(body["status"], "DRAFT");
    assert_eq!(body["details"]["kind"], "TOUR");
    assert_eq!(body["details"]["duration_days"], 4);
}

#[tokio::test]
async fn create_service_without_type_fields_has_no_details() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "Placeholder Hotel",
            "service_type": "HOTEL"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["details"].is_null());
}

#[tokio::test]
async fn location_update_preserves_other_metadata_keys() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "Mekong Cruise",
            "service_type": "TOUR",
            "metadata": {"region": "south", "featured": true}
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/v1/services/{}", id),
        Some(json!({ "location": "Can Tho" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["location"], "Can Tho");
    assert_eq!(body["metadata"]["region"], "south");
    assert_eq!(body["metadata"]["featured"], true);
}

#[tokio::test]
async fn activation_requires_ten_character_description() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "Hoi An Walking Tour",
            "service_type": "TOUR",
            "description": "123456789"
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    // 9 merged characters: rejected, naming the field.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/v1/services/{}", id),
        Some(json!({ "status": "ACTIVE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "description");
    assert_eq!(body["error"]["value"], "123456789");

    // Patch bringing the merged description to 10: accepted.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/v1/services/{}", id),
        Some(json!({ "status": "ACTIVE", "description": "1234567890" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE");
}

#[tokio::test]
async fn create_active_service_with_short_description_fails() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "Rushed Listing",
            "service_type": "TOUR",
            "status": "ACTIVE",
            "description": "too short"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "description");
}

#[tokio::test]
async fn missing_service_is_a_404_not_an_error() {
    let app = test_app();
    let (status, _) = send(&app, "GET", "/v1/services/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PATCH",
        "/v1/services/999",
        Some(json!({ "name": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hotel_aliases_flow_through_to_details() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "Hanoi Pearl",
            "service_type": "HOTEL",
            "hotel_name": "Hanoi Pearl Hotel",
            "star_rating": "4",
            "room_types": "Deluxe",
            "bed_types": "King",
            "room_area": "32.5"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["details"]["kind"], "HOTEL");
    assert_eq!(body["details"]["room_type"], "Deluxe");
    assert_eq!(body["details"]["bed_type"], "King");
    assert_eq!(body["details"]["room_size"], 32.5);
    assert_eq!(body["details"]["star_rating"], 4);
}

#[tokio::test]
async fn flight_variant_cabin_class_is_allow_listed() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "SGN-HAN Shuttle",
            "service_type": "FLIGHT",
            "airline": "Vietnam Airlines",
            "flight_number": "VN210"
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/services/{}/variants", id),
        Some(json!({
            "name": "Steerage fare",
            "price_minor": 100000,
            "attributes": {"cabin_class": "Steerage"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "attributes.cabin_class");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/services/{}/variants", id),
        Some(json!({
            "name": "Business fare",
            "price_minor": 500000,
            "attributes": {"cabin_class": "Business"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn variant_search_filters_by_cabin_class() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "SGN-DAD Shuttle",
            "service_type": "FLIGHT",
            "airline": "Bamboo Airways",
            "flight_number": "QH102"
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    for (name, cabin, price) in [
        ("Economy Saver", "Economy", 90_000),
        ("Economy Flex", "Economy", 120_000),
        ("Business", "Business", 450_000),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/v1/services/{}/variants", id),
            Some(json!({
                "name": name,
                "price_minor": price,
                "attributes": {"cabin_class": cabin}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/v1/services/{}/variants/search?cabin_class=Business", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["attributes"]["cabin_class"], "Business");
}

#[tokio::test]
async fn image_delete_tolerates_missing_file() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({ "name": "Gallery Tour", "service_type": "TOUR", "country": "Vietnam" })),
    )
    .await;
    let service_id = created["id"].as_i64().unwrap();

    let (status, image) = send(
        &app,
        "POST",
        &format!("/v1/services/{}/images", service_id),
        Some(json!({ "image_url": "/img/never-written-to-disk.jpg", "is_primary": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // No file exists under media_root; the row delete must still succeed.
    let image_id = image["id"].as_i64().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/v1/images/{}", image_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &format!("/v1/images/{}", image_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_rejects_unpriceable_items() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "customer_name": "Linh Tran",
            "customer_email": "linh@example.com",
            "items": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "items");

    let (status, body) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "customer_name": "Linh Tran",
            "customer_email": "linh@example.com",
            "items": [{"service_id": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "items[0]");
}

#[tokio::test]
async fn cancelling_a_booking_releases_reserved_capacity() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "Trang An Boat Trip",
            "service_type": "TOUR",
            "country": "Vietnam"
        })),
    )
    .await;
    let service_id = created["id"].as_i64().unwrap();

    let (status, availability) = send(
        &app,
        "POST",
        &format!("/v1/services/{}/availabilities", service_id),
        Some(json!({
            "starts_at": "2026-09-01T08:00:00Z",
            "ends_at": "2026-09-01T17:00:00Z",
            "total_capacity": 10
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let availability_id = availability["id"].as_i64().unwrap();

    let (status, booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "customer_name": "Linh Tran",
            "customer_email": "linh@example.com",
            "items": [{
                "service_id": service_id,
                "availability_id": availability_id,
                "quantity": 2,
                "unit_price_minor": 40_000
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let booking_id = booking["id"].as_i64().unwrap();

    let (_, windows) = send(
        &app,
        "GET",
        &format!("/v1/services/{}/availabilities", service_id),
        None,
    )
    .await;
    assert_eq!(windows[0]["booked_count"], 2);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{}/status", booking_id),
        Some(json!({ "status": "CANCELLED" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, windows) = send(
        &app,
        "GET",
        &format!("/v1/services/{}/availabilities", service_id),
        None,
    )
    .await;
    assert_eq!(windows[0]["booked_count"], 0);
}

#[tokio::test]
async fn booking_totals_come_from_variant_prices() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/v1/services",
        Some(json!({
            "name": "Halong Day Cruise",
            "service_type": "TOUR",
            "country": "Vietnam"
        })),
    )
    .await;
    let service_id = created["id"].as_i64().unwrap();

    let (_, variant) = send(
        &app,
        "POST",
        &format!("/v1/services/{}/variants", service_id),
        Some(json!({ "name": "Standard seat", "price_minor": 75_000 })),
    )
    .await;
    let variant_id = variant["id"].as_i64().unwrap();

    let (status, booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "customer_name": "Linh Tran",
            "customer_email": "linh@example.com",
            "items": [{"service_id": service_id, "variant_id": variant_id, "quantity": 2}],
            "participants": [{"full_name": "Linh Tran"}, {"full_name": "Minh Tran"}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["total_minor"], 150_000);
    assert_eq!(booking["status"], "PENDING");
    assert_eq!(booking["participants"].as_array().unwrap().len(), 2);
}
