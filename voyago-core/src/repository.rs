use async_trait::async_trait;

use crate::availability::{Availability, NewAvailability};
use crate::booking::{Booking, BookingStatus, NewBooking, NewPayment, Payment};
use crate::error::StoreResult;
use crate::media::{NewImage, ServiceImage};
use crate::service::{NewService, Service, ServiceFilter, ServiceUpdate};
use crate::variant::{NewVariant, Variant, VariantAttributeFilter, VariantUpdate};

/// Catalog access. Reads signal absence with `None`; multi-table writes are
/// atomic: either every step of a create/update lands or none do.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, input: NewService) -> StoreResult<Service>;

    async fn update(&self, id: i64, update: ServiceUpdate) -> StoreResult<Option<Service>>;

    async fn get(&self, id: i64) -> StoreResult<Option<Service>>;

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Service>>;

    async fn list(&self, filter: ServiceFilter) -> StoreResult<Vec<Service>>;

    /// Default removal path: flips the service INACTIVE, keeps the rows.
    async fn soft_delete(&self, id: i64) -> StoreResult<bool>;

    /// Physically removes the service and everything hanging off it.
    async fn hard_delete(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait VariantRepository: Send + Sync {
    async fn create(&self, service_id: i64, input: NewVariant) -> StoreResult<Variant>;

    async fn get(&self, id: i64) -> StoreResult<Option<Variant>>;

    async fn update(&self, id: i64, update: VariantUpdate) -> StoreResult<Option<Variant>>;

    async fn deactivate(&self, id: i64) -> StoreResult<bool>;

    async fn list_for_service(&self, service_id: i64) -> StoreResult<Vec<Variant>>;

    async fn query_by_attributes(
        &self,
        service_id: i64,
        filter: VariantAttributeFilter,
    ) -> StoreResult<Vec<Variant>>;
}

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn add(&self, service_id: i64, input: NewImage) -> StoreResult<ServiceImage>;

    async fn list_for_service(&self, service_id: i64) -> StoreResult<Vec<ServiceImage>>;

    async fn set_primary(&self, id: i64) -> StoreResult<bool>;

    /// Removes the row and returns the stored url so the caller can unlink
    /// the backing file. The row delete is authoritative.
    async fn delete(&self, id: i64) -> StoreResult<Option<String>>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn create(&self, service_id: i64, input: NewAvailability) -> StoreResult<Availability>;

    async fn list_for_service(&self, service_id: i64) -> StoreResult<Vec<Availability>>;

    /// Returns false when the window cannot absorb `quantity` more seats.
    async fn reserve(&self, id: i64, quantity: i32) -> StoreResult<bool>;

    async fn release(&self, id: i64, quantity: i32) -> StoreResult<bool>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, input: NewBooking) -> StoreResult<Booking>;

    async fn get(&self, id: i64) -> StoreResult<Option<Booking>>;

    async fn update_status(&self, id: i64, status: BookingStatus) -> StoreResult<bool>;

    async fn record_payment(&self, booking_id: i64, input: NewPayment)
        -> StoreResult<Option<Payment>>;
}
