use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use voyago_core::booking::{Booking, BookingStatus, NewBooking, NewPayment, Payment};
use voyago_core::validation::ValidationError;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/status", post(update_booking_status))
        .route("/v1/bookings/{id}/payments", post(record_payment))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: BookingStatus,
}

/// POST /v1/bookings
async fn create_booking(
    State(state): State<AppState>,
    Json(mut req): Json<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    if req.items.is_empty() {
        return Err(ValidationError::new("items", "a booking needs at least one item", None).into());
    }
    for (i, item) in req.items.iter().enumerate() {
        if item.unit_price_minor.is_none() && item.variant_id.is_none() {
            return Err(ValidationError::new(
                format!("items[{}]", i),
                "either unit_price_minor or variant_id is required",
                None,
            )
            .into());
        }
        if item.quantity <= 0 {
            return Err(ValidationError::new(
                format!("items[{}].quantity", i),
                "must be positive",
                Some(item.quantity.to_string()),
            )
            .into());
        }
    }
    if req.currency.is_none() {
        req.currency = Some(state.default_currency.clone());
    }

    // Capacity conflicts surface as 409 from the repository; the whole
    // booking rolls back in that case.
    let booking = state.bookings.create(req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {} not found", id)))?;
    Ok(Json(booking))
}

/// POST /v1/bookings/{id}/status
/// Cancelling hands reserved capacity back to the availability windows.
async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<StatusCode, AppError> {
    let booking = state
        .bookings
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {} not found", id)))?;

    if !state.bookings.update_status(id, req.status).await? {
        return Err(AppError::NotFound(format!("booking {} not found", id)));
    }

    if req.status == BookingStatus::Cancelled && booking.status != BookingStatus::Cancelled {
        for item in &booking.items {
            if let Some(availability_id) = item.availability_id {
                if let Err(err) = state
                    .availabilities
                    .release(availability_id, item.quantity)
                    .await
                {
                    tracing::warn!(
                        booking_id = id,
                        availability_id,
                        error = %err,
                        "could not release reserved capacity"
                    );
                }
            }
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/bookings/{id}/payments
/// Gateway interaction happens elsewhere; this records the outcome.
async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewPayment>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    if req.amount_minor <= 0 {
        return Err(ValidationError::new(
            "amount_minor",
            "must be positive",
            Some(req.amount_minor.to_string()),
        )
        .into());
    }
    let payment = state
        .bookings
        .record_payment(id, req)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {} not found", id)))?;
    Ok((StatusCode::CREATED, Json(payment)))
}
