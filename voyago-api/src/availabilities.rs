use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use voyago_core::availability::{Availability, NewAvailability};
use voyago_core::validation::ValidationError;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/v1/services/{id}/availabilities",
        get(list_availabilities).post(create_availability),
    )
}

/// POST /v1/services/{id}/availabilities
async fn create_availability(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    Json(req): Json<NewAvailability>,
) -> Result<(StatusCode, Json<Availability>), AppError> {
    state
        .services
        .get(service_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {} not found", service_id)))?;

    if req.ends_at <= req.starts_at {
        return Err(ValidationError::new(
            "ends_at",
            "must be after starts_at",
            Some(req.ends_at.to_rfc3339()),
        )
        .into());
    }
    if req.total_capacity <= 0 {
        return Err(ValidationError::new(
            "total_capacity",
            "must be positive",
            Some(req.total_capacity.to_string()),
        )
        .into());
    }

    let availability = state.availabilities.create(service_id, req).await?;
    Ok((StatusCode::CREATED, Json(availability)))
}

/// GET /v1/services/{id}/availabilities
async fn list_availabilities(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Result<Json<Vec<Availability>>, AppError> {
    let availabilities = state.availabilities.list_for_service(service_id).await?;
    Ok(Json(availabilities))
}
