use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use voyago_core::validation::validate_variant_attributes;
use voyago_core::variant::{NewVariant, Variant, VariantAttributeFilter, VariantUpdate};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/services/{id}/variants",
            get(list_variants).post(create_variant),
        )
        .route("/v1/services/{id}/variants/search", get(search_variants))
        .route(
            "/v1/variants/{id}",
            patch(update_variant).delete(deactivate_variant),
        )
}

/// POST /v1/services/{id}/variants
async fn create_variant(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    Json(req): Json<NewVariant>,
) -> Result<(StatusCode, Json<Variant>), AppError> {
    let service = state
        .services
        .get(service_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {} not found", service_id)))?;

    if let Some(attributes) = &req.attributes {
        validate_variant_attributes(service.service_type, attributes)?;
    }

    let variant = state.variants.create(service_id, req).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

/// GET /v1/services/{id}/variants
async fn list_variants(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Result<Json<Vec<Variant>>, AppError> {
    let variants = state.variants.list_for_service(service_id).await?;
    Ok(Json(variants))
}

/// GET /v1/services/{id}/variants/search
/// Filters active variants by attribute keys, e.g. ?cabin_class=Business.
async fn search_variants(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    Query(filter): Query<VariantAttributeFilter>,
) -> Result<Json<Vec<Variant>>, AppError> {
    state
        .services
        .get(service_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {} not found", service_id)))?;

    let variants = state
        .variants
        .query_by_attributes(service_id, filter)
        .await?;
    Ok(Json(variants))
}

/// PATCH /v1/variants/{id}
async fn update_variant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<VariantUpdate>,
) -> Result<Json<Variant>, AppError> {
    let existing = state
        .variants
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("variant {} not found", id)))?;

    // The allow-list applies on every write, so re-check patched attributes
    // against the owning service's type.
    if let Some(attributes) = &req.attributes {
        let service = state
            .services
            .get(existing.service_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("service {} not found", existing.service_id))
            })?;
        validate_variant_attributes(service.service_type, attributes)?;
    }

    let variant = state
        .variants
        .update(id, req)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("variant {} not found", id)))?;
    Ok(Json(variant))
}

/// DELETE /v1/variants/{id}
/// Variants are deactivated, never physically removed through this path.
async fn deactivate_variant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.variants.deactivate(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("variant {} not found", id)))
    }
}
