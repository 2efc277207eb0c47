use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use voyago_core::media::{NewImage, ServiceImage};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/services/{id}/images", get(list_images).post(add_image))
        .route("/v1/images/{id}/primary", post(set_primary_image))
        .route("/v1/images/{id}", delete(delete_image))
}

/// POST /v1/services/{id}/images
/// Registers an already-uploaded file; upload handling itself lives with the
/// media collaborator.
async fn add_image(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    Json(req): Json<NewImage>,
) -> Result<(StatusCode, Json<ServiceImage>), AppError> {
    state
        .services
        .get(service_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {} not found", service_id)))?;

    let image = state.images.add(service_id, req).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// GET /v1/services/{id}/images
async fn list_images(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Result<Json<Vec<ServiceImage>>, AppError> {
    let images = state.images.list_for_service(service_id).await?;
    Ok(Json(images))
}

/// POST /v1/images/{id}/primary
async fn set_primary_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.images.set_primary(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("image {} not found", id)))
    }
}

/// DELETE /v1/images/{id}
/// The row delete is authoritative; unlinking the backing file is
/// best-effort and a missing file never fails the request.
async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let Some(url) = state.images.delete(id).await? else {
        return Err(AppError::NotFound(format!("image {} not found", id)));
    };

    let path = state.media_root.join(url.trim_start_matches('/'));
    if let Err(err) = tokio::fs::remove_file(&path).await {
        tracing::warn!(image_url = %url, error = %err, "could not unlink image file");
    }

    Ok(StatusCode::NO_CONTENT)
}
