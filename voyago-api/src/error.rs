use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use voyago_core::validation::ValidationError;
use voyago_core::StoreError;

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(err) => {
                let body = Json(json!({ "error": err }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            AppError::NotFound(msg) => {
                let body = Json(json!({ "error": msg }));
                (StatusCode::NOT_FOUND, body).into_response()
            }
            AppError::Conflict(msg) => {
                let body = Json(json!({ "error": msg }));
                (StatusCode::CONFLICT, body).into_response()
            }
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                let body = Json(json!({ "error": "Internal Server Error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { constraint } => {
                AppError::Conflict(format!("conflicting value ({})", constraint))
            }
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
