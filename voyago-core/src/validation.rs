use serde::Serialize;
use serde_json::Value;

use crate::service::ServiceType;

/// A business-rule violation, reported with the offending field and value so
/// the caller can render it distinctly from an internal failure. Never
/// touches storage.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("validation failed on {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Option<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}

pub const MIN_ACTIVE_DESCRIPTION_CHARS: usize = 10;

/// An ACTIVE service must carry a real description. Evaluated against the
/// merged result state, not just the patch: pass the description the service
/// will have after the update lands.
pub fn validate_active_description(merged: Option<&str>) -> Result<(), ValidationError> {
    let trimmed = merged.unwrap_or("").trim();
    if trimmed.chars().count() < MIN_ACTIVE_DESCRIPTION_CHARS {
        return Err(ValidationError::new(
            "description",
            format!(
                "an ACTIVE service requires a description of at least {} characters",
                MIN_ACTIVE_DESCRIPTION_CHARS
            ),
            Some(trimmed.to_string()),
        ));
    }
    Ok(())
}

pub const FLIGHT_CABIN_CLASSES: &[&str] = &["Economy", "Premium Economy", "Business", "First"];

/// Lightweight allow-list check on variant attributes. Attribute shapes are
/// otherwise free-form per service type.
pub fn validate_variant_attributes(
    service_type: ServiceType,
    attributes: &Value,
) -> Result<(), ValidationError> {
    if service_type == ServiceType::Flight {
        if let Some(cabin) = attributes.get("cabin_class") {
            let cabin = cabin.as_str().unwrap_or("");
            if !FLIGHT_CABIN_CLASSES.contains(&cabin) {
                return Err(ValidationError::new(
                    "attributes.cabin_class",
                    format!("must be one of {:?}", FLIGHT_CABIN_CLASSES),
                    Some(cabin.to_string()),
                ));
            }
        }
    }
    Ok(())
}
