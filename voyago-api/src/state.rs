use std::path::PathBuf;
use std::sync::Arc;

use voyago_core::repository::{
    AvailabilityRepository, BookingRepository, ImageRepository, ServiceRepository,
    VariantRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceRepository>,
    pub variants: Arc<dyn VariantRepository>,
    pub images: Arc<dyn ImageRepository>,
    pub availabilities: Arc<dyn AvailabilityRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    /// Image urls resolve under this directory when unlinking files.
    pub media_root: PathBuf,
    pub default_currency: String,
}
