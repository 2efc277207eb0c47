pub mod app_config;
pub mod availability_repo;
pub mod booking_repo;
pub mod database;
pub mod media_repo;
pub mod service_repo;
pub mod variant_repo;

pub use availability_repo::PostgresAvailabilityRepository;
pub use booking_repo::PostgresBookingRepository;
pub use database::DbClient;
pub use media_repo::PostgresImageRepository;
pub use service_repo::PostgresServiceRepository;
pub use variant_repo::PostgresVariantRepository;
