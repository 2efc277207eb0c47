use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voyago_api::{app, AppState};
use voyago_store::{
    DbClient, PostgresAvailabilityRepository, PostgresBookingRepository, PostgresImageRepository,
    PostgresServiceRepository, PostgresVariantRepository,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyago_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = voyago_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Voyago API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let state = AppState {
        services: Arc::new(PostgresServiceRepository::new(db.pool.clone())),
        variants: Arc::new(PostgresVariantRepository::new(db.pool.clone())),
        images: Arc::new(PostgresImageRepository::new(db.pool.clone())),
        availabilities: Arc::new(PostgresAvailabilityRepository::new(db.pool.clone())),
        bookings: Arc::new(PostgresBookingRepository::new(db.pool.clone())),
        media_root: PathBuf::from(&config.media.root_dir),
        default_currency: config.catalog.default_currency.clone(),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
