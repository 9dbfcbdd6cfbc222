//! Taiwan Regional Forecast Service - Backend Server

use forecast_backend::{
    config::{Config, StorageBackend},
    create_app,
    storage::{MemoryPartitionStore, PartitionStore, PgPartitionStore},
    AppState,
};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "forecast_server=debug,forecast_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Taiwan Regional Forecast Server");
    tracing::info!("Environment: {}", config.environment);

    for warning in config.warnings() {
        tracing::warn!("Configuration: {}", warning);
    }

    // Create forecast storage
    let store: Arc<dyn PartitionStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
                .connect(&config.database.url)
                .await?;
            tracing::info!("Database connection established");
            Arc::new(PgPartitionStore::new(db_pool))
        }
        StorageBackend::Memory => {
            tracing::info!("Using in-memory forecast storage");
            Arc::new(MemoryPartitionStore::new())
        }
    };

    let port = config.server.port;
    let host: std::net::IpAddr = config.server.host.parse()?;

    // Create application state
    let state = AppState::new(config, store)?;

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from((host, port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
