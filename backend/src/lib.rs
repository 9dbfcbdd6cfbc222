//! Taiwan Regional Forecast Service - Backend
//!
//! Ingests CWA township forecasts into one storage partition per region and serves
//! the newest snapshot of a region, optionally narrowed to matching districts.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};

use external::CwaClient;
use services::RegionPartitionRegistry;
use storage::PartitionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<RegionPartitionRegistry>,
    pub cwa: CwaClient,
}

impl AppState {
    /// Wire the registry and CWA client around a partition store
    pub fn new(config: Config, store: Arc<dyn PartitionStore>) -> AppResult<Self> {
        let cwa = CwaClient::new(&config.cwa)?;
        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(RegionPartitionRegistry::new(store)),
            cwa,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Taiwan Regional Forecast API v1.0"
}

/// Liveness endpoint
async fn health_check() -> &'static str {
    "OK"
}
