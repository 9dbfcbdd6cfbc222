//! Route definitions for the forecast service

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::api_key_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - region table
        .nest("/regions", region_routes(state.clone()))
        // Protected routes - forecast ingestion and queries
        .nest("/forecasts", forecast_routes(state.clone()))
        // Protected routes - city/district lookup
        .nest("/data", data_routes(state))
}

/// Region table routes (protected)
fn region_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_regions))
        .route_layer(middleware::from_fn_with_state(state, api_key_middleware))
}

/// Forecast routes (protected)
fn forecast_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/ingest", post(handlers::ingest_forecasts))
        .route("/:region/ingest", post(handlers::ingest_forecast))
        .route("/:region/latest", get(handlers::get_latest_forecast))
        .route_layer(middleware::from_fn_with_state(state, api_key_middleware))
}

/// City/district lookup routes (protected)
fn data_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/forecast", get(handlers::lookup_forecast))
        .route_layer(middleware::from_fn_with_state(state, api_key_middleware))
}
