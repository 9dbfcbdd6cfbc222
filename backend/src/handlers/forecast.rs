//! HTTP handlers for forecast ingestion and queries

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{BatchIngestRequest, ForecastRecord, IngestOutcome, Region};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::services::{ForecastIngestor, ForecastQueryService};
use crate::AppState;

/// Query parameters for the latest forecast of a region
#[derive(Debug, Deserialize, Validate)]
pub struct LatestForecastQuery {
    #[validate(custom = "validate_district")]
    pub district: Option<String>,
}

/// Query parameters for the city/district lookup
#[derive(Debug, Deserialize, Validate)]
pub struct ForecastLookupQuery {
    pub city: Option<String>,
    #[validate(custom = "validate_district")]
    pub district: Option<String>,
}

#[allow(clippy::ptr_arg)]
fn validate_district(district: &String) -> Result<(), ValidationError> {
    shared::validate_location_filter(district).map_err(|message| {
        let mut error = ValidationError::new("district");
        error.message = Some(message.into());
        error
    })
}

/// Blank filters mean "no filter"
fn district_filter(district: &Option<String>) -> Option<&str> {
    district.as_deref().filter(|d| !d.trim().is_empty())
}

/// Fetch a region's forecast from CWA and store it
pub async fn ingest_forecast(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> AppResult<Json<ForecastRecord>> {
    let ingestor = ForecastIngestor::new(state.registry.clone());
    let record = ingestor.fetch_and_ingest(&state.cwa, &region).await?;
    Ok(Json(record))
}

/// Fetch and store several regions
pub async fn ingest_forecasts(
    State(state): State<AppState>,
    Json(input): Json<BatchIngestRequest>,
) -> AppResult<Json<Vec<IngestOutcome>>> {
    if input.regions.is_empty() {
        return Err(AppError::validation("regions", "At least one region is required"));
    }
    if input.regions.len() > Region::ALL.len() {
        return Err(AppError::validation(
            "regions",
            format!("At most {} regions per request", Region::ALL.len()),
        ));
    }

    let ingestor = ForecastIngestor::new(state.registry.clone());
    let outcomes = ingestor
        .fetch_and_ingest_many(&state.cwa, &input.regions)
        .await?;
    Ok(Json(outcomes))
}

/// Latest stored forecast for a region
pub async fn get_latest_forecast(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Query(query): Query<LatestForecastQuery>,
) -> AppResult<Json<ForecastRecord>> {
    query
        .validate()
        .map_err(|e| AppError::validation("district", e.to_string()))?;

    let service = ForecastQueryService::new(state.registry.clone());
    let record = service
        .latest(&region, district_filter(&query.district))
        .await?;
    Ok(Json(record))
}

/// Latest stored forecast by `?city=...&district=...`
pub async fn lookup_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastLookupQuery>,
) -> AppResult<Json<ForecastRecord>> {
    query
        .validate()
        .map_err(|e| AppError::validation("district", e.to_string()))?;

    let city = query
        .city
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::validation("city", "city is required"))?;

    let service = ForecastQueryService::new(state.registry.clone());
    let record = service
        .latest(city, district_filter(&query.district))
        .await?;
    Ok(Json(record))
}
