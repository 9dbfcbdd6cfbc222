//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;
use shared::PartitionStats;

use crate::error::AppResult;
use crate::services::ForecastQueryService;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub database: String,
    pub partitions: Vec<PartitionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitions_error: Option<String>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.registry.store();

    // Check storage connectivity
    let connected = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Storage ping failed: {}", e);
            false
        }
    };

    let stats = if connected {
        Some(
            ForecastQueryService::new(state.registry.clone())
                .provisioned_stats()
                .await,
        )
    } else {
        None
    };

    Json(health_response(store.backend_name(), stats))
}

/// `None` stats means the store could not be reached at all
fn health_response(
    storage: &str,
    stats: Option<AppResult<Vec<PartitionStats>>>,
) -> HealthResponse {
    let (status, database, partitions, partitions_error) = match stats {
        None => ("unhealthy", "disconnected", Vec::new(), None),
        Some(Ok(partitions)) => ("healthy", "connected", partitions, None),
        Some(Err(e)) => {
            tracing::warn!("Failed to collect partition stats: {}", e);
            ("degraded", "connected", Vec::new(), Some(e.to_string()))
        }
    };

    HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage.to_string(),
        database: database.to_string(),
        partitions,
        partitions_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use shared::Region;

    #[test]
    fn test_healthy_with_stats() {
        let stats = vec![PartitionStats {
            region: Region::TaipeiCity,
            partition: Region::TaipeiCity.partition_name().to_string(),
            record_count: 3,
            latest_created_at: None,
        }];

        let response = health_response("memory", Some(Ok(stats)));
        assert_eq!(response.status, "healthy");
        assert_eq!(response.partitions.len(), 1);
        assert!(response.partitions_error.is_none());
    }

    #[test]
    fn test_stats_failure_is_reported() {
        let response = health_response(
            "postgres",
            Some(Err(AppError::StoreUnavailable("relation does not exist".into()))),
        );

        assert_eq!(response.status, "degraded");
        assert_eq!(response.database, "connected");
        assert!(response
            .partitions_error
            .as_deref()
            .unwrap()
            .contains("relation does not exist"));

        let body = serde_json::to_value(&response).unwrap();
        assert!(body["partitions_error"].is_string());
    }

    #[test]
    fn test_unreachable_store() {
        let response = health_response("postgres", None);
        assert_eq!(response.status, "unhealthy");
        assert_eq!(response.database, "disconnected");

        let body = serde_json::to_value(&response).unwrap();
        assert!(body.get("partitions_error").is_none());
    }
}
