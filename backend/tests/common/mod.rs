//! Shared fixtures for backend integration tests

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use forecast_backend::{
    config::{AuthConfig, Config, CwaConfig, DatabaseConfig, ServerConfig, StorageBackend, StorageConfig},
    storage::MemoryPartitionStore,
    AppState,
};
use serde_json::{json, Value};
use shared::ForecastDocument;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CLIENT_KEY: &str = "test-client-key";
pub const CWA_KEY: &str = "CWA-TEST-KEY";

/// One provider location entry in CWA wire format
pub fn cwa_location(name: &str) -> Value {
    json!({
        "LocationName": name,
        "Geocode": "63000020",
        "Latitude": "25.06",
        "Longitude": "121.53",
        "WeatherElement": [
            {
                "ElementName": "溫度",
                "Time": [
                    {
                        "DataTime": "2025-01-01T06:00:00+08:00",
                        "ElementValue": [{ "Temperature": "18" }]
                    }
                ]
            },
            {
                "ElementName": "天氣現象",
                "Time": [
                    {
                        "StartTime": "2025-01-01T06:00:00+08:00",
                        "EndTime": "2025-01-01T09:00:00+08:00",
                        "ElementValue": [{ "Weather": "多雲", "WeatherCode": "04" }]
                    }
                ]
            }
        ]
    })
}

/// The `records.Locations[0]` entry for a dataset
pub fn cwa_locations_entry(label: &str, districts: &[&str]) -> Value {
    json!({
        "DatasetDescription": "臺灣各鄉鎮市區預報資料-鄉鎮天氣預報-逐3小時",
        "LocationsName": label,
        "Dataid": "D0047-063",
        "Location": districts.iter().map(|d| cwa_location(d)).collect::<Vec<_>>()
    })
}

/// Full datastore response body
pub fn cwa_body(label: &str, districts: &[&str]) -> Value {
    json!({
        "success": "true",
        "result": { "resource_id": "F-D0047-063", "fields": [] },
        "records": { "Locations": [cwa_locations_entry(label, districts)] }
    })
}

/// Parsed document matching `cwa_locations_entry`
pub fn document(label: &str, districts: &[&str]) -> ForecastDocument {
    serde_json::from_value(cwa_locations_entry(label, districts)).unwrap()
}

/// Canned provider responses keyed by dataset code
#[derive(Clone, Default)]
pub struct FakeUpstream {
    responses: Arc<HashMap<String, (StatusCode, Value)>>,
    delay: Option<Duration>,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, code: &str, status: StatusCode, body: Value) -> Self {
        let mut responses = (*self.responses).clone();
        responses.insert(code.to_string(), (status, body));
        self.responses = Arc::new(responses);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<HashMap<String, String>> {
        self.last_query.lock().unwrap().clone()
    }

    /// Serve on an ephemeral local port and return the base URL
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/v1/rest/datastore/:code", get(serve_dataset))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/", addr)
    }
}

async fn serve_dataset(
    State(upstream): State<FakeUpstream>,
    Path(code): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    *upstream.last_query.lock().unwrap() = Some(query);

    if let Some(delay) = upstream.delay {
        tokio::time::sleep(delay).await;
    }

    match upstream.responses.get(&code) {
        Some((status, body)) => (*status, Json(body.clone())),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": "false", "message": "unavailable" })),
        ),
    }
}

pub fn test_config(cwa_base_url: &str, timeout_ms: u64) -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/forecasts_test".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
        },
        cwa: CwaConfig {
            base_url: cwa_base_url.to_string(),
            api_key: CWA_KEY.to_string(),
            timeout_ms,
        },
        auth: AuthConfig {
            client_api_key: CLIENT_KEY.to_string(),
        },
    }
}

/// App state over a fresh in-memory store
pub fn memory_state(cwa_base_url: &str) -> (AppState, Arc<MemoryPartitionStore>) {
    let store = Arc::new(MemoryPartitionStore::new());
    let state = AppState::new(test_config(cwa_base_url, 2000), store.clone()).unwrap();
    (state, store)
}
