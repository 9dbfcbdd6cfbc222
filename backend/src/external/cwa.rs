//! CWA open data API client
//!
//! Fetches the township forecast dataset for one region and extracts a single
//! normalized forecast document. One attempt per call; retrying is up to the caller.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use shared::{ForecastDocument, Region};
use std::time::Duration;

use crate::config::CwaConfig;
use crate::error::{AppError, AppResult};

/// CWA API client
#[derive(Clone)]
pub struct CwaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Top-level CWA datastore response
#[derive(Debug, Deserialize)]
struct CwaResponse {
    records: Option<CwaRecords>,
}

#[derive(Debug, Deserialize)]
struct CwaRecords {
    /// Kept raw; only the first entry is parsed
    #[serde(rename = "Locations")]
    locations: Option<Vec<Value>>,
}

impl CwaClient {
    /// Create a new CwaClient from configuration
    pub fn new(config: &CwaConfig) -> AppResult<Self> {
        Self::with_base_url(
            config.api_key.clone(),
            config.base_url.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Create a new CwaClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the forecast for a region identifier.
    ///
    /// Unknown identifiers fail before any request is sent.
    pub async fn fetch(&self, region_id: &str) -> AppResult<ForecastDocument> {
        let region: Region = region_id.parse()?;
        self.fetch_region(region).await
    }

    /// Fetch the forecast dataset of a region
    pub async fn fetch_region(&self, region: Region) -> AppResult<ForecastDocument> {
        let url = format!("{}/v1/rest/datastore/{}", self.base_url, region.provider_code());
        tracing::debug!(%region, code = region.provider_code(), "Sending CWA API request");

        let response = self
            .client
            .get(&url)
            .query(&[("Authorization", self.api_key.as_str()), ("format", "JSON")])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%region, "CWA API request failed: {}", e);
                AppError::UpstreamUnavailable {
                    status: e.status().map(|s| s.as_u16()),
                    detail: if e.is_timeout() {
                        format!("CWA API request timed out: {}", e)
                    } else {
                        format!("CWA API request failed: {}", e)
                    },
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%region, %status, "CWA API error response");
            return Err(AppError::UpstreamUnavailable {
                status: Some(status.as_u16()),
                detail: format!("CWA API error: {} - {}", status, truncate(&body, 200)),
            });
        }

        let body = response.bytes().await.map_err(|e| AppError::UpstreamUnavailable {
            status: None,
            detail: format!("Failed to read CWA API response: {}", e),
        })?;

        let document = extract_document(&body)?;

        if !shared::region_label_matches(region, &document) {
            tracing::warn!(
                %region,
                label = document.region_label.as_str(),
                "CWA dataset label does not match the requested region"
            );
        }

        let unnamed = shared::unnamed_locations(&document);
        if unnamed > 0 {
            tracing::warn!(%region, unnamed, "CWA dataset has locations without a name");
        }

        tracing::debug!(
            %region,
            dataset = document.dataset_id.as_str(),
            locations = document.locations.len(),
            "CWA API response parsed"
        );

        Ok(document)
    }
}

/// Validate a raw datastore body and take its first `records.Locations` entry
pub fn extract_document(body: &[u8]) -> AppResult<ForecastDocument> {
    let data: CwaResponse = serde_json::from_slice(body).map_err(|e| {
        AppError::MalformedUpstreamResponse(format!("Failed to parse CWA response: {}", e))
    })?;

    let records = data
        .records
        .ok_or_else(|| AppError::MalformedUpstreamResponse("missing records".to_string()))?;

    let locations = records.locations.ok_or_else(|| {
        AppError::MalformedUpstreamResponse("missing records.Locations".to_string())
    })?;

    // A request covers a single region; further entries are not merged
    let first = locations.into_iter().next().ok_or_else(|| {
        AppError::MalformedUpstreamResponse("records.Locations is empty".to_string())
    })?;

    serde_json::from_value(first).map_err(|e| {
        AppError::MalformedUpstreamResponse(format!("Invalid records.Locations[0]: {}", e))
    })
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_first_locations_entry() {
        let body = json!({
            "success": "true",
            "records": {
                "Locations": [
                    {
                        "DatasetDescription": "臺灣各鄉鎮市區預報資料-臺北市鄉鎮天氣預報",
                        "LocationsName": "臺北市",
                        "Dataid": "D0047-063",
                        "Location": [{ "LocationName": "信義區", "WeatherElement": [] }]
                    },
                    { "LocationsName": "新北市", "Location": [] }
                ]
            }
        });

        let document = extract_document(body.to_string().as_bytes()).unwrap();
        assert_eq!(document.region_label, "臺北市");
        assert_eq!(document.location_names(), vec!["信義區"]);
    }

    #[test]
    fn test_invalid_trailing_entry_is_ignored() {
        let body = json!({
            "records": {
                "Locations": [
                    { "LocationsName": "臺北市", "Location": [{ "LocationName": "信義區" }] },
                    {
                        "LocationsName": "x",
                        "Location": [{ "LocationName": "y", "Latitude": { "bad": 1 } }]
                    }
                ]
            }
        });

        let document = extract_document(body.to_string().as_bytes()).unwrap();
        assert_eq!(document.region_label, "臺北市");
        assert_eq!(document.location_names(), vec!["信義區"]);
    }

    #[test]
    fn test_empty_location_list_is_accepted() {
        let body = json!({ "records": { "Locations": [{ "LocationsName": "臺北市", "Location": [] }] } });
        let document = extract_document(body.to_string().as_bytes()).unwrap();
        assert!(document.locations.is_empty());
    }

    #[test]
    fn test_missing_locations_is_malformed() {
        for body in [
            json!({ "success": "true" }),
            json!({ "records": {} }),
            json!({ "records": { "Locations": [] } }),
            json!({ "records": { "Locations": [{}] } }),
            json!({ "records": { "Locations": [{ "LocationsName": "臺北市" }] } }),
            json!({ "records": { "Locations": [{ "Location": [{ "Latitude": { "bad": 1 } }] }] } }),
        ] {
            let err = extract_document(body.to_string().as_bytes()).unwrap_err();
            assert!(matches!(err, AppError::MalformedUpstreamResponse(_)), "{:?}", body);
        }
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = extract_document(b"<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, AppError::MalformedUpstreamResponse(_)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("臺北市", 2), "臺北");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_unknown_region_fails_before_request() {
        // Unroutable base URL: reaching the network would yield UpstreamUnavailable
        let client = CwaClient::with_base_url(
            "key".to_string(),
            "http://127.0.0.1:9".to_string(),
            Duration::from_millis(100),
        )
        .unwrap();

        let err = client.fetch("unknownCity").await.unwrap_err();
        assert!(matches!(err, AppError::UnknownRegion(ref id) if id == "unknownCity"));
    }
}
