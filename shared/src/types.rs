//! Common types used across the service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::region::Region;

/// Result of one region's fetch-and-store during a batch ingestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub region: Region,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestOutcome {
    pub fn stored(region: Region, record_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            region,
            success: true,
            record_id: Some(record_id),
            created_at: Some(created_at),
            error_code: None,
            error: None,
        }
    }

    pub fn failed(region: Region, error_code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            region,
            success: false,
            record_id: None,
            created_at: None,
            error_code: Some(error_code.into()),
            error: Some(error.into()),
        }
    }
}

/// Size and freshness of a region's partition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartitionStats {
    pub region: Region,
    pub partition: String,
    pub record_count: u64,
    pub latest_created_at: Option<DateTime<Utc>>,
}

/// Batch ingestion request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchIngestRequest {
    pub regions: Vec<String>,
}
