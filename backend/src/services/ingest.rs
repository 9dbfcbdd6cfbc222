//! Forecast ingestion
//!
//! Appends fetched documents to their region's partition. Every ingestion creates a
//! new record; nothing is overwritten, merged or deduplicated.

use shared::{ForecastDocument, ForecastRecord, IngestOutcome, Region};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::CwaClient;
use crate::services::partition::RegionPartitionRegistry;

/// Ingestion service for regional forecasts
#[derive(Clone)]
pub struct ForecastIngestor {
    registry: Arc<RegionPartitionRegistry>,
}

impl ForecastIngestor {
    /// Create a new ForecastIngestor instance
    pub fn new(registry: Arc<RegionPartitionRegistry>) -> Self {
        Self { registry }
    }

    /// Store a document as a new record in the region's partition
    pub async fn ingest(&self, region_id: &str, document: &ForecastDocument) -> AppResult<ForecastRecord> {
        let region: Region = region_id.parse()?;
        self.ingest_region(region, document).await
    }

    pub async fn ingest_region(
        &self,
        region: Region,
        document: &ForecastDocument,
    ) -> AppResult<ForecastRecord> {
        let partition = self.registry.partition(region).await?;
        let record = partition.append(document).await?;

        tracing::info!(
            %region,
            id = %record.id,
            created_at = %record.created_at,
            locations = record.document.locations.len(),
            "Stored forecast record"
        );

        Ok(record)
    }

    /// Fetch a region's forecast and store it.
    ///
    /// A failed fetch never reaches the store.
    pub async fn fetch_and_ingest(&self, fetcher: &CwaClient, region_id: &str) -> AppResult<ForecastRecord> {
        let region: Region = region_id.parse()?;
        self.fetch_and_ingest_region(fetcher, region).await
    }

    pub async fn fetch_and_ingest_region(
        &self,
        fetcher: &CwaClient,
        region: Region,
    ) -> AppResult<ForecastRecord> {
        let document = fetcher.fetch_region(region).await?;
        self.ingest_region(region, &document).await
    }

    /// Fetch and store several regions concurrently.
    ///
    /// All identifiers are resolved before any request goes out. Each region then
    /// succeeds or fails on its own; outcomes come back in request order.
    pub async fn fetch_and_ingest_many(
        &self,
        fetcher: &CwaClient,
        region_ids: &[String],
    ) -> AppResult<Vec<IngestOutcome>> {
        let regions = region_ids
            .iter()
            .map(|id| id.parse::<Region>())
            .collect::<Result<Vec<_>, _>>()?;

        let tasks: Vec<_> = regions
            .into_iter()
            .map(|region| {
                let ingestor = self.clone();
                let fetcher = fetcher.clone();
                tokio::spawn(async move {
                    match ingestor.fetch_and_ingest_region(&fetcher, region).await {
                        Ok(record) => IngestOutcome::stored(region, record.id, record.created_at),
                        Err(err) => {
                            tracing::warn!(%region, code = err.code(), "Forecast ingestion failed: {}", err);
                            IngestOutcome::failed(region, err.code(), err.to_string())
                        }
                    }
                })
            })
            .collect();

        // Joined in request order
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            let outcome = task
                .await
                .map_err(|e| AppError::Internal(format!("Ingestion task failed: {}", e)))?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
