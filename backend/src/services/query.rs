//! Latest-forecast queries

use shared::{ForecastRecord, PartitionStats, Region};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::services::partition::RegionPartitionRegistry;

/// Read side of the forecast partitions
#[derive(Clone)]
pub struct ForecastQueryService {
    registry: Arc<RegionPartitionRegistry>,
}

impl ForecastQueryService {
    /// Create a new ForecastQueryService instance
    pub fn new(registry: Arc<RegionPartitionRegistry>) -> Self {
        Self { registry }
    }

    /// Newest record for a region, optionally narrowed to matching locations.
    ///
    /// The filter is a case-sensitive substring of the location name. An empty
    /// partition yields `NoDataForRegion`; a filter that matches nothing yields
    /// `NoMatchingLocation`. The stored record is never modified.
    pub async fn latest(
        &self,
        region_id: &str,
        location_filter: Option<&str>,
    ) -> AppResult<ForecastRecord> {
        let region: Region = region_id.parse()?;
        let partition = self.registry.partition(region).await?;

        let record = partition
            .latest()
            .await?
            .ok_or_else(|| AppError::NoDataForRegion(region.id().to_string()))?;

        let Some(filter) = location_filter else {
            return Ok(record);
        };

        let document = record
            .document
            .with_locations_matching(filter)
            .ok_or_else(|| AppError::NoMatchingLocation {
                region: region.id().to_string(),
                filter: filter.to_string(),
            })?;

        tracing::debug!(
            %region,
            filter,
            matched = document.locations.len(),
            "Filtered latest forecast"
        );

        Ok(ForecastRecord { document, ..record })
    }

    pub async fn stats(&self, region_id: &str) -> AppResult<PartitionStats> {
        let partition = self.registry.partition_for(region_id).await?;
        partition.stats().await
    }

    /// Stats for every partition provisioned so far
    pub async fn provisioned_stats(&self) -> AppResult<Vec<PartitionStats>> {
        let mut stats = Vec::new();
        for region in self.registry.provisioned() {
            let partition = self.registry.partition(region).await?;
            stats.push(partition.stats().await?);
        }
        Ok(stats)
    }
}
