//! In-process partition store
//!
//! Same append-only and recency semantics as the PostgreSQL store, without
//! persistence. Used for local runs (`storage.backend = "memory"`) and tests.

use async_trait::async_trait;
use chrono::Utc;
use shared::{ForecastDocument, ForecastRecord, PartitionStats, Region};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::storage::PartitionStore;

#[derive(Default)]
struct Partitions {
    /// Records per region with their insertion sequence number
    records: HashMap<Region, Vec<(u64, ForecastRecord)>>,
    /// How many times each region was provisioned
    provisions: HashMap<Region, usize>,
    next_seq: u64,
}

/// Partition store kept in memory
#[derive(Default)]
pub struct MemoryPartitionStore {
    inner: RwLock<Partitions>,
}

impl MemoryPartitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of provisioning calls seen for a region
    pub async fn provision_count(&self, region: Region) -> usize {
        self.inner
            .read()
            .await
            .provisions
            .get(&region)
            .copied()
            .unwrap_or(0)
    }

    /// Number of records stored across all partitions
    pub async fn total_records(&self) -> usize {
        self.inner.read().await.records.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl PartitionStore for MemoryPartitionStore {
    async fn provision(&self, region: Region) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        *inner.provisions.entry(region).or_insert(0) += 1;
        inner.records.entry(region).or_default();
        Ok(())
    }

    async fn append(&self, region: Region, document: &ForecastDocument) -> AppResult<ForecastRecord> {
        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let record = ForecastRecord {
            id: Uuid::new_v4(),
            region,
            created_at: Utc::now(),
            document: document.clone(),
        };

        inner
            .records
            .get_mut(&region)
            .ok_or_else(|| {
                AppError::StoreUnavailable(format!(
                    "partition {} is not provisioned",
                    region.partition_name()
                ))
            })?
            .push((seq, record.clone()));

        Ok(record)
    }

    async fn latest(&self, region: Region) -> AppResult<Option<ForecastRecord>> {
        let inner = self.inner.read().await;
        let latest = inner.records.get(&region).and_then(|records| {
            records
                .iter()
                .max_by_key(|(seq, record)| (record.created_at, *seq))
                .map(|(_, record)| record.clone())
        });
        Ok(latest)
    }

    async fn stats(&self, region: Region) -> AppResult<PartitionStats> {
        let inner = self.inner.read().await;
        let records = inner.records.get(&region);

        Ok(PartitionStats {
            region,
            partition: region.partition_name().to_string(),
            record_count: records.map(|r| r.len() as u64).unwrap_or(0),
            latest_created_at: records
                .and_then(|r| r.iter().map(|(_, record)| record.created_at).max()),
        })
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
