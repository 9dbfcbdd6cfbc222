//! Region partition registry
//!
//! Maps every region to its storage partition. Partitions are provisioned on first
//! use and the handle is cached for the life of the process. Each region has its own
//! initialization cell, so provisioning one region never waits on another.

use shared::{ForecastDocument, ForecastRecord, PartitionStats, Region};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::{AppError, AppResult};
use crate::storage::PartitionStore;

/// Handle to the partition holding one region's forecast records
pub struct Partition {
    region: Region,
    store: Arc<dyn PartitionStore>,
}

impl Partition {
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn name(&self) -> &'static str {
        self.region.partition_name()
    }

    /// Append a new record; never touches existing ones
    pub async fn append(&self, document: &ForecastDocument) -> AppResult<ForecastRecord> {
        self.store.append(self.region, document).await
    }

    pub async fn latest(&self) -> AppResult<Option<ForecastRecord>> {
        self.store.latest(self.region).await
    }

    pub async fn stats(&self) -> AppResult<PartitionStats> {
        self.store.stats(self.region).await
    }
}

impl std::fmt::Debug for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition")
            .field("region", &self.region)
            .field("name", &self.name())
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

/// Registry of region partitions
pub struct RegionPartitionRegistry {
    store: Arc<dyn PartitionStore>,
    cells: HashMap<Region, OnceCell<Arc<Partition>>>,
}

impl RegionPartitionRegistry {
    pub fn new(store: Arc<dyn PartitionStore>) -> Self {
        let cells = Region::ALL
            .iter()
            .map(|region| (*region, OnceCell::new()))
            .collect();

        Self { store, cells }
    }

    /// Partition for a region identifier such as `taipeiCity`
    pub async fn partition_for(&self, region_id: &str) -> AppResult<Arc<Partition>> {
        let region: Region = region_id.parse()?;
        self.partition(region).await
    }

    /// Partition for a region, provisioning it on first access.
    ///
    /// Concurrent first calls share a single provisioning run and all receive the
    /// same handle. A failed run leaves the cell empty so the next call tries again.
    pub async fn partition(&self, region: Region) -> AppResult<Arc<Partition>> {
        let cell = self
            .cells
            .get(&region)
            .ok_or_else(|| AppError::UnknownRegion(region.id().to_string()))?;

        let partition = cell
            .get_or_try_init(|| async {
                self.store.provision(region).await?;
                tracing::info!(
                    %region,
                    partition = region.partition_name(),
                    backend = self.store.backend_name(),
                    "Provisioned region partition"
                );
                Ok::<_, AppError>(Arc::new(Partition {
                    region,
                    store: Arc::clone(&self.store),
                }))
            })
            .await?;

        Ok(Arc::clone(partition))
    }

    /// Regions whose partitions have been provisioned by this process
    pub fn provisioned(&self) -> Vec<Region> {
        Region::ALL
            .iter()
            .copied()
            .filter(|region| {
                self.cells
                    .get(region)
                    .map(|cell| cell.initialized())
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn store(&self) -> &Arc<dyn PartitionStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPartitionStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_concurrent_first_access_yields_one_partition() {
        let store = Arc::new(MemoryPartitionStore::new());
        let registry = Arc::new(RegionPartitionRegistry::new(store.clone()));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.partition_for("taipeiCity").await.unwrap()
            }));
        }

        let mut partitions = Vec::new();
        for handle in handles {
            partitions.push(handle.await.unwrap());
        }

        let first = &partitions[0];
        assert!(partitions.iter().all(|p| Arc::ptr_eq(p, first)));
        assert_eq!(first.name(), "forecasts_taipei_city");
        assert_eq!(store.provision_count(Region::TaipeiCity).await, 1);
        assert_eq!(registry.provisioned(), vec![Region::TaipeiCity]);
    }

    #[tokio::test]
    async fn test_unknown_region_is_rejected() {
        let registry = RegionPartitionRegistry::new(Arc::new(MemoryPartitionStore::new()));
        let err = registry.partition_for("unknownCity").await.unwrap_err();
        assert!(matches!(err, AppError::UnknownRegion(_)));
        assert!(registry.provisioned().is_empty());
    }

    /// Store whose first provisioning attempt fails
    struct FlakyStore {
        inner: MemoryPartitionStore,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl PartitionStore for FlakyStore {
        async fn provision(&self, region: Region) -> AppResult<()> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(AppError::StoreUnavailable("connection refused".to_string()));
            }
            self.inner.provision(region).await
        }

        async fn append(
            &self,
            region: Region,
            document: &ForecastDocument,
        ) -> AppResult<ForecastRecord> {
            self.inner.append(region, document).await
        }

        async fn latest(&self, region: Region) -> AppResult<Option<ForecastRecord>> {
            self.inner.latest(region).await
        }

        async fn stats(&self, region: Region) -> AppResult<PartitionStats> {
            self.inner.stats(region).await
        }

        async fn ping(&self) -> AppResult<()> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn test_failed_provisioning_is_retried() {
        let registry = RegionPartitionRegistry::new(Arc::new(FlakyStore {
            inner: MemoryPartitionStore::new(),
            attempts: AtomicUsize::new(0),
        }));

        let err = registry.partition(Region::TainanCity).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
        assert!(registry.provisioned().is_empty());

        let partition = registry.partition(Region::TainanCity).await.unwrap();
        assert_eq!(partition.region(), Region::TainanCity);
        assert_eq!(registry.provisioned(), vec![Region::TainanCity]);
    }
}
