//! Forecast storage
//!
//! One partition per region. Records are append-only; the newest record is the one
//! with the greatest `created_at`, ties going to the later insert.

use async_trait::async_trait;
use shared::{ForecastDocument, ForecastRecord, PartitionStats, Region};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryPartitionStore;
pub use postgres::PgPartitionStore;

/// Backing store for regional forecast partitions
#[async_trait]
pub trait PartitionStore: Send + Sync {
    /// Create the region's partition if it does not exist yet.
    ///
    /// Safe to call repeatedly and from several processes at once.
    async fn provision(&self, region: Region) -> AppResult<()>;

    /// Append a new record; the store assigns id and creation time
    async fn append(&self, region: Region, document: &ForecastDocument) -> AppResult<ForecastRecord>;

    /// Newest record in the partition, if any
    async fn latest(&self, region: Region) -> AppResult<Option<ForecastRecord>>;

    async fn stats(&self, region: Region) -> AppResult<PartitionStats>;

    /// Connectivity check
    async fn ping(&self) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}
