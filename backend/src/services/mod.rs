//! Business logic services for the forecast service

pub mod ingest;
pub mod partition;
pub mod query;

pub use ingest::ForecastIngestor;
pub use partition::{Partition, RegionPartitionRegistry};
pub use query::ForecastQueryService;
