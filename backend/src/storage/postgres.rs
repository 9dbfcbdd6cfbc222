//! PostgreSQL partition store
//!
//! Each region gets its own table. Table names come from the closed region table,
//! never from client input, so they are interpolated into SQL directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{ForecastDocument, ForecastRecord, LocationRecord, PartitionStats, Region};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::storage::PartitionStore;

/// Partition store backed by one PostgreSQL table per region
#[derive(Clone)]
pub struct PgPartitionStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct ForecastRow {
    id: Uuid,
    description: String,
    region_label: String,
    dataset_id: String,
    locations: Json<Vec<LocationRecord>>,
    created_at: DateTime<Utc>,
}

impl ForecastRow {
    fn into_record(self, region: Region) -> ForecastRecord {
        ForecastRecord {
            id: self.id,
            region,
            created_at: self.created_at,
            document: ForecastDocument {
                description: self.description,
                region_label: self.region_label,
                dataset_id: self.dataset_id,
                locations: self.locations.0,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct StatsRow {
    record_count: i64,
    latest_created_at: Option<DateTime<Utc>>,
}

impl PgPartitionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            seq BIGSERIAL PRIMARY KEY,
            id UUID NOT NULL UNIQUE,
            description TEXT NOT NULL,
            region_label TEXT NOT NULL,
            dataset_id TEXT NOT NULL,
            locations JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
        )
        "#
    )
}

fn create_index_sql(table: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {table}_recency_idx ON {table} (created_at DESC, seq DESC)"
    )
}

#[async_trait]
impl PartitionStore for PgPartitionStore {
    async fn provision(&self, region: Region) -> AppResult<()> {
        let table = region.partition_name();
        let mut tx = self.db.begin().await?;

        // CREATE TABLE IF NOT EXISTS races on the catalog when two servers start together
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(table)
            .execute(&mut *tx)
            .await?;

        sqlx::query(&create_table_sql(table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&create_index_sql(table))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn append(&self, region: Region, document: &ForecastDocument) -> AppResult<ForecastRecord> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, description, region_label, dataset_id, locations)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, description, region_label, dataset_id, locations, created_at
            "#,
            region.partition_name()
        );

        let row = sqlx::query_as::<_, ForecastRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&document.description)
            .bind(&document.region_label)
            .bind(&document.dataset_id)
            .bind(Json(&document.locations))
            .fetch_one(&self.db)
            .await?;

        Ok(row.into_record(region))
    }

    async fn latest(&self, region: Region) -> AppResult<Option<ForecastRecord>> {
        let sql = format!(
            r#"
            SELECT id, description, region_label, dataset_id, locations, created_at
            FROM {}
            ORDER BY created_at DESC, seq DESC
            LIMIT 1
            "#,
            region.partition_name()
        );

        let row = sqlx::query_as::<_, ForecastRow>(&sql)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(|row| row.into_record(region)))
    }

    async fn stats(&self, region: Region) -> AppResult<PartitionStats> {
        let sql = format!(
            "SELECT COUNT(*) AS record_count, MAX(created_at) AS latest_created_at FROM {}",
            region.partition_name()
        );

        let row = sqlx::query_as::<_, StatsRow>(&sql)
            .fetch_one(&self.db)
            .await?;

        Ok(PartitionStats {
            region,
            partition: region.partition_name().to_string(),
            record_count: u64::try_from(row.record_count)
                .map_err(|_| AppError::Internal("Negative record count".to_string()))?,
            latest_created_at: row.latest_created_at,
        })
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
