//! `PostgreSQL` implementation of the `SnapshotStorage` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use mallbots_core::error::DomainError;
use mallbots_core::snapshot_store::{SnapshotStorage, StoredSnapshot};

use crate::storage_error;

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    stream_id: String,
    stream_name: String,
    stream_version: i64,
    snapshot_name: String,
    snapshot_data: serde_json::Value,
    updated_at: DateTime<Utc>,
}

impl From<SnapshotRow> for StoredSnapshot {
    fn from(row: SnapshotRow) -> Self {
        Self {
            aggregate_id: row.stream_id,
            aggregate_name: row.stream_name,
            aggregate_version: row.stream_version,
            snapshot_name: row.snapshot_name,
            payload: row.snapshot_data,
            taken_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed snapshot storage keeping one row per aggregate.
#[derive(Debug, Clone)]
pub struct PgSnapshotStorage {
    pool: PgPool,
}

impl PgSnapshotStorage {
    /// Creates a new `PgSnapshotStorage`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStorage for PgSnapshotStorage {
    #[instrument(skip(self))]
    async fn load_snapshot(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
    ) -> Result<Option<StoredSnapshot>, DomainError> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r"
            SELECT stream_id, stream_name, stream_version,
                   snapshot_name, snapshot_data, updated_at
            FROM snapshots
            WHERE stream_id = $1 AND stream_name = $2
            ",
        )
        .bind(aggregate_id)
        .bind(aggregate_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        debug!(found = row.is_some(), "snapshot lookup");
        Ok(row.map(StoredSnapshot::from))
    }

    #[instrument(skip_all, fields(aggregate_name = %snapshot.aggregate_name, aggregate_id = %snapshot.aggregate_id, version = snapshot.aggregate_version))]
    async fn save_snapshot(&self, snapshot: StoredSnapshot) -> Result<(), DomainError> {
        // An older snapshot never replaces a newer one.
        let result = sqlx::query(
            r"
            INSERT INTO snapshots (
                stream_id, stream_name, stream_version,
                snapshot_name, snapshot_data, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (stream_id, stream_name)
            DO UPDATE SET
                stream_version = EXCLUDED.stream_version,
                snapshot_name = EXCLUDED.snapshot_name,
                snapshot_data = EXCLUDED.snapshot_data,
                updated_at = EXCLUDED.updated_at
            WHERE snapshots.stream_version < EXCLUDED.stream_version
            ",
        )
        .bind(&snapshot.aggregate_id)
        .bind(&snapshot.aggregate_name)
        .bind(snapshot.aggregate_version)
        .bind(&snapshot.snapshot_name)
        .bind(&snapshot.payload)
        .bind(snapshot.taken_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        debug!(stored = result.rows_affected() > 0, "snapshot offered");
        Ok(())
    }
}
