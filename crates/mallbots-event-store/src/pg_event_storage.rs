//! `PostgreSQL` implementation of the `EventStorage` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use mallbots_core::error::DomainError;
use mallbots_core::event_store::{EventStorage, StoredEvent};

use crate::storage_error;

const EVENTS_PRIMARY_KEY: &str = "events_pkey";

#[derive(sqlx::FromRow)]
struct EventRow {
    stream_id: String,
    stream_name: String,
    stream_version: i64,
    event_id: Uuid,
    event_name: String,
    event_data: serde_json::Value,
    metadata: serde_json::Value,
    occurred_at: DateTime<Utc>,
}

impl From<EventRow> for StoredEvent {
    fn from(row: EventRow) -> Self {
        Self {
            event_id: row.event_id,
            event_name: row.event_name,
            aggregate_id: row.stream_id,
            aggregate_name: row.stream_name,
            aggregate_version: row.stream_version,
            payload: row.event_data,
            metadata: row.metadata,
            occurred_at: row.occurred_at,
        }
    }
}

/// PostgreSQL-backed event log over the `events` table.
#[derive(Debug, Clone)]
pub struct PgEventStorage {
    pool: PgPool,
}

impl PgEventStorage {
    /// Creates a new `PgEventStorage`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn head<'e, E>(
        executor: E,
        aggregate_name: &str,
        aggregate_id: &str,
    ) -> Result<i64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COALESCE(MAX(stream_version), 0)
            FROM events
            WHERE stream_id = $1 AND stream_name = $2
            ",
        )
        .bind(aggregate_id)
        .bind(aggregate_name)
        .fetch_one(executor)
        .await
    }

    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        event: &StoredEvent,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO events (
                stream_id, stream_name, stream_version,
                event_id, event_name, event_data, metadata, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(&event.aggregate_id)
        .bind(&event.aggregate_name)
        .bind(event.aggregate_version)
        .bind(event.event_id)
        .bind(&event.event_name)
        .bind(&event.payload)
        .bind(&event.metadata)
        .bind(event.occurred_at)
        .execute(&mut **tx)
        .await
        .map(|_| ())
    }

    /// Re-reads the head after a concurrent writer won the race for a version.
    async fn conflict(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        expected_version: i64,
    ) -> DomainError {
        match Self::head(&self.pool, aggregate_name, aggregate_id).await {
            Ok(actual) => DomainError::ConcurrencyConflict {
                aggregate_id: aggregate_id.to_owned(),
                expected: expected_version,
                actual,
            },
            Err(err) => storage_error(err),
        }
    }
}

fn is_version_collision(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db| {
        db.is_unique_violation() && db.constraint() == Some(EVENTS_PRIMARY_KEY)
    })
}

#[async_trait]
impl EventStorage for PgEventStorage {
    #[instrument(skip(self))]
    async fn load_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        after_version: i64,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        let rows = sqlx::query_as::<_, EventRow>(
            r"
            SELECT stream_id, stream_name, stream_version,
                   event_id, event_name, event_data, metadata, occurred_at
            FROM events
            WHERE stream_id = $1 AND stream_name = $2 AND stream_version > $3
            ORDER BY stream_version ASC
            ",
        )
        .bind(aggregate_id)
        .bind(aggregate_name)
        .bind(after_version)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        debug!(loaded = rows.len(), "loaded events");
        Ok(rows.into_iter().map(StoredEvent::from).collect())
    }

    #[instrument(skip(self, events), fields(event_count = events.len()))]
    async fn append_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let actual = Self::head(&mut *tx, aggregate_name, aggregate_id)
            .await
            .map_err(storage_error)?;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id: aggregate_id.to_owned(),
                expected: expected_version,
                actual,
            });
        }

        for event in events {
            if let Err(err) = Self::insert(&mut tx, event).await {
                if is_version_collision(&err) {
                    drop(tx);
                    return Err(self
                        .conflict(aggregate_name, aggregate_id, expected_version)
                        .await);
                }
                return Err(storage_error(err));
            }
        }

        tx.commit().await.map_err(storage_error)?;
        debug!(appended = events.len(), "appended events");
        Ok(())
    }
}
