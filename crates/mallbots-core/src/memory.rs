//! In-memory storage backends.
//!
//! Reference implementations of [`EventStorage`] and [`SnapshotStorage`] for
//! tests, examples and single-process deployments without a database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::instrument;

use crate::error::DomainError;
use crate::event_store::{EventStorage, StoredEvent};
use crate::snapshot_store::{SnapshotStorage, StoredSnapshot};

type StreamKey = (String, String);

fn stream_key(aggregate_name: &str, aggregate_id: &str) -> StreamKey {
    (aggregate_name.to_owned(), aggregate_id.to_owned())
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::Infrastructure("in-memory storage lock poisoned".into())
}

/// Event log kept in a hash map of streams.
#[derive(Debug, Default)]
pub struct InMemoryEventStorage {
    streams: RwLock<HashMap<StreamKey, Vec<StoredEvent>>>,
}

impl InMemoryEventStorage {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every event of one stream.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn stream(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams
            .get(&stream_key(aggregate_name, aggregate_id))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl EventStorage for InMemoryEventStorage {
    async fn load_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        after_version: i64,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams
            .get(&stream_key(aggregate_name, aggregate_id))
            .map(|stream| {
                stream
                    .iter()
                    .filter(|event| event.aggregate_version > after_version)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self, events), fields(event_count = events.len()))]
    async fn append_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        for (offset, event) in (1_i64..).zip(events) {
            if event.aggregate_version != expected_version + offset {
                return Err(DomainError::Infrastructure(format!(
                    "event {} has version {}, expected {}",
                    event.event_id,
                    event.aggregate_version,
                    expected_version + offset
                )));
            }
        }

        let mut streams = self.streams.write().map_err(poisoned)?;
        let stream = streams
            .entry(stream_key(aggregate_name, aggregate_id))
            .or_default();
        let head = stream.last().map_or(0, |event| event.aggregate_version);
        if head != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id: aggregate_id.to_owned(),
                expected: expected_version,
                actual: head,
            });
        }
        stream.extend_from_slice(events);
        Ok(())
    }
}

/// Snapshot storage keeping the newest snapshot per aggregate.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStorage {
    snapshots: RwLock<HashMap<StreamKey, StoredSnapshot>>,
}

impl InMemorySnapshotStorage {
    /// Creates an empty snapshot storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStorage for InMemorySnapshotStorage {
    async fn load_snapshot(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
    ) -> Result<Option<StoredSnapshot>, DomainError> {
        let snapshots = self.snapshots.read().map_err(poisoned)?;
        Ok(snapshots
            .get(&stream_key(aggregate_name, aggregate_id))
            .cloned())
    }

    async fn save_snapshot(&self, snapshot: StoredSnapshot) -> Result<(), DomainError> {
        let mut snapshots = self.snapshots.write().map_err(poisoned)?;
        let key = stream_key(&snapshot.aggregate_name, &snapshot.aggregate_id);
        let newer = snapshots
            .get(&key)
            .is_none_or(|existing| existing.aggregate_version < snapshot.aggregate_version);
        if newer {
            snapshots.insert(key, snapshot);
        }
        Ok(())
    }
}
