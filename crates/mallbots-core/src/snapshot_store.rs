//! Snapshot store middleware.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::aggregate::EventSourced;
use crate::error::DomainError;
use crate::registry::Registry;
use crate::replay;
use crate::snapshot::{Snapshot, SnapshotPolicy, Snapshotter};
use crate::store::{AggregateStore, AggregateStoreMiddleware};

/// Stored representation of an aggregate snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    /// Aggregate this snapshot belongs to.
    pub aggregate_id: String,
    /// Aggregate type name.
    pub aggregate_name: String,
    /// Version of the aggregate captured by the snapshot.
    pub aggregate_version: i64,
    /// Snapshot name for deserialization routing.
    pub snapshot_name: String,
    /// Serialized snapshot payload.
    pub payload: serde_json::Value,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

/// Storage for the latest snapshot of each aggregate.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Loads the most recent snapshot of an aggregate, if any.
    async fn load_snapshot(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
    ) -> Result<Option<StoredSnapshot>, DomainError>;

    /// Stores a snapshot, replacing any older one for the same aggregate.
    async fn save_snapshot(&self, snapshot: StoredSnapshot) -> Result<(), DomainError>;
}

/// Store layer that restores from, and periodically writes, snapshots.
///
/// Snapshot reads and writes are an optimization: an unavailable backend
/// degrades to full replay on load and to no snapshot on save. A snapshot that
/// is present but cannot be decoded is a replay contract violation and fails
/// the load.
pub struct SnapshotStore<T> {
    next: Arc<dyn AggregateStore<T>>,
    storage: Arc<dyn SnapshotStorage>,
    registry: Arc<Registry>,
    policy: SnapshotPolicy,
    _aggregate: PhantomData<fn() -> T>,
}

impl<T: Snapshotter> SnapshotStore<T> {
    /// Creates a new `SnapshotStore` wrapping `next`.
    #[must_use]
    pub fn new(
        next: Arc<dyn AggregateStore<T>>,
        storage: Arc<dyn SnapshotStorage>,
        registry: Arc<Registry>,
        policy: SnapshotPolicy,
    ) -> Self {
        Self {
            next,
            storage,
            registry,
            policy,
            _aggregate: PhantomData,
        }
    }

    /// Returns a middleware that inserts a `SnapshotStore` into a chain.
    #[must_use]
    pub fn middleware(
        storage: Arc<dyn SnapshotStorage>,
        registry: Arc<Registry>,
        policy: SnapshotPolicy,
    ) -> AggregateStoreMiddleware<T> {
        Box::new(move |next| Arc::new(Self::new(next, storage, registry, policy)))
    }

    async fn write_snapshot(&self, aggregate: &T) -> Result<(), DomainError> {
        let snapshot = aggregate.to_snapshot();
        let snapshot_name = snapshot.snapshot_name();
        let payload = self.registry.serialize(snapshot_name, &snapshot)?;
        self.storage
            .save_snapshot(StoredSnapshot {
                aggregate_id: aggregate.id().to_owned(),
                aggregate_name: aggregate.aggregate_name().to_owned(),
                aggregate_version: aggregate.pending_version(),
                snapshot_name: snapshot_name.to_owned(),
                payload,
                taken_at: Utc::now(),
            })
            .await
    }
}

#[async_trait]
impl<T: Snapshotter> AggregateStore<T> for SnapshotStore<T> {
    #[instrument(skip_all, fields(aggregate_name = %aggregate.aggregate_name(), aggregate_id = %aggregate.id()))]
    async fn load(&self, aggregate: &mut T) -> Result<(), DomainError> {
        match self
            .storage
            .load_snapshot(aggregate.aggregate_name(), aggregate.id())
            .await
        {
            Ok(Some(stored)) => {
                let snapshot: T::Snapshot = self
                    .registry
                    .deserialize(&stored.snapshot_name, stored.payload)?;
                replay::load_snapshot(aggregate, &snapshot, stored.aggregate_version)?;
                debug!(version = stored.aggregate_version, "restored snapshot");
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "snapshot unavailable, replaying full history");
            }
        }

        self.next.load(aggregate).await
    }

    #[instrument(skip_all, fields(aggregate_name = %aggregate.aggregate_name(), aggregate_id = %aggregate.id()))]
    async fn save(&self, aggregate: &T) -> Result<(), DomainError> {
        self.next.save(aggregate).await?;

        if !self
            .policy
            .should_snapshot(aggregate.version(), aggregate.pending_version())
        {
            return Ok(());
        }

        match self.write_snapshot(aggregate).await {
            Ok(()) => debug!(version = aggregate.pending_version(), "wrote snapshot"),
            Err(err) => warn!(error = %err, "snapshot write failed"),
        }
        Ok(())
    }
}
