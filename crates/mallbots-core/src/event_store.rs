//! Durable event log adapter.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::aggregate::EventSourced;
use crate::error::DomainError;
use crate::event::{Event, Metadata};
use crate::registry::Registry;
use crate::replay;
use crate::store::AggregateStore;

/// Stored representation of a domain event.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Event name for deserialization routing.
    pub event_name: String,
    /// Aggregate this event belongs to.
    pub aggregate_id: String,
    /// Aggregate type name.
    pub aggregate_name: String,
    /// Version within the aggregate stream.
    pub aggregate_version: i64,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Serialized event metadata.
    pub metadata: serde_json::Value,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Durable, append-only event log.
///
/// Streams are keyed by aggregate name and ID.
#[async_trait]
pub trait EventStorage: Send + Sync {
    /// Loads every event of a stream with a version greater than
    /// `after_version`, ordered by version.
    async fn load_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        after_version: i64,
    ) -> Result<Vec<StoredEvent>, DomainError>;

    /// Appends events to a stream with optimistic concurrency.
    ///
    /// Succeeds only if the stream's head version equals `expected_version`;
    /// otherwise nothing is written and `DomainError::ConcurrencyConflict` is
    /// returned. The append is atomic.
    async fn append_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;
}

/// Innermost store adapter over an [`EventStorage`].
pub struct EventStore<T> {
    storage: Arc<dyn EventStorage>,
    registry: Arc<Registry>,
    _aggregate: PhantomData<fn() -> T>,
}

impl<T> EventStore<T> {
    /// Creates a new `EventStore`.
    #[must_use]
    pub fn new(storage: Arc<dyn EventStorage>, registry: Arc<Registry>) -> Self {
        Self {
            storage,
            registry,
            _aggregate: PhantomData,
        }
    }
}

impl<T: EventSourced> EventStore<T> {
    fn encode(&self, event: &Event<T::Payload>) -> Result<StoredEvent, DomainError> {
        let payload = self.registry.serialize(event.name(), event.payload())?;
        let metadata = serde_json::to_value(event.metadata()).map_err(|e| {
            DomainError::Infrastructure(format!("event metadata serialization failed: {e}"))
        })?;
        Ok(StoredEvent {
            event_id: event.id(),
            event_name: event.name().to_owned(),
            aggregate_id: event.aggregate_id().to_owned(),
            aggregate_name: event.aggregate_name().to_owned(),
            aggregate_version: event.aggregate_version(),
            payload,
            metadata,
            occurred_at: event.occurred_at(),
        })
    }

    fn decode(&self, stored: StoredEvent) -> Result<Event<T::Payload>, DomainError> {
        let payload = self.registry.deserialize(&stored.event_name, stored.payload)?;
        let metadata: Metadata = match stored.metadata {
            serde_json::Value::Null => Metadata::new(),
            value => serde_json::from_value(value).map_err(|e| {
                DomainError::ReplayContract(format!(
                    "metadata of `{}` does not decode: {e}",
                    stored.event_name
                ))
            })?,
        };
        Ok(Event::restore(
            stored.event_id,
            stored.event_name,
            stored.aggregate_id,
            stored.aggregate_name,
            stored.aggregate_version,
            payload,
            metadata,
            stored.occurred_at,
        ))
    }
}

#[async_trait]
impl<T: EventSourced> AggregateStore<T> for EventStore<T> {
    #[instrument(skip_all, fields(aggregate_name = %aggregate.aggregate_name(), aggregate_id = %aggregate.id()))]
    async fn load(&self, aggregate: &mut T) -> Result<(), DomainError> {
        let aggregate_name = aggregate.aggregate_name().to_owned();
        let aggregate_id = aggregate.id().to_owned();
        let after_version = aggregate.version();

        let stored = self
            .storage
            .load_events(&aggregate_name, &aggregate_id, after_version)
            .await?;
        if stored.is_empty() && after_version == 0 {
            return Err(DomainError::AggregateNotFound {
                aggregate_name,
                aggregate_id,
            });
        }

        let count = stored.len();
        for record in stored {
            let event = self.decode(record)?;
            replay::load_event(aggregate, &event)?;
        }
        debug!(
            replayed = count,
            from_version = after_version,
            version = aggregate.version(),
            "replayed events"
        );
        Ok(())
    }

    #[instrument(skip_all, fields(aggregate_name = %aggregate.aggregate_name(), aggregate_id = %aggregate.id(), expected_version = aggregate.version()))]
    async fn save(&self, aggregate: &T) -> Result<(), DomainError> {
        let events = aggregate.events();
        if events.is_empty() {
            return Ok(());
        }

        let records = events
            .iter()
            .map(|event| self.encode(event))
            .collect::<Result<Vec<_>, _>>()?;

        self.storage
            .append_events(
                aggregate.aggregate_name(),
                aggregate.id(),
                aggregate.version(),
                &records,
            )
            .await?;
        debug!(appended = records.len(), "appended events");
        Ok(())
    }
}
