//! Domain event abstractions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::entity::Entity;

/// Free-form metadata attached to an event.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Metadata key holding the correlation ID of the command that produced an
/// event.
pub const CORRELATION_ID: &str = "correlation_id";

/// Trait implemented by each aggregate's closed set of event payloads.
///
/// Payloads are opaque to the engine; only the aggregate's own apply logic and
/// the registry's serialization boundary look inside them.
pub trait EventPayload:
    Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

impl<T> EventPayload for T where
    T: Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

/// Options accepted when an aggregate records a new event.
#[derive(Debug, Clone)]
pub enum EventOption {
    /// Use this event ID instead of a random one.
    Id(Uuid),
    /// Use this timestamp instead of the current time.
    OccurredAt(DateTime<Utc>),
    /// Attach a metadata entry.
    Metadata(String, serde_json::Value),
}

/// An immutable fact about a state change of one aggregate.
///
/// `aggregate_version` is the position the event occupies in its aggregate's
/// history. It is assigned when the event is recorded and never renumbered.
#[derive(Debug, Clone)]
pub struct Event<P> {
    id: Uuid,
    name: String,
    aggregate_id: String,
    aggregate_name: String,
    aggregate_version: i64,
    payload: P,
    metadata: Metadata,
    occurred_at: DateTime<Utc>,
}

impl<P> Event<P> {
    /// Records a new event for `entity` at `aggregate_version`.
    pub(crate) fn record(
        entity: &Entity,
        name: String,
        payload: P,
        aggregate_version: i64,
        options: impl IntoIterator<Item = EventOption>,
    ) -> Self {
        let mut event = Self {
            id: Uuid::new_v4(),
            name,
            aggregate_id: entity.id().to_owned(),
            aggregate_name: entity.name().to_owned(),
            aggregate_version,
            payload,
            metadata: Metadata::new(),
            occurred_at: Utc::now(),
        };
        for option in options {
            match option {
                EventOption::Id(id) => event.id = id,
                EventOption::OccurredAt(at) => event.occurred_at = at,
                EventOption::Metadata(key, value) => {
                    event.metadata.insert(key, value);
                }
            }
        }
        event
    }

    /// Rebuilds an event read back from durable storage.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: Uuid,
        name: String,
        aggregate_id: String,
        aggregate_name: String,
        aggregate_version: i64,
        payload: P,
        metadata: Metadata,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            aggregate_id,
            aggregate_name,
            aggregate_version,
            payload,
            metadata,
            occurred_at,
        }
    }

    /// Returns the event identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the event name, e.g. `stores.StoreCreated`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identifier of the aggregate that produced this event.
    #[must_use]
    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    /// Returns the type name of the aggregate that produced this event.
    #[must_use]
    pub fn aggregate_name(&self) -> &str {
        &self.aggregate_name
    }

    /// Returns the version this event occupies in its aggregate's history.
    #[must_use]
    pub fn aggregate_version(&self) -> i64 {
        self.aggregate_version
    }

    /// Returns the event payload.
    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Returns the event metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns when the event was recorded.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the correlation ID stored under [`CORRELATION_ID`], if any.
    #[must_use]
    pub fn correlation_id(&self) -> Option<Uuid> {
        self.metadata
            .get(CORRELATION_ID)
            .and_then(serde_json::Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_applies_options() {
        // Arrange
        let entity = Entity::new("store-1", "stores.Store");
        let event_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let fixed_now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        // Act
        let event = Event::record(
            &entity,
            "stores.StoreCreated".to_owned(),
            "payload".to_owned(),
            1,
            [
                EventOption::Id(event_id),
                EventOption::OccurredAt(fixed_now),
                EventOption::Metadata(
                    CORRELATION_ID.to_owned(),
                    serde_json::json!(correlation_id.to_string()),
                ),
            ],
        );

        // Assert
        assert_eq!(event.id(), event_id);
        assert_eq!(event.name(), "stores.StoreCreated");
        assert_eq!(event.aggregate_id(), "store-1");
        assert_eq!(event.aggregate_name(), "stores.Store");
        assert_eq!(event.aggregate_version(), 1);
        assert_eq!(event.occurred_at(), fixed_now);
        assert_eq!(event.correlation_id(), Some(correlation_id));
    }

    #[test]
    fn test_correlation_id_is_none_without_metadata() {
        let entity = Entity::new("store-1", "stores.Store");

        let event = Event::record(&entity, "e".to_owned(), (), 1, []);

        assert!(event.metadata().is_empty());
        assert_eq!(event.correlation_id(), None);
    }
}
