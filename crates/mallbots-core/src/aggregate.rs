//! Aggregate root abstraction.

use crate::entity::Entity;
use crate::error::DomainError;
use crate::event::{Event, EventOption, EventPayload};

/// Versioned event buffer embedded in every event-sourced aggregate.
///
/// `version` is the number of committed events. Events recorded with
/// [`add_event`](Self::add_event) stay pending until the repository commits
/// them, so `pending_version() == version() + events().len()` always holds.
///
/// `applied_version` tracks how far pending events have already been applied
/// to the domain state, so a save retried after a storage failure does not
/// apply them twice.
#[derive(Debug, Clone)]
pub struct Aggregate<P> {
    entity: Entity,
    version: i64,
    applied_version: i64,
    events: Vec<Event<P>>,
}

impl<P> Aggregate<P> {
    /// Creates an empty aggregate at version 0.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            entity: Entity::new(id, name),
            version: 0,
            applied_version: 0,
            events: Vec::new(),
        }
    }

    /// Returns the aggregate identity.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Returns the aggregate identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.entity.id()
    }

    /// Returns the aggregate type name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.entity.name()
    }

    /// Records a new pending event at `pending_version() + 1`.
    ///
    /// Performs no validation; business rules are checked before calling.
    pub fn add_event(
        &mut self,
        name: impl Into<String>,
        payload: P,
        options: impl IntoIterator<Item = EventOption>,
    ) {
        let version = self.pending_version() + 1;
        let event = Event::record(&self.entity, name.into(), payload, version, options);
        self.events.push(event);
    }

    /// Returns the committed version.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Returns the committed version plus the number of pending events.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn pending_version(&self) -> i64 {
        self.version + self.events.len() as i64
    }

    /// Returns the highest version whose event has been applied to the
    /// domain state.
    #[must_use]
    pub fn applied_version(&self) -> i64 {
        self.applied_version
    }

    /// Returns the pending events in the order they were recorded.
    #[must_use]
    pub fn events(&self) -> &[Event<P>] {
        &self.events
    }

    /// Drops all pending events without touching the version.
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.applied_version = self.version;
    }

    /// Advances the version past the pending events and clears them.
    pub fn commit_events(&mut self) {
        self.version = self.pending_version();
        self.applied_version = self.version;
        self.events.clear();
    }

    /// Forcibly sets the committed version. Only replay may call this.
    pub(crate) fn set_version(&mut self, version: i64) {
        self.version = version;
        self.applied_version = version;
    }

    /// Records that the pending event at `version` has been applied.
    pub(crate) fn mark_applied(&mut self, version: i64) {
        self.applied_version = self.applied_version.max(version);
    }
}

/// Capability set required of every event-sourced aggregate.
///
/// Implementors embed an [`Aggregate`] and provide the type-specific event
/// application logic. The repository is generic over this trait.
pub trait EventSourced: Send + Sync + 'static {
    /// The closed set of event payloads this aggregate produces and consumes.
    type Payload: EventPayload;

    /// Returns the embedded aggregate state.
    fn aggregate(&self) -> &Aggregate<Self::Payload>;

    /// Returns the embedded aggregate state mutably.
    fn aggregate_mut(&mut self) -> &mut Aggregate<Self::Payload>;

    /// Applies an event to the aggregate's domain state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ReplayContract` if the event is not one this
    /// aggregate recognizes.
    fn apply_event(&mut self, event: &Event<Self::Payload>) -> Result<(), DomainError>;

    /// Returns the aggregate identifier.
    fn id(&self) -> &str {
        self.aggregate().id()
    }

    /// Returns the aggregate type name.
    fn aggregate_name(&self) -> &str {
        self.aggregate().name()
    }

    /// Returns the committed version.
    fn version(&self) -> i64 {
        self.aggregate().version()
    }

    /// Returns the committed version plus the number of pending events.
    fn pending_version(&self) -> i64 {
        self.aggregate().pending_version()
    }

    /// Returns the pending events.
    fn events(&self) -> &[Event<Self::Payload>] {
        self.aggregate().events()
    }

    /// Commits the pending events.
    fn commit_events(&mut self) {
        self.aggregate_mut().commit_events();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_event_assigns_contiguous_versions() {
        // Arrange
        let mut aggregate: Aggregate<u32> = Aggregate::new("a-1", "tests.Tally");

        // Act
        aggregate.add_event("tests.Added", 1, []);
        aggregate.add_event("tests.Added", 2, []);

        // Assert
        assert_eq!(aggregate.version(), 0);
        assert_eq!(aggregate.pending_version(), 2);
        let versions: Vec<i64> = aggregate
            .events()
            .iter()
            .map(Event::aggregate_version)
            .collect();
        assert_eq!(versions, vec![1, 2]);
        assert_eq!(aggregate.events()[0].aggregate_id(), "a-1");
        assert_eq!(aggregate.events()[0].aggregate_name(), "tests.Tally");
    }

    #[test]
    fn test_commit_events_advances_version_and_clears_buffer() {
        // Arrange
        let mut aggregate: Aggregate<u32> = Aggregate::new("a-1", "tests.Tally");
        aggregate.add_event("tests.Added", 1, []);
        aggregate.add_event("tests.Added", 2, []);

        // Act
        aggregate.commit_events();

        // Assert
        assert_eq!(aggregate.version(), 2);
        assert_eq!(aggregate.pending_version(), 2);
        assert!(aggregate.events().is_empty());

        // Next event continues after the committed version.
        aggregate.add_event("tests.Added", 3, []);
        assert_eq!(aggregate.events()[0].aggregate_version(), 3);
    }

    #[test]
    fn test_commit_events_with_empty_buffer_is_noop() {
        let mut aggregate: Aggregate<u32> = Aggregate::new("a-1", "tests.Tally");
        aggregate.set_version(4);

        aggregate.commit_events();

        assert_eq!(aggregate.version(), 4);
        assert_eq!(aggregate.pending_version(), 4);
    }

    #[test]
    fn test_applied_version_follows_mark_and_commit() {
        // Arrange
        let mut aggregate: Aggregate<u32> = Aggregate::new("a-1", "tests.Tally");
        aggregate.set_version(2);
        aggregate.add_event("tests.Added", 1, []);
        aggregate.add_event("tests.Added", 2, []);

        // Act
        aggregate.mark_applied(3);
        let partially = aggregate.applied_version();
        aggregate.commit_events();

        // Assert
        assert_eq!(partially, 3);
        assert_eq!(aggregate.applied_version(), 4);
        assert_eq!(aggregate.version(), 4);
    }

    #[test]
    fn test_clear_events_keeps_version() {
        let mut aggregate: Aggregate<u32> = Aggregate::new("a-1", "tests.Tally");
        aggregate.add_event("tests.Added", 1, []);

        aggregate.clear_events();

        assert_eq!(aggregate.version(), 0);
        assert_eq!(aggregate.pending_version(), 0);
    }
}
