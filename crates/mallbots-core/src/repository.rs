//! Aggregate repository.

use std::any::type_name;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::aggregate::EventSourced;
use crate::error::DomainError;
use crate::registry::Registry;
use crate::store::AggregateStore;

/// Loads and saves one aggregate type through a store chain.
///
/// Application code is the sole caller. `load` builds a blank instance via the
/// registry and hydrates it; `save` applies the pending events to the
/// aggregate, persists them through the chain, then commits them.
pub struct AggregateRepository<T: EventSourced> {
    aggregate_name: String,
    registry: Arc<Registry>,
    store: Arc<dyn AggregateStore<T>>,
}

impl<T: EventSourced> Clone for AggregateRepository<T> {
    fn clone(&self) -> Self {
        Self {
            aggregate_name: self.aggregate_name.clone(),
            registry: Arc::clone(&self.registry),
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: EventSourced> std::fmt::Debug for AggregateRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateRepository")
            .field("aggregate_name", &self.aggregate_name)
            .finish_non_exhaustive()
    }
}

impl<T: EventSourced> AggregateRepository<T> {
    /// Creates a new `AggregateRepository`.
    #[must_use]
    pub fn new(
        aggregate_name: impl Into<String>,
        registry: Arc<Registry>,
        store: Arc<dyn AggregateStore<T>>,
    ) -> Self {
        Self {
            aggregate_name: aggregate_name.into(),
            registry,
            store,
        }
    }

    /// Returns the aggregate type name this repository serves.
    #[must_use]
    pub fn aggregate_name(&self) -> &str {
        &self.aggregate_name
    }

    /// Loads the aggregate with the given ID.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Registry` if no blank instance can be built,
    /// `DomainError::TypeMismatch` if the registry builds some other type, and
    /// whatever the store chain reports while hydrating (for example
    /// `DomainError::AggregateNotFound`).
    #[instrument(skip(self), fields(aggregate_name = %self.aggregate_name))]
    pub async fn load(&self, aggregate_id: &str) -> Result<T, DomainError> {
        let built = self.registry.build(&self.aggregate_name, aggregate_id)?;
        let mut aggregate = built
            .downcast::<T>()
            .map_err(|_| DomainError::TypeMismatch {
                aggregate_name: self.aggregate_name.clone(),
                expected: type_name::<T>(),
            })?;

        self.store.load(&mut *aggregate).await?;
        debug!(version = aggregate.version(), "loaded aggregate");
        Ok(*aggregate)
    }

    /// Saves the aggregate's pending events.
    ///
    /// Does nothing when there are no pending events. On failure the pending
    /// events stay on the aggregate and nothing has been committed; calling
    /// `save` again applies only the events not yet applied to the state.
    ///
    /// # Errors
    ///
    /// Returns the aggregate's `apply_event` error (nothing persisted), the
    /// store chain's error (for example `DomainError::ConcurrencyConflict`,
    /// nothing persisted) or `DomainError::Publication` (events persisted but
    /// not published).
    #[instrument(skip_all, fields(aggregate_name = %self.aggregate_name, aggregate_id = %aggregate.id()))]
    pub async fn save(&self, aggregate: &mut T) -> Result<(), DomainError> {
        if aggregate.version() == aggregate.pending_version() {
            return Ok(());
        }

        let applied = aggregate.aggregate().applied_version();
        let unapplied: Vec<_> = aggregate
            .events()
            .iter()
            .filter(|event| event.aggregate_version() > applied)
            .cloned()
            .collect();
        for event in &unapplied {
            aggregate.apply_event(event)?;
            aggregate
                .aggregate_mut()
                .mark_applied(event.aggregate_version());
        }

        self.store.save(aggregate).await?;

        aggregate.commit_events();
        debug!(version = aggregate.version(), "committed events");
        Ok(())
    }
}
