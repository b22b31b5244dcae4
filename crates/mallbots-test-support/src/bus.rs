//! Test buses: `EventBus` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use mallbots_core::dispatcher::EventBus;
use mallbots_core::error::DomainError;
use mallbots_core::event::{Event, EventPayload};

/// An event bus that records every published batch and always succeeds.
#[derive(Debug)]
pub struct RecordingEventBus<P> {
    batches: Mutex<Vec<Vec<Event<P>>>>,
}

impl<P> Default for RecordingEventBus<P> {
    fn default() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
        }
    }
}

impl<P: Clone> RecordingEventBus<P> {
    /// Creates an empty recording bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every published batch, in publish order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn batches(&self) -> Vec<Vec<Event<P>>> {
        self.batches.lock().unwrap().clone()
    }

    /// Returns every published event, flattened.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published(&self) -> Vec<Event<P>> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait]
impl<P: EventPayload> EventBus<P> for RecordingEventBus<P> {
    async fn publish(&self, events: &[Event<P>]) -> Result<(), DomainError> {
        self.batches.lock().unwrap().push(events.to_vec());
        Ok(())
    }
}

/// An event bus that always fails. Useful for testing the "stored but not
/// published" path.
#[derive(Debug, Default)]
pub struct FailingEventBus;

#[async_trait]
impl<P: EventPayload> EventBus<P> for FailingEventBus {
    async fn publish(&self, _events: &[Event<P>]) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("bus unavailable".into()))
    }
}
