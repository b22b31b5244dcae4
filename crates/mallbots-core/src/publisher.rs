//! Event publication middleware.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::aggregate::EventSourced;
use crate::dispatcher::EventBus;
use crate::error::DomainError;
use crate::store::{AggregateStore, AggregateStoreMiddleware};

/// Outermost store layer: publishes pending events once they are durable.
///
/// On save the inner chain runs first. Only if it succeeds are the aggregate's
/// pending events (not yet cleared by the repository) handed to the bus. A
/// failed or timed-out publish is reported as `DomainError::Publication`; the
/// events are already stored at that point, so callers retry dispatch and do
/// not re-run the business operation.
pub struct EventPublisher<T: EventSourced> {
    next: Arc<dyn AggregateStore<T>>,
    bus: Arc<dyn EventBus<T::Payload>>,
    timeout: Option<Duration>,
}

impl<T: EventSourced> EventPublisher<T> {
    /// Creates a new `EventPublisher` wrapping `next`.
    #[must_use]
    pub fn new(
        next: Arc<dyn AggregateStore<T>>,
        bus: Arc<dyn EventBus<T::Payload>>,
        timeout: Option<Duration>,
    ) -> Self {
        Self { next, bus, timeout }
    }

    /// Returns a middleware that inserts an `EventPublisher` into a chain.
    #[must_use]
    pub fn middleware(
        bus: Arc<dyn EventBus<T::Payload>>,
        timeout: Option<Duration>,
    ) -> AggregateStoreMiddleware<T> {
        Box::new(move |next| Arc::new(Self::new(next, bus, timeout)))
    }
}

#[async_trait]
impl<T: EventSourced> AggregateStore<T> for EventPublisher<T> {
    async fn load(&self, aggregate: &mut T) -> Result<(), DomainError> {
        self.next.load(aggregate).await
    }

    #[instrument(skip_all, fields(aggregate_name = %aggregate.aggregate_name(), aggregate_id = %aggregate.id()))]
    async fn save(&self, aggregate: &T) -> Result<(), DomainError> {
        self.next.save(aggregate).await?;

        let events = aggregate.events();
        if events.is_empty() {
            return Ok(());
        }

        let published = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.bus.publish(events))
                .await
                .unwrap_or_else(|_| {
                    Err(DomainError::Infrastructure(format!(
                        "publish timed out after {}ms",
                        limit.as_millis()
                    )))
                }),
            None => self.bus.publish(events).await,
        };

        match published {
            Ok(()) => {
                debug!(published = events.len(), "published events");
                Ok(())
            }
            Err(DomainError::Publication(reason)) => Err(DomainError::Publication(reason)),
            Err(err) => {
                warn!(error = %err, pending_version = aggregate.pending_version(), "events stored but not published");
                Err(DomainError::Publication(err.to_string()))
            }
        }
    }
}
