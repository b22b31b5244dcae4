//! In-process event dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, trace};

use crate::error::DomainError;
use crate::event::{Event, EventPayload};

/// Publishes committed events to interested subscribers.
#[async_trait]
pub trait EventBus<P: EventPayload>: Send + Sync {
    /// Publishes `events` in order.
    async fn publish(&self, events: &[Event<P>]) -> Result<(), DomainError>;
}

/// Reacts to published events.
#[async_trait]
pub trait EventHandler<P: EventPayload>: Send + Sync {
    /// Handles one event.
    async fn handle_event(&self, event: &Event<P>) -> Result<(), DomainError>;
}

/// Fan-out dispatcher to in-process handlers.
///
/// Subscriptions are registered at startup, after which the dispatcher is
/// shared read-only.
pub struct EventDispatcher<P: EventPayload> {
    by_name: HashMap<String, Vec<Arc<dyn EventHandler<P>>>>,
    all: Vec<Arc<dyn EventHandler<P>>>,
}

impl<P: EventPayload> Default for EventDispatcher<P> {
    fn default() -> Self {
        Self {
            by_name: HashMap::new(),
            all: Vec::new(),
        }
    }
}

impl<P: EventPayload> std::fmt::Debug for EventDispatcher<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("event_names", &self.by_name.keys().collect::<Vec<_>>())
            .field("catch_all_handlers", &self.all.len())
            .finish()
    }
}

impl<P: EventPayload> EventDispatcher<P> {
    /// Creates a dispatcher with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to the given event names, or to every event when
    /// `event_names` is empty.
    pub fn subscribe(&mut self, handler: Arc<dyn EventHandler<P>>, event_names: &[&str]) {
        if event_names.is_empty() {
            self.all.push(handler);
            return;
        }
        for name in event_names {
            self.by_name
                .entry((*name).to_owned())
                .or_default()
                .push(Arc::clone(&handler));
        }
    }
}

#[async_trait]
impl<P: EventPayload> EventBus<P> for EventDispatcher<P> {
    #[instrument(skip_all, fields(event_count = events.len()))]
    async fn publish(&self, events: &[Event<P>]) -> Result<(), DomainError> {
        for event in events {
            let named = self.by_name.get(event.name()).into_iter().flatten();
            for handler in named.chain(self.all.iter()) {
                handler.handle_event(event).await?;
            }
            trace!(event_name = event.name(), event_id = %event.id(), "dispatched event");
        }
        Ok(())
    }
}
