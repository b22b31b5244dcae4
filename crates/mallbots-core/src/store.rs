//! Aggregate store abstraction and middleware chain.

use std::sync::Arc;

use async_trait::async_trait;

use crate::aggregate::EventSourced;
use crate::error::DomainError;

/// Loads and saves fully-formed aggregates.
///
/// `load` receives a blank aggregate that already carries its identity and
/// hydrates it; `save` receives an aggregate with pending events and persists
/// them. Adapters compose into a chain where each layer wraps the next.
#[async_trait]
pub trait AggregateStore<T: EventSourced>: Send + Sync {
    /// Hydrates `aggregate` from storage.
    async fn load(&self, aggregate: &mut T) -> Result<(), DomainError>;

    /// Persists the pending events of `aggregate`.
    async fn save(&self, aggregate: &T) -> Result<(), DomainError>;
}

/// Wraps an inner store in an outer layer.
pub type AggregateStoreMiddleware<T> =
    Box<dyn FnOnce(Arc<dyn AggregateStore<T>>) -> Arc<dyn AggregateStore<T>> + Send>;

/// Builds a store chain around `store`.
///
/// The first middleware is the outermost layer, i.e. the first one invoked on
/// every call. The usual chain is
/// `[EventPublisher::middleware(..), SnapshotStore::middleware(..)]` around an
/// `EventStore`.
#[must_use]
pub fn aggregate_store_with_middleware<T: EventSourced>(
    store: Arc<dyn AggregateStore<T>>,
    middlewares: Vec<AggregateStoreMiddleware<T>>,
) -> Arc<dyn AggregateStore<T>> {
    middlewares
        .into_iter()
        .rev()
        .fold(store, |inner, middleware| middleware(inner))
}
