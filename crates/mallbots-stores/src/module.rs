//! Startup wiring for the Stores context.
//!
//! Registers the context's aggregates, events and snapshots, subscribes the
//! read model projections, and chains each aggregate store as
//! publisher → snapshots → event log.

use std::sync::Arc;
use std::time::Duration;

use mallbots_core::clock::Clock;
use mallbots_core::dispatcher::{EventBus, EventDispatcher};
use mallbots_core::error::DomainError;
use mallbots_core::event_store::{EventStorage, EventStore};
use mallbots_core::publisher::EventPublisher;
use mallbots_core::registry::Registry;
use mallbots_core::repository::AggregateRepository;
use mallbots_core::snapshot::{SnapshotPolicy, Snapshotter};
use mallbots_core::snapshot_store::{SnapshotStorage, SnapshotStore};
use mallbots_core::store::{AggregateStore, aggregate_store_with_middleware};
use sqlx::PgPool;
use tracing::info;

use crate::application::StoresApplication;
use crate::application::event_handlers::{CatalogHandlers, MallHandlers};
use crate::domain::aggregates::{Product, Store};
use crate::domain::events::{
    PRODUCT_AGGREGATE, PRODUCT_EVENTS, ProductEvent, STORE_AGGREGATE, STORE_EVENTS, StoreEvent,
};
use crate::domain::read_models::{CatalogRepository, MallRepository};
use crate::domain::snapshots::{PRODUCT_V1_SNAPSHOT, ProductV1, STORE_V1_SNAPSHOT, StoreV1};
use crate::infrastructure::{
    InMemoryCatalogRepository, InMemoryMallRepository, PgCatalogRepository, PgMallRepository,
};

/// Tuning for the Stores context's aggregate stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoresConfig {
    /// When snapshots are written on save.
    pub snapshot_policy: SnapshotPolicy,
    /// Upper bound on publishing one save's events, if any.
    pub publish_timeout: Option<Duration>,
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            snapshot_policy: SnapshotPolicy::EveryNVersions(3),
            publish_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Backends of the mall and catalog read models.
#[derive(Clone)]
pub struct ReadModels {
    /// The mall listing.
    pub mall: Arc<dyn MallRepository>,
    /// The product catalog.
    pub catalog: Arc<dyn CatalogRepository>,
}

impl ReadModels {
    /// Read models held in process memory; they start empty.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            mall: Arc::new(InMemoryMallRepository::new()),
            catalog: Arc::new(InMemoryCatalogRepository::new()),
        }
    }

    /// Read models in the same database as the event log.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            mall: Arc::new(PgMallRepository::new(pool.clone())),
            catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
        }
    }
}

/// Registers the Stores context's aggregates, events and snapshots.
///
/// # Errors
///
/// Returns `DomainError::Registry` if any name is already registered.
pub fn register_types(registry: &mut Registry) -> Result<(), DomainError> {
    registry.register_aggregate(STORE_AGGREGATE, Store::new)?;
    registry.register_aggregate(PRODUCT_AGGREGATE, Product::new)?;
    for name in STORE_EVENTS {
        registry.register_event::<StoreEvent>(name)?;
    }
    for name in PRODUCT_EVENTS {
        registry.register_event::<ProductEvent>(name)?;
    }
    registry.register_snapshot::<StoreV1>(STORE_V1_SNAPSHOT)?;
    registry.register_snapshot::<ProductV1>(PRODUCT_V1_SNAPSHOT)?;
    Ok(())
}

fn chain<T: Snapshotter>(
    events: &Arc<dyn EventStorage>,
    snapshots: &Arc<dyn SnapshotStorage>,
    registry: &Arc<Registry>,
    bus: Arc<dyn EventBus<T::Payload>>,
    config: &StoresConfig,
) -> Arc<dyn AggregateStore<T>> {
    aggregate_store_with_middleware(
        Arc::new(EventStore::<T>::new(Arc::clone(events), Arc::clone(registry))),
        vec![
            EventPublisher::middleware(bus, config.publish_timeout),
            SnapshotStore::middleware(
                Arc::clone(snapshots),
                Arc::clone(registry),
                config.snapshot_policy,
            ),
        ],
    )
}

/// The Stores bounded context.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoresModule;

impl StoresModule {
    /// Builds the Stores application over the given storage backends.
    ///
    /// The mall and catalog read models are fed by in-process dispatchers on
    /// every successful save.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Registry` if type registration fails.
    pub fn startup(
        events: Arc<dyn EventStorage>,
        snapshots: Arc<dyn SnapshotStorage>,
        read_models: ReadModels,
        config: &StoresConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<StoresApplication, DomainError> {
        let mut registry = Registry::new();
        register_types(&mut registry)?;
        let registry = Arc::new(registry);

        let ReadModels { mall, catalog } = read_models;

        let mut store_dispatcher = EventDispatcher::<StoreEvent>::new();
        store_dispatcher.subscribe(
            Arc::new(MallHandlers::new(Arc::clone(&mall))),
            &STORE_EVENTS,
        );
        let mut product_dispatcher = EventDispatcher::<ProductEvent>::new();
        product_dispatcher.subscribe(
            Arc::new(CatalogHandlers::new(Arc::clone(&catalog))),
            &PRODUCT_EVENTS,
        );

        let stores = AggregateRepository::new(
            STORE_AGGREGATE,
            Arc::clone(&registry),
            chain::<Store>(
                &events,
                &snapshots,
                &registry,
                Arc::new(store_dispatcher),
                config,
            ),
        );
        let products = AggregateRepository::new(
            PRODUCT_AGGREGATE,
            Arc::clone(&registry),
            chain::<Product>(
                &events,
                &snapshots,
                &registry,
                Arc::new(product_dispatcher),
                config,
            ),
        );

        info!(
            snapshot_policy = ?config.snapshot_policy,
            publish_timeout = ?config.publish_timeout,
            "stores module started"
        );
        Ok(StoresApplication::new(stores, products, mall, catalog, clock))
    }
}
