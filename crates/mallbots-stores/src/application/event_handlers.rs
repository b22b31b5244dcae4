//! Event handlers that keep the mall and catalog read models current.

use std::sync::Arc;

use async_trait::async_trait;
use mallbots_core::dispatcher::EventHandler;
use mallbots_core::error::DomainError;
use mallbots_core::event::Event;
use tracing::debug;

use crate::domain::events::{ProductEvent, StoreEvent};
use crate::domain::read_models::{CatalogProduct, CatalogRepository, MallRepository};

/// Projects store events into the [`MallRepository`].
pub struct MallHandlers {
    mall: Arc<dyn MallRepository>,
}

impl MallHandlers {
    /// Creates a new `MallHandlers`.
    #[must_use]
    pub fn new(mall: Arc<dyn MallRepository>) -> Self {
        Self { mall }
    }
}

#[async_trait]
impl EventHandler<StoreEvent> for MallHandlers {
    async fn handle_event(&self, event: &Event<StoreEvent>) -> Result<(), DomainError> {
        debug!(
            event_name = event.name(),
            store_id = event.aggregate_id(),
            "projecting into mall"
        );
        let store_id = event.aggregate_id();
        match event.payload() {
            StoreEvent::Created(payload) => {
                self.mall
                    .add_store(store_id, &payload.name, &payload.location)
                    .await
            }
            StoreEvent::ParticipationToggled(payload) => {
                self.mall
                    .set_store_participation(store_id, payload.participating)
                    .await
            }
            StoreEvent::Rebranded(payload) => self.mall.rename_store(store_id, &payload.name).await,
        }
    }
}

/// Projects product events into the [`CatalogRepository`].
pub struct CatalogHandlers {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogHandlers {
    /// Creates a new `CatalogHandlers`.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl EventHandler<ProductEvent> for CatalogHandlers {
    async fn handle_event(&self, event: &Event<ProductEvent>) -> Result<(), DomainError> {
        debug!(
            event_name = event.name(),
            product_id = event.aggregate_id(),
            "projecting into catalog"
        );
        let product_id = event.aggregate_id();
        match event.payload() {
            ProductEvent::Added(payload) => {
                self.catalog
                    .add_product(CatalogProduct {
                        id: product_id.to_owned(),
                        store_id: payload.store_id.clone(),
                        name: payload.name.clone(),
                        description: payload.description.clone(),
                        sku: payload.sku.clone(),
                        price: payload.price,
                    })
                    .await
            }
            ProductEvent::Rebranded(payload) => {
                self.catalog
                    .rebrand(product_id, &payload.name, &payload.description)
                    .await
            }
            ProductEvent::PriceChanged(payload) => {
                self.catalog.update_price(product_id, payload.delta).await
            }
            ProductEvent::Removed(_) => self.catalog.remove_product(product_id).await,
        }
    }
}
