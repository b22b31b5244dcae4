//! Entry point bundling the Stores context's repositories and read models.

use std::sync::Arc;

use mallbots_core::clock::Clock;
use mallbots_core::error::DomainError;
use mallbots_core::repository::AggregateRepository;

use super::command_handlers::{self, StoresCommandResult};
use super::query_handlers;
use crate::domain::aggregates::{Product, Store};
use crate::domain::commands::{
    AddProduct, CreateStore, DecreaseProductPrice, DisableParticipation, EnableParticipation,
    IncreaseProductPrice, RebrandProduct, RebrandStore, RemoveProduct,
};
use crate::domain::read_models::{CatalogProduct, CatalogRepository, MallRepository, MallStore};

/// Commands and queries of the Stores context.
///
/// Built by [`crate::module::StoresModule::startup`]; cheap to clone.
#[derive(Clone)]
pub struct StoresApplication {
    stores: Arc<AggregateRepository<Store>>,
    products: Arc<AggregateRepository<Product>>,
    mall: Arc<dyn MallRepository>,
    catalog: Arc<dyn CatalogRepository>,
    clock: Arc<dyn Clock>,
}

impl StoresApplication {
    /// Creates a new `StoresApplication`.
    #[must_use]
    pub fn new(
        stores: AggregateRepository<Store>,
        products: AggregateRepository<Product>,
        mall: Arc<dyn MallRepository>,
        catalog: Arc<dyn CatalogRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            stores: Arc::new(stores),
            products: Arc::new(products),
            mall,
            catalog,
            clock,
        }
    }

    /// Returns the store repository.
    #[must_use]
    pub fn stores(&self) -> &AggregateRepository<Store> {
        &self.stores
    }

    /// Returns the product repository.
    #[must_use]
    pub fn products(&self) -> &AggregateRepository<Product> {
        &self.products
    }

    /// Creates a store.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_create_store`].
    pub async fn create_store(
        &self,
        command: &CreateStore,
    ) -> Result<StoresCommandResult, DomainError> {
        command_handlers::handle_create_store(command, self.clock.as_ref(), &self.stores).await
    }

    /// Enables a store's participation in the mall.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_enable_participation`].
    pub async fn enable_participation(
        &self,
        command: &EnableParticipation,
    ) -> Result<StoresCommandResult, DomainError> {
        command_handlers::handle_enable_participation(command, self.clock.as_ref(), &self.stores)
            .await
    }

    /// Disables a store's participation in the mall.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_disable_participation`].
    pub async fn disable_participation(
        &self,
        command: &DisableParticipation,
    ) -> Result<StoresCommandResult, DomainError> {
        command_handlers::handle_disable_participation(command, self.clock.as_ref(), &self.stores)
            .await
    }

    /// Renames a store.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_rebrand_store`].
    pub async fn rebrand_store(
        &self,
        command: &RebrandStore,
    ) -> Result<StoresCommandResult, DomainError> {
        command_handlers::handle_rebrand_store(command, self.clock.as_ref(), &self.stores).await
    }

    /// Adds a product to a store.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_add_product`].
    pub async fn add_product(
        &self,
        command: &AddProduct,
    ) -> Result<StoresCommandResult, DomainError> {
        command_handlers::handle_add_product(command, self.clock.as_ref(), &self.products).await
    }

    /// Renames and re-describes a product.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_rebrand_product`].
    pub async fn rebrand_product(
        &self,
        command: &RebrandProduct,
    ) -> Result<StoresCommandResult, DomainError> {
        command_handlers::handle_rebrand_product(command, self.clock.as_ref(), &self.products)
            .await
    }

    /// Raises a product's price.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_increase_product_price`].
    pub async fn increase_product_price(
        &self,
        command: &IncreaseProductPrice,
    ) -> Result<StoresCommandResult, DomainError> {
        command_handlers::handle_increase_product_price(
            command,
            self.clock.as_ref(),
            &self.products,
        )
        .await
    }

    /// Lowers a product's price.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_decrease_product_price`].
    pub async fn decrease_product_price(
        &self,
        command: &DecreaseProductPrice,
    ) -> Result<StoresCommandResult, DomainError> {
        command_handlers::handle_decrease_product_price(
            command,
            self.clock.as_ref(),
            &self.products,
        )
        .await
    }

    /// Removes a product.
    ///
    /// # Errors
    ///
    /// See [`command_handlers::handle_remove_product`].
    pub async fn remove_product(
        &self,
        command: &RemoveProduct,
    ) -> Result<StoresCommandResult, DomainError> {
        command_handlers::handle_remove_product(command, self.clock.as_ref(), &self.products).await
    }

    /// Retrieves one store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateNotFound` if the store is not listed.
    pub async fn get_store(&self, store_id: &str) -> Result<MallStore, DomainError> {
        query_handlers::get_store(store_id, self.mall.as_ref()).await
    }

    /// Lists every store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the read model is unavailable.
    pub async fn get_stores(&self) -> Result<Vec<MallStore>, DomainError> {
        query_handlers::get_stores(self.mall.as_ref()).await
    }

    /// Lists participating stores.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the read model is unavailable.
    pub async fn get_participating_stores(&self) -> Result<Vec<MallStore>, DomainError> {
        query_handlers::get_participating_stores(self.mall.as_ref()).await
    }

    /// Lists one store's catalog.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the read model is unavailable.
    pub async fn get_catalog(&self, store_id: &str) -> Result<Vec<CatalogProduct>, DomainError> {
        query_handlers::get_catalog(store_id, self.catalog.as_ref()).await
    }

    /// Retrieves one product.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateNotFound` if the product is not listed.
    pub async fn get_product(&self, product_id: &str) -> Result<CatalogProduct, DomainError> {
        query_handlers::get_product(product_id, self.catalog.as_ref()).await
    }
}
