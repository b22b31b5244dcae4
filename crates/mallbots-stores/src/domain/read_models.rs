//! Read models kept current from store and product events.

use async_trait::async_trait;
use mallbots_core::error::DomainError;
use serde::Serialize;

/// A store as listed in the mall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MallStore {
    /// The store identifier.
    pub id: String,
    /// The store name.
    pub name: String,
    /// The store location.
    pub location: String,
    /// Whether the store participates in the mall.
    pub participating: bool,
}

/// A product as listed in a store's catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogProduct {
    /// The product identifier.
    pub id: String,
    /// The owning store.
    pub store_id: String,
    /// The product name.
    pub name: String,
    /// The product description.
    pub description: String,
    /// The stock keeping unit.
    pub sku: String,
    /// The current price.
    pub price: f64,
}

/// Mall listing of every store.
///
/// Updates for a store that is not listed are ignored.
#[async_trait]
pub trait MallRepository: Send + Sync {
    /// Lists a newly created store as not participating.
    async fn add_store(
        &self,
        store_id: &str,
        name: &str,
        location: &str,
    ) -> Result<(), DomainError>;

    /// Records a store's participation.
    async fn set_store_participation(
        &self,
        store_id: &str,
        participating: bool,
    ) -> Result<(), DomainError>;

    /// Renames a store.
    async fn rename_store(&self, store_id: &str, name: &str) -> Result<(), DomainError>;

    /// Finds one store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateNotFound` if the store is not listed.
    async fn find(&self, store_id: &str) -> Result<MallStore, DomainError>;

    /// Lists every store, ordered by ID.
    async fn all(&self) -> Result<Vec<MallStore>, DomainError>;

    /// Lists participating stores, ordered by ID.
    async fn all_participating(&self) -> Result<Vec<MallStore>, DomainError>;
}

/// Catalog of every store's products.
///
/// Updates for a product that is not listed are ignored.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Lists a newly added product.
    async fn add_product(&self, product: CatalogProduct) -> Result<(), DomainError>;

    /// Changes a product's name and description.
    async fn rebrand(
        &self,
        product_id: &str,
        name: &str,
        description: &str,
    ) -> Result<(), DomainError>;

    /// Adjusts a product's price by `delta`.
    async fn update_price(&self, product_id: &str, delta: f64) -> Result<(), DomainError>;

    /// Delists a product.
    async fn remove_product(&self, product_id: &str) -> Result<(), DomainError>;

    /// Finds one product.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateNotFound` if the product is not listed.
    async fn find(&self, product_id: &str) -> Result<CatalogProduct, DomainError>;

    /// Lists one store's products, ordered by ID.
    async fn get_catalog(&self, store_id: &str) -> Result<Vec<CatalogProduct>, DomainError>;
}
