//! Query handlers for the Stores context.
//!
//! Queries read the mall and catalog read models; they never replay
//! aggregates.

use mallbots_core::error::DomainError;

use crate::domain::read_models::{CatalogProduct, CatalogRepository, MallRepository, MallStore};

/// Retrieves one store from the mall listing.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the store is not listed.
pub async fn get_store(
    store_id: &str,
    mall: &dyn MallRepository,
) -> Result<MallStore, DomainError> {
    mall.find(store_id).await
}

/// Lists every store in the mall.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the read model is unavailable.
pub async fn get_stores(mall: &dyn MallRepository) -> Result<Vec<MallStore>, DomainError> {
    mall.all().await
}

/// Lists the stores currently participating in the mall.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the read model is unavailable.
pub async fn get_participating_stores(
    mall: &dyn MallRepository,
) -> Result<Vec<MallStore>, DomainError> {
    mall.all_participating().await
}

/// Lists one store's catalog.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the read model is unavailable.
pub async fn get_catalog(
    store_id: &str,
    catalog: &dyn CatalogRepository,
) -> Result<Vec<CatalogProduct>, DomainError> {
    catalog.get_catalog(store_id).await
}

/// Retrieves one product from the catalog.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the product is not listed.
pub async fn get_product(
    product_id: &str,
    catalog: &dyn CatalogRepository,
) -> Result<CatalogProduct, DomainError> {
    catalog.find(product_id).await
}
