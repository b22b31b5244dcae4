//! In-memory read model repositories.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use mallbots_core::error::DomainError;

use crate::domain::events::{PRODUCT_AGGREGATE, STORE_AGGREGATE};
use crate::domain::read_models::{CatalogProduct, CatalogRepository, MallRepository, MallStore};

fn poisoned<T>(_: T) -> DomainError {
    DomainError::Infrastructure("read model lock poisoned".into())
}

/// Mall listing kept in an ordered map.
#[derive(Debug, Default)]
pub struct InMemoryMallRepository {
    stores: RwLock<BTreeMap<String, MallStore>>,
}

impl InMemoryMallRepository {
    /// Creates an empty mall listing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn update(
        &self,
        store_id: &str,
        change: impl FnOnce(&mut MallStore),
    ) -> Result<(), DomainError> {
        let mut stores = self.stores.write().map_err(poisoned)?;
        if let Some(store) = stores.get_mut(store_id) {
            change(store);
        }
        Ok(())
    }

    fn select(&self, keep: impl Fn(&MallStore) -> bool) -> Result<Vec<MallStore>, DomainError> {
        let stores = self.stores.read().map_err(poisoned)?;
        Ok(stores.values().filter(|s| keep(s)).cloned().collect())
    }
}

#[async_trait]
impl MallRepository for InMemoryMallRepository {
    async fn add_store(
        &self,
        store_id: &str,
        name: &str,
        location: &str,
    ) -> Result<(), DomainError> {
        let mut stores = self.stores.write().map_err(poisoned)?;
        stores.insert(
            store_id.to_owned(),
            MallStore {
                id: store_id.to_owned(),
                name: name.to_owned(),
                location: location.to_owned(),
                participating: false,
            },
        );
        Ok(())
    }

    async fn set_store_participation(
        &self,
        store_id: &str,
        participating: bool,
    ) -> Result<(), DomainError> {
        self.update(store_id, |store| store.participating = participating)
    }

    async fn rename_store(&self, store_id: &str, name: &str) -> Result<(), DomainError> {
        self.update(store_id, |store| store.name = name.to_owned())
    }

    async fn find(&self, store_id: &str) -> Result<MallStore, DomainError> {
        let stores = self.stores.read().map_err(poisoned)?;
        stores
            .get(store_id)
            .cloned()
            .ok_or_else(|| DomainError::AggregateNotFound {
                aggregate_name: STORE_AGGREGATE.to_owned(),
                aggregate_id: store_id.to_owned(),
            })
    }

    async fn all(&self) -> Result<Vec<MallStore>, DomainError> {
        self.select(|_| true)
    }

    async fn all_participating(&self) -> Result<Vec<MallStore>, DomainError> {
        self.select(|store| store.participating)
    }
}

/// Product catalog kept in an ordered map.
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    products: RwLock<BTreeMap<String, CatalogProduct>>,
}

impl InMemoryCatalogRepository {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn update(
        &self,
        product_id: &str,
        change: impl FnOnce(&mut CatalogProduct),
    ) -> Result<(), DomainError> {
        let mut products = self.products.write().map_err(poisoned)?;
        if let Some(product) = products.get_mut(product_id) {
            change(product);
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn add_product(&self, product: CatalogProduct) -> Result<(), DomainError> {
        let mut products = self.products.write().map_err(poisoned)?;
        products.insert(product.id.clone(), product);
        Ok(())
    }

    async fn rebrand(
        &self,
        product_id: &str,
        name: &str,
        description: &str,
    ) -> Result<(), DomainError> {
        self.update(product_id, |product| {
            product.name = name.to_owned();
            product.description = description.to_owned();
        })
    }

    async fn update_price(&self, product_id: &str, delta: f64) -> Result<(), DomainError> {
        self.update(product_id, |product| product.price += delta)
    }

    async fn remove_product(&self, product_id: &str) -> Result<(), DomainError> {
        let mut products = self.products.write().map_err(poisoned)?;
        products.remove(product_id);
        Ok(())
    }

    async fn find(&self, product_id: &str) -> Result<CatalogProduct, DomainError> {
        let products = self.products.read().map_err(poisoned)?;
        products
            .get(product_id)
            .cloned()
            .ok_or_else(|| DomainError::AggregateNotFound {
                aggregate_name: PRODUCT_AGGREGATE.to_owned(),
                aggregate_id: product_id.to_owned(),
            })
    }

    async fn get_catalog(&self, store_id: &str) -> Result<Vec<CatalogProduct>, DomainError> {
        let products = self.products.read().map_err(poisoned)?;
        Ok(products
            .values()
            .filter(|product| product.store_id == store_id)
            .cloned()
            .collect())
    }
}
