//! `PostgreSQL` implementations of the mall and catalog read models.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use mallbots_core::error::DomainError;

use crate::domain::events::{PRODUCT_AGGREGATE, STORE_AGGREGATE};
use crate::domain::read_models::{CatalogProduct, CatalogRepository, MallRepository, MallStore};

fn storage_error(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("postgres: {err}"))
}

#[derive(sqlx::FromRow)]
struct MallStoreRow {
    id: String,
    name: String,
    location: String,
    participating: bool,
}

impl From<MallStoreRow> for MallStore {
    fn from(row: MallStoreRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            location: row.location,
            participating: row.participating,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CatalogProductRow {
    id: String,
    store_id: String,
    name: String,
    description: String,
    sku: String,
    price: f64,
}

impl From<CatalogProductRow> for CatalogProduct {
    fn from(row: CatalogProductRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            description: row.description,
            sku: row.sku,
            price: row.price,
        }
    }
}

/// PostgreSQL-backed mall listing in the `mall_stores` table.
#[derive(Debug, Clone)]
pub struct PgMallRepository {
    pool: PgPool,
}

impl PgMallRepository {
    /// Creates a new `PgMallRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select(&self, participating_only: bool) -> Result<Vec<MallStore>, DomainError> {
        let rows = sqlx::query_as::<_, MallStoreRow>(
            r"
            SELECT id, name, location, participating
            FROM mall_stores
            WHERE participating OR NOT $1
            ORDER BY id
            ",
        )
        .bind(participating_only)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(MallStore::from).collect())
    }
}

#[async_trait]
impl MallRepository for PgMallRepository {
    #[instrument(skip(self))]
    async fn add_store(
        &self,
        store_id: &str,
        name: &str,
        location: &str,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO mall_stores (id, name, location, participating)
            VALUES ($1, $2, $3, FALSE)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                location = EXCLUDED.location,
                participating = FALSE
            ",
        )
        .bind(store_id)
        .bind(name)
        .bind(location)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_store_participation(
        &self,
        store_id: &str,
        participating: bool,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE mall_stores SET participating = $2 WHERE id = $1")
            .bind(store_id)
            .bind(participating)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        debug!(updated = result.rows_affected(), "participation recorded");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rename_store(&self, store_id: &str, name: &str) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE mall_stores SET name = $2 WHERE id = $1")
            .bind(store_id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        debug!(updated = result.rows_affected(), "store renamed");
        Ok(())
    }

    async fn find(&self, store_id: &str) -> Result<MallStore, DomainError> {
        sqlx::query_as::<_, MallStoreRow>(
            "SELECT id, name, location, participating FROM mall_stores WHERE id = $1",
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?
        .map(MallStore::from)
        .ok_or_else(|| DomainError::AggregateNotFound {
            aggregate_name: STORE_AGGREGATE.to_owned(),
            aggregate_id: store_id.to_owned(),
        })
    }

    async fn all(&self) -> Result<Vec<MallStore>, DomainError> {
        self.select(false).await
    }

    async fn all_participating(&self) -> Result<Vec<MallStore>, DomainError> {
        self.select(true).await
    }
}

/// PostgreSQL-backed product catalog in the `catalog_products` table.
#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Creates a new `PgCatalogRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    #[instrument(skip_all, fields(product_id = %product.id, store_id = %product.store_id))]
    async fn add_product(&self, product: CatalogProduct) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO catalog_products (id, store_id, name, description, sku, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id)
            DO UPDATE SET
                store_id = EXCLUDED.store_id,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                sku = EXCLUDED.sku,
                price = EXCLUDED.price
            ",
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(product.price)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rebrand(
        &self,
        product_id: &str,
        name: &str,
        description: &str,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE catalog_products SET name = $2, description = $3 WHERE id = $1")
            .bind(product_id)
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_price(&self, product_id: &str, delta: f64) -> Result<(), DomainError> {
        // Price events carry deltas, not absolute prices.
        let result = sqlx::query("UPDATE catalog_products SET price = price + $2 WHERE id = $1")
            .bind(product_id)
            .bind(delta)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        debug!(updated = result.rows_affected(), "price adjusted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_product(&self, product_id: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM catalog_products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn find(&self, product_id: &str) -> Result<CatalogProduct, DomainError> {
        sqlx::query_as::<_, CatalogProductRow>(
            r"
            SELECT id, store_id, name, description, sku, price
            FROM catalog_products
            WHERE id = $1
            ",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?
        .map(CatalogProduct::from)
        .ok_or_else(|| DomainError::AggregateNotFound {
            aggregate_name: PRODUCT_AGGREGATE.to_owned(),
            aggregate_id: product_id.to_owned(),
        })
    }

    async fn get_catalog(&self, store_id: &str) -> Result<Vec<CatalogProduct>, DomainError> {
        let rows = sqlx::query_as::<_, CatalogProductRow>(
            r"
            SELECT id, store_id, name, description, sku, price
            FROM catalog_products
            WHERE store_id = $1
            ORDER BY id
            ",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(CatalogProduct::from).collect())
    }
}
