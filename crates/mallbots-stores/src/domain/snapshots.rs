//! Snapshot shapes for the Stores context.

use mallbots_core::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// Snapshot name of [`StoreV1`].
pub const STORE_V1_SNAPSHOT: &str = "stores.StoreV1";
/// Snapshot name of [`ProductV1`].
pub const PRODUCT_V1_SNAPSHOT: &str = "stores.ProductV1";

/// Full state of a `Store`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreV1 {
    /// The store name.
    pub name: String,
    /// The store location.
    pub location: String,
    /// Whether the store participates in the mall.
    pub participating: bool,
}

impl Snapshot for StoreV1 {
    fn snapshot_name(&self) -> &'static str {
        STORE_V1_SNAPSHOT
    }
}

/// Full state of a `Product`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductV1 {
    /// The owning store.
    pub store_id: String,
    /// The product name.
    pub name: String,
    /// The product description.
    pub description: String,
    /// The stock keeping unit.
    pub sku: String,
    /// The product price.
    pub price: f64,
    /// Whether the product has been removed.
    pub removed: bool,
}

impl Snapshot for ProductV1 {
    fn snapshot_name(&self) -> &'static str {
        PRODUCT_V1_SNAPSHOT
    }
}
