//! Domain events for the Stores context.

use serde::{Deserialize, Serialize};

/// Aggregate name of [`Store`](super::aggregates::Store).
pub const STORE_AGGREGATE: &str = "stores.Store";
/// Aggregate name of [`Product`](super::aggregates::Product).
pub const PRODUCT_AGGREGATE: &str = "stores.Product";

/// Event name for a newly created store.
pub const STORE_CREATED_EVENT: &str = "stores.StoreCreated";
/// Event name for a store joining the mall.
pub const STORE_PARTICIPATION_ENABLED_EVENT: &str = "stores.StoreParticipationEnabled";
/// Event name for a store leaving the mall.
pub const STORE_PARTICIPATION_DISABLED_EVENT: &str = "stores.StoreParticipationDisabled";
/// Event name for a store name change.
pub const STORE_REBRANDED_EVENT: &str = "stores.StoreRebranded";

/// Event name for a product added to a store's catalog.
pub const PRODUCT_ADDED_EVENT: &str = "stores.ProductAdded";
/// Event name for a product name or description change.
pub const PRODUCT_REBRANDED_EVENT: &str = "stores.ProductRebranded";
/// Event name for a product price increase.
pub const PRODUCT_PRICE_INCREASED_EVENT: &str = "stores.ProductPriceIncreased";
/// Event name for a product price decrease.
pub const PRODUCT_PRICE_DECREASED_EVENT: &str = "stores.ProductPriceDecreased";
/// Event name for a product removed from a store's catalog.
pub const PRODUCT_REMOVED_EVENT: &str = "stores.ProductRemoved";

/// Every store event name.
pub const STORE_EVENTS: [&str; 4] = [
    STORE_CREATED_EVENT,
    STORE_PARTICIPATION_ENABLED_EVENT,
    STORE_PARTICIPATION_DISABLED_EVENT,
    STORE_REBRANDED_EVENT,
];

/// Every product event name.
pub const PRODUCT_EVENTS: [&str; 5] = [
    PRODUCT_ADDED_EVENT,
    PRODUCT_REBRANDED_EVENT,
    PRODUCT_PRICE_INCREASED_EVENT,
    PRODUCT_PRICE_DECREASED_EVENT,
    PRODUCT_REMOVED_EVENT,
];

/// Emitted when a store is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreCreated {
    /// The store name.
    pub name: String,
    /// The store location.
    pub location: String,
}

/// Emitted when a store's mall participation is enabled or disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreParticipationToggled {
    /// Whether the store now participates.
    pub participating: bool,
}

/// Emitted when a store is renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRebranded {
    /// The new store name.
    pub name: String,
}

/// Event payload variants for the `Store` aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreEvent {
    /// The store has been created.
    Created(StoreCreated),
    /// The store's participation has changed.
    ParticipationToggled(StoreParticipationToggled),
    /// The store has been renamed.
    Rebranded(StoreRebranded),
}

/// Emitted when a product is added; carries the full product state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAdded {
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
}

/// Emitted when a product's name or description changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRebranded {
    /// The new product name.
    pub name: String,
    /// The new product description.
    pub description: String,
}

/// Emitted for both price increases and decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPriceChanged {
    /// Positive for increases, negative for decreases.
    pub delta: f64,
}

/// Emitted when a product is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRemoved {}

/// Event payload variants for the `Product` aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductEvent {
    /// The product has been added.
    Added(ProductAdded),
    /// The product has been rebranded.
    Rebranded(ProductRebranded),
    /// The product price has changed.
    PriceChanged(ProductPriceChanged),
    /// The product has been removed.
    Removed(ProductRemoved),
}
