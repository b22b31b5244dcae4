//! Commands for the Stores context.

use mallbots_core::command::Command;
use uuid::Uuid;

/// Command to create a store.
#[derive(Debug, Clone)]
pub struct CreateStore {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The store identifier.
    pub store_id: String,
    /// The store name.
    pub name: String,
    /// The store location.
    pub location: String,
}

impl Command for CreateStore {
    fn command_type(&self) -> &'static str {
        "stores.create_store"
    }

    fn aggregate_id(&self) -> &str {
        &self.store_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to enable a store's mall participation.
#[derive(Debug, Clone)]
pub struct EnableParticipation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The store identifier.
    pub store_id: String,
}

impl Command for EnableParticipation {
    fn command_type(&self) -> &'static str {
        "stores.enable_participation"
    }

    fn aggregate_id(&self) -> &str {
        &self.store_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to disable a store's mall participation.
#[derive(Debug, Clone)]
pub struct DisableParticipation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The store identifier.
    pub store_id: String,
}

impl Command for DisableParticipation {
    fn command_type(&self) -> &'static str {
        "stores.disable_participation"
    }

    fn aggregate_id(&self) -> &str {
        &self.store_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to rename a store.
#[derive(Debug, Clone)]
pub struct RebrandStore {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The store identifier.
    pub store_id: String,
    /// The new store name.
    pub name: String,
}

impl Command for RebrandStore {
    fn command_type(&self) -> &'static str {
        "stores.rebrand_store"
    }

    fn aggregate_id(&self) -> &str {
        &self.store_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to add a product to a store's catalog.
#[derive(Debug, Clone)]
pub struct AddProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: String,
    /// The owning store.
    pub store_id: String,
    /// The product name.
    pub name: String,
    /// The product description.
    pub description: String,
    /// The stock keeping unit.
    pub sku: String,
    /// The initial price.
    pub price: f64,
}

impl Command for AddProduct {
    fn command_type(&self) -> &'static str {
        "stores.add_product"
    }

    fn aggregate_id(&self) -> &str {
        &self.product_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to change a product's name and description.
#[derive(Debug, Clone)]
pub struct RebrandProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: String,
    /// The new product name.
    pub name: String,
    /// The new product description.
    pub description: String,
}

impl Command for RebrandProduct {
    fn command_type(&self) -> &'static str {
        "stores.rebrand_product"
    }

    fn aggregate_id(&self) -> &str {
        &self.product_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to raise a product's price.
#[derive(Debug, Clone)]
pub struct IncreaseProductPrice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: String,
    /// The new, higher price.
    pub price: f64,
}

impl Command for IncreaseProductPrice {
    fn command_type(&self) -> &'static str {
        "stores.increase_product_price"
    }

    fn aggregate_id(&self) -> &str {
        &self.product_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to lower a product's price.
#[derive(Debug, Clone)]
pub struct DecreaseProductPrice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: String,
    /// The new, lower price.
    pub price: f64,
}

impl Command for DecreaseProductPrice {
    fn command_type(&self) -> &'static str {
        "stores.decrease_product_price"
    }

    fn aggregate_id(&self) -> &str {
        &self.product_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove a product from its store's catalog.
#[derive(Debug, Clone)]
pub struct RemoveProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: String,
}

impl Command for RemoveProduct {
    fn command_type(&self) -> &'static str {
        "stores.remove_product"
    }

    fn aggregate_id(&self) -> &str {
        &self.product_id
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
