//! Aggregate roots for the Stores context.

use mallbots_core::aggregate::{Aggregate, EventSourced};
use mallbots_core::clock::Clock;
use mallbots_core::error::DomainError;
use mallbots_core::event::{CORRELATION_ID, Event, EventOption};
use mallbots_core::snapshot::Snapshotter;
use uuid::Uuid;

use super::events::{
    PRODUCT_ADDED_EVENT, PRODUCT_AGGREGATE, PRODUCT_PRICE_DECREASED_EVENT,
    PRODUCT_PRICE_INCREASED_EVENT, PRODUCT_REBRANDED_EVENT, PRODUCT_REMOVED_EVENT, ProductAdded,
    ProductEvent, ProductPriceChanged, ProductRebranded, ProductRemoved, STORE_AGGREGATE,
    STORE_CREATED_EVENT, STORE_PARTICIPATION_DISABLED_EVENT, STORE_PARTICIPATION_ENABLED_EVENT,
    STORE_REBRANDED_EVENT, StoreCreated, StoreEvent, StoreParticipationToggled, StoreRebranded,
};
use super::snapshots::{ProductV1, StoreV1};

fn event_options(correlation_id: Uuid, clock: &dyn Clock) -> [EventOption; 2] {
    [
        EventOption::OccurredAt(clock.now()),
        EventOption::Metadata(
            CORRELATION_ID.to_owned(),
            serde_json::Value::String(correlation_id.to_string()),
        ),
    ]
}

fn require(value: &str, message: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(message.to_owned()));
    }
    Ok(())
}

/// The aggregate root for a store in the mall.
#[derive(Debug)]
pub struct Store {
    aggregate: Aggregate<StoreEvent>,
    /// The store name.
    pub name: String,
    /// The store location.
    pub location: String,
    /// Whether the store participates in the mall.
    pub participating: bool,
}

impl Store {
    /// Creates a blank store ready for replay.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            aggregate: Aggregate::new(id, STORE_AGGREGATE),
            name: String::new(),
            location: String::new(),
            participating: false,
        }
    }

    /// Creates a new store, producing a `StoreCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name or location is blank.
    pub fn create(
        id: &str,
        name: &str,
        location: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        require(name, "the store name cannot be blank")?;
        require(location, "the store location cannot be blank")?;

        let mut store = Self::new(id);
        store.aggregate.add_event(
            STORE_CREATED_EVENT,
            StoreEvent::Created(StoreCreated {
                name: name.to_owned(),
                location: location.to_owned(),
            }),
            event_options(correlation_id, clock),
        );
        Ok(store)
    }

    /// Enables mall participation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the store is already participating.
    pub fn enable_participation(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.participating {
            return Err(DomainError::Validation(
                "the store is already participating".into(),
            ));
        }
        self.aggregate.add_event(
            STORE_PARTICIPATION_ENABLED_EVENT,
            StoreEvent::ParticipationToggled(StoreParticipationToggled {
                participating: true,
            }),
            event_options(correlation_id, clock),
        );
        Ok(())
    }

    /// Disables mall participation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the store is not participating.
    pub fn disable_participation(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.participating {
            return Err(DomainError::Validation(
                "the store is not participating".into(),
            ));
        }
        self.aggregate.add_event(
            STORE_PARTICIPATION_DISABLED_EVENT,
            StoreEvent::ParticipationToggled(StoreParticipationToggled {
                participating: false,
            }),
            event_options(correlation_id, clock),
        );
        Ok(())
    }

    /// Renames the store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the new name is blank.
    pub fn rebrand(
        &mut self,
        name: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        require(name, "the store name cannot be blank")?;
        self.aggregate.add_event(
            STORE_REBRANDED_EVENT,
            StoreEvent::Rebranded(StoreRebranded {
                name: name.to_owned(),
            }),
            event_options(correlation_id, clock),
        );
        Ok(())
    }
}

impl EventSourced for Store {
    type Payload = StoreEvent;

    fn aggregate(&self) -> &Aggregate<StoreEvent> {
        &self.aggregate
    }

    fn aggregate_mut(&mut self) -> &mut Aggregate<StoreEvent> {
        &mut self.aggregate
    }

    fn apply_event(&mut self, event: &Event<StoreEvent>) -> Result<(), DomainError> {
        match (event.name(), event.payload()) {
            (STORE_CREATED_EVENT, StoreEvent::Created(payload)) => {
                self.name.clone_from(&payload.name);
                self.location.clone_from(&payload.location);
            }
            (
                STORE_PARTICIPATION_ENABLED_EVENT | STORE_PARTICIPATION_DISABLED_EVENT,
                StoreEvent::ParticipationToggled(payload),
            ) => {
                self.participating = payload.participating;
            }
            (STORE_REBRANDED_EVENT, StoreEvent::Rebranded(payload)) => {
                self.name.clone_from(&payload.name);
            }
            (name, payload) => {
                return Err(DomainError::ReplayContract(format!(
                    "store {} received the event {name} with unexpected payload {payload:?}",
                    self.id()
                )));
            }
        }
        Ok(())
    }
}

impl Snapshotter for Store {
    type Snapshot = StoreV1;

    fn apply_snapshot(&mut self, snapshot: &StoreV1) -> Result<(), DomainError> {
        self.name.clone_from(&snapshot.name);
        self.location.clone_from(&snapshot.location);
        self.participating = snapshot.participating;
        Ok(())
    }

    fn to_snapshot(&self) -> StoreV1 {
        StoreV1 {
            name: self.name.clone(),
            location: self.location.clone(),
            participating: self.participating,
        }
    }
}

/// The aggregate root for a product in a store's catalog.
#[derive(Debug)]
pub struct Product {
    aggregate: Aggregate<ProductEvent>,
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
    /// Whether the product has been removed.
    pub removed: bool,
}

impl Product {
    /// Creates a blank product ready for replay.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            aggregate: Aggregate::new(id, PRODUCT_AGGREGATE),
            store_id: String::new(),
            name: String::new(),
            description: String::new(),
            sku: String::new(),
            price: 0.0,
            removed: false,
        }
    }

    /// Adds a new product to a store, producing a `ProductAdded` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the store ID or name is blank, or
    /// the price is not positive.
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        id: &str,
        store_id: &str,
        name: &str,
        description: &str,
        sku: &str,
        price: f64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        require(store_id, "the product store id cannot be blank")?;
        require(name, "the product name cannot be blank")?;
        if price <= 0.0 {
            return Err(DomainError::Validation(
                "the product price must be greater than zero".into(),
            ));
        }

        let mut product = Self::new(id);
        product.aggregate.add_event(
            PRODUCT_ADDED_EVENT,
            ProductEvent::Added(ProductAdded {
                store_id: store_id.to_owned(),
                name: name.to_owned(),
                description: description.to_owned(),
                sku: sku.to_owned(),
                price,
            }),
            event_options(correlation_id, clock),
        );
        Ok(product)
    }

    fn ensure_available(&self) -> Result<(), DomainError> {
        if self.removed {
            return Err(DomainError::Validation(format!(
                "product {} has been removed",
                self.id()
            )));
        }
        Ok(())
    }

    /// Changes the product name and description.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is blank or the product
    /// has been removed.
    pub fn rebrand(
        &mut self,
        name: &str,
        description: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_available()?;
        require(name, "the product name cannot be blank")?;
        self.aggregate.add_event(
            PRODUCT_REBRANDED_EVENT,
            ProductEvent::Rebranded(ProductRebranded {
                name: name.to_owned(),
                description: description.to_owned(),
            }),
            event_options(correlation_id, clock),
        );
        Ok(())
    }

    /// Raises the price to `price`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `price` is not above the current
    /// price or the product has been removed.
    pub fn increase_price(
        &mut self,
        price: f64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_available()?;
        if price <= self.price {
            return Err(DomainError::Validation(
                "the price increase would be a decrease".into(),
            ));
        }
        self.aggregate.add_event(
            PRODUCT_PRICE_INCREASED_EVENT,
            ProductEvent::PriceChanged(ProductPriceChanged {
                delta: price - self.price,
            }),
            event_options(correlation_id, clock),
        );
        Ok(())
    }

    /// Lowers the price to `price`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `price` is not below the current
    /// price, is not positive, or the product has been removed.
    pub fn decrease_price(
        &mut self,
        price: f64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_available()?;
        if price >= self.price {
            return Err(DomainError::Validation(
                "the price decrease would be an increase".into(),
            ));
        }
        if price <= 0.0 {
            return Err(DomainError::Validation(
                "the product price must be greater than zero".into(),
            ));
        }
        self.aggregate.add_event(
            PRODUCT_PRICE_DECREASED_EVENT,
            ProductEvent::PriceChanged(ProductPriceChanged {
                delta: price - self.price,
            }),
            event_options(correlation_id, clock),
        );
        Ok(())
    }

    /// Removes the product from its store's catalog.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the product was already removed.
    pub fn remove(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_available()?;
        self.aggregate.add_event(
            PRODUCT_REMOVED_EVENT,
            ProductEvent::Removed(ProductRemoved {}),
            event_options(correlation_id, clock),
        );
        Ok(())
    }
}

impl EventSourced for Product {
    type Payload = ProductEvent;

    fn aggregate(&self) -> &Aggregate<ProductEvent> {
        &self.aggregate
    }

    fn aggregate_mut(&mut self) -> &mut Aggregate<ProductEvent> {
        &mut self.aggregate
    }

    fn apply_event(&mut self, event: &Event<ProductEvent>) -> Result<(), DomainError> {
        match (event.name(), event.payload()) {
            (PRODUCT_ADDED_EVENT, ProductEvent::Added(payload)) => {
                self.store_id.clone_from(&payload.store_id);
                self.name.clone_from(&payload.name);
                self.description.clone_from(&payload.description);
                self.sku.clone_from(&payload.sku);
                self.price = payload.price;
            }
            (PRODUCT_REBRANDED_EVENT, ProductEvent::Rebranded(payload)) => {
                self.name.clone_from(&payload.name);
                self.description.clone_from(&payload.description);
            }
            (
                PRODUCT_PRICE_INCREASED_EVENT | PRODUCT_PRICE_DECREASED_EVENT,
                ProductEvent::PriceChanged(payload),
            ) => {
                self.price += payload.delta;
            }
            (PRODUCT_REMOVED_EVENT, ProductEvent::Removed(_)) => {
                self.removed = true;
            }
            (name, payload) => {
                return Err(DomainError::ReplayContract(format!(
                    "product {} received the event {name} with unexpected payload {payload:?}",
                    self.id()
                )));
            }
        }
        Ok(())
    }
}

impl Snapshotter for Product {
    type Snapshot = ProductV1;

    fn apply_snapshot(&mut self, snapshot: &ProductV1) -> Result<(), DomainError> {
        self.store_id.clone_from(&snapshot.store_id);
        self.name.clone_from(&snapshot.name);
        self.description.clone_from(&snapshot.description);
        self.sku.clone_from(&snapshot.sku);
        self.price = snapshot.price;
        self.removed = snapshot.removed;
        Ok(())
    }

    fn to_snapshot(&self) -> ProductV1 {
        ProductV1 {
            store_id: self.store_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            sku: self.sku.clone(),
            price: self.price,
            removed: self.removed,
        }
    }
}
