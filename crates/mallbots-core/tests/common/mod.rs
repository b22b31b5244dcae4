//! Shared fixtures for the persistence engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use mallbots_core::aggregate::{Aggregate, EventSourced};
use mallbots_core::dispatcher::EventBus;
use mallbots_core::error::DomainError;
use mallbots_core::event::Event;
use mallbots_core::event_store::{EventStorage, EventStore};
use mallbots_core::publisher::EventPublisher;
use mallbots_core::registry::Registry;
use mallbots_core::repository::AggregateRepository;
use mallbots_core::snapshot::{Snapshot, SnapshotPolicy, Snapshotter};
use mallbots_core::snapshot_store::{SnapshotStorage, SnapshotStore};
use mallbots_core::store::aggregate_store_with_middleware;
use serde::{Deserialize, Serialize};

pub const LEDGER: &str = "tests.Ledger";
pub const OPENED: &str = "tests.LedgerOpened";
pub const CREDITED: &str = "tests.LedgerCredited";
pub const DEBITED: &str = "tests.LedgerDebited";
pub const LEDGER_V1: &str = "tests.LedgerV1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    Opened { owner: String },
    Amount { amount: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerV1 {
    pub owner: String,
    pub balance: i64,
}

impl Snapshot for LedgerV1 {
    fn snapshot_name(&self) -> &'static str {
        LEDGER_V1
    }
}

#[derive(Debug)]
pub struct Ledger {
    aggregate: Aggregate<LedgerEvent>,
    pub owner: String,
    pub balance: i64,
}

impl Ledger {
    pub fn new(id: &str) -> Self {
        Self {
            aggregate: Aggregate::new(id, LEDGER),
            owner: String::new(),
            balance: 0,
        }
    }

    pub fn open(id: &str, owner: &str) -> Self {
        let mut ledger = Self::new(id);
        ledger.aggregate.add_event(
            OPENED,
            LedgerEvent::Opened {
                owner: owner.to_owned(),
            },
            [],
        );
        ledger
    }

    pub fn credit(&mut self, amount: i64) {
        self.aggregate
            .add_event(CREDITED, LedgerEvent::Amount { amount }, []);
    }

    pub fn debit(&mut self, amount: i64) {
        self.aggregate
            .add_event(DEBITED, LedgerEvent::Amount { amount }, []);
    }
}

impl EventSourced for Ledger {
    type Payload = LedgerEvent;

    fn aggregate(&self) -> &Aggregate<LedgerEvent> {
        &self.aggregate
    }

    fn aggregate_mut(&mut self) -> &mut Aggregate<LedgerEvent> {
        &mut self.aggregate
    }

    fn apply_event(&mut self, event: &Event<LedgerEvent>) -> Result<(), DomainError> {
        match (event.name(), event.payload()) {
            (OPENED, LedgerEvent::Opened { owner }) => self.owner.clone_from(owner),
            (CREDITED, LedgerEvent::Amount { amount }) => self.balance += amount,
            (DEBITED, LedgerEvent::Amount { amount }) => self.balance -= amount,
            (name, payload) => {
                return Err(DomainError::ReplayContract(format!(
                    "ledger cannot apply `{name}` carrying {payload:?}"
                )));
            }
        }
        Ok(())
    }
}

impl Snapshotter for Ledger {
    type Snapshot = LedgerV1;

    fn apply_snapshot(&mut self, snapshot: &LedgerV1) -> Result<(), DomainError> {
        self.owner.clone_from(&snapshot.owner);
        self.balance = snapshot.balance;
        Ok(())
    }

    fn to_snapshot(&self) -> LedgerV1 {
        LedgerV1 {
            owner: self.owner.clone(),
            balance: self.balance,
        }
    }
}

/// A registry knowing the ledger aggregate, its events and its snapshot.
pub fn registry() -> Arc<Registry> {
    let mut registry = Registry::new();
    registry.register_aggregate(LEDGER, Ledger::new).unwrap();
    for name in [OPENED, CREDITED, DEBITED] {
        registry.register_event::<LedgerEvent>(name).unwrap();
    }
    registry.register_snapshot::<LedgerV1>(LEDGER_V1).unwrap();
    Arc::new(registry)
}

/// A repository whose chain is just the event store.
pub fn plain_repository(storage: Arc<dyn EventStorage>) -> AggregateRepository<Ledger> {
    let registry = registry();
    let store = Arc::new(EventStore::<Ledger>::new(storage, Arc::clone(&registry)));
    AggregateRepository::new(LEDGER, registry, store)
}

/// A repository wired with the full publisher/snapshot/event store chain.
pub fn full_repository(
    storage: Arc<dyn EventStorage>,
    snapshots: Arc<dyn SnapshotStorage>,
    policy: SnapshotPolicy,
    bus: Arc<dyn EventBus<LedgerEvent>>,
) -> AggregateRepository<Ledger> {
    let registry = registry();
    let store = aggregate_store_with_middleware(
        Arc::new(EventStore::<Ledger>::new(storage, Arc::clone(&registry))),
        vec![
            EventPublisher::middleware(bus, None),
            SnapshotStore::middleware(snapshots, Arc::clone(&registry), policy),
        ],
    );
    AggregateRepository::new(LEDGER, registry, store)
}
