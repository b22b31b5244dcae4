//! End-to-end tests of the Stores module over in-memory storage.

use std::sync::Arc;
use std::time::Duration;

use mallbots_core::aggregate::EventSourced;
use mallbots_core::error::DomainError;
use mallbots_core::memory::{InMemoryEventStorage, InMemorySnapshotStorage};
use mallbots_core::snapshot::SnapshotPolicy;
use mallbots_core::snapshot_store::SnapshotStorage;
use mallbots_stores::application::StoresApplication;
use mallbots_stores::domain::commands::{
    AddProduct, CreateStore, DecreaseProductPrice, DisableParticipation, EnableParticipation,
    RemoveProduct,
};
use mallbots_stores::domain::events::{
    STORE_AGGREGATE, STORE_CREATED_EVENT, STORE_PARTICIPATION_ENABLED_EVENT,
};
use mallbots_stores::domain::snapshots::STORE_V1_SNAPSHOT;
use mallbots_stores::module::{ReadModels, StoresConfig, StoresModule};
use mallbots_test_support::FixedClock;
use uuid::Uuid;

struct Harness {
    app: StoresApplication,
    events: Arc<InMemoryEventStorage>,
    snapshots: Arc<InMemorySnapshotStorage>,
    read_models: ReadModels,
}

fn start(config: StoresConfig) -> Harness {
    restart(
        Arc::new(InMemoryEventStorage::new()),
        Arc::new(InMemorySnapshotStorage::new()),
        ReadModels::in_memory(),
        config,
    )
}

fn restart(
    events: Arc<InMemoryEventStorage>,
    snapshots: Arc<InMemorySnapshotStorage>,
    read_models: ReadModels,
    config: StoresConfig,
) -> Harness {
    let app = StoresModule::startup(
        Arc::clone(&events) as _,
        Arc::clone(&snapshots) as _,
        read_models.clone(),
        &config,
        Arc::new(FixedClock::default()),
    )
    .unwrap();
    Harness {
        app,
        events,
        snapshots,
        read_models,
    }
}

fn create_store(store_id: &str, name: &str) -> CreateStore {
    CreateStore {
        correlation_id: Uuid::new_v4(),
        store_id: store_id.to_owned(),
        name: name.to_owned(),
        location: "L".to_owned(),
    }
}

fn enable(store_id: &str) -> EnableParticipation {
    EnableParticipation {
        correlation_id: Uuid::new_v4(),
        store_id: store_id.to_owned(),
    }
}

#[tokio::test]
async fn test_store_lifecycle_with_stale_concurrent_writer() {
    // Arrange
    let harness = start(StoresConfig::default());

    // Act: create
    let created = harness
        .app
        .create_store(&create_store("store-1", "A"))
        .await
        .unwrap();

    // Assert: one durable event, projected into the mall
    assert_eq!(created.version, 1);
    let stream = harness.events.stream(STORE_AGGREGATE, "store-1").unwrap();
    assert_eq!(stream.len(), 1);
    assert_eq!(stream[0].event_name, STORE_CREATED_EVENT);
    let listed = harness.app.get_store("store-1").await.unwrap();
    assert_eq!(listed.name, "A");
    assert!(!listed.participating);

    // Act: two writers load the same version
    let loaded = harness.app.stores().load("store-1").await.unwrap();
    assert_eq!(loaded.name, "A");
    let mut stale = harness.app.stores().load("store-1").await.unwrap();
    assert_eq!(stale.version(), 1);

    let enabled = harness
        .app
        .enable_participation(&enable("store-1"))
        .await
        .unwrap();
    stale
        .enable_participation(Uuid::new_v4(), &FixedClock::default())
        .unwrap();
    let conflict = harness.app.stores().save(&mut stale).await;

    // Assert
    assert_eq!(enabled.version, 2);
    match conflict {
        Err(DomainError::ConcurrencyConflict {
            aggregate_id,
            expected,
            actual,
        }) => {
            assert_eq!(aggregate_id, "store-1");
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
    let stream = harness.events.stream(STORE_AGGREGATE, "store-1").unwrap();
    assert_eq!(stream.len(), 2);
    assert_eq!(stream[1].event_name, STORE_PARTICIPATION_ENABLED_EVENT);
    let participating = harness.app.get_participating_stores().await.unwrap();
    assert_eq!(participating.len(), 1);
    assert_eq!(participating[0].id, "store-1");
}

#[tokio::test]
async fn test_snapshot_is_written_when_save_crosses_interval() {
    // Arrange
    let harness = start(StoresConfig {
        snapshot_policy: SnapshotPolicy::EveryNVersions(3),
        publish_timeout: Some(Duration::from_secs(1)),
    });
    harness
        .app
        .create_store(&create_store("store-1", "A"))
        .await
        .unwrap();
    harness
        .app
        .enable_participation(&enable("store-1"))
        .await
        .unwrap();
    let before = harness
        .snapshots
        .load_snapshot(STORE_AGGREGATE, "store-1")
        .await
        .unwrap();

    // Act
    harness
        .app
        .disable_participation(&DisableParticipation {
            correlation_id: Uuid::new_v4(),
            store_id: "store-1".to_owned(),
        })
        .await
        .unwrap();

    // Assert
    assert!(before.is_none());
    let snapshot = harness
        .snapshots
        .load_snapshot(STORE_AGGREGATE, "store-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.aggregate_version, 3);
    assert_eq!(snapshot.snapshot_name, STORE_V1_SNAPSHOT);
    assert_eq!(snapshot.payload["participating"], serde_json::json!(false));
    let reloaded = harness.app.stores().load("store-1").await.unwrap();
    assert_eq!(reloaded.version(), 3);
    assert!(!reloaded.participating);
}

#[tokio::test]
async fn test_catalog_follows_product_changes() {
    // Arrange
    let harness = start(StoresConfig {
        snapshot_policy: SnapshotPolicy::Never,
        publish_timeout: None,
    });
    harness
        .app
        .create_store(&create_store("store-1", "A"))
        .await
        .unwrap();
    for (product_id, price) in [("p-1", 10.0), ("p-2", 4.0)] {
        harness
            .app
            .add_product(&AddProduct {
                correlation_id: Uuid::new_v4(),
                product_id: product_id.to_owned(),
                store_id: "store-1".to_owned(),
                name: format!("Product {product_id}"),
                description: String::new(),
                sku: product_id.to_uppercase(),
                price,
            })
            .await
            .unwrap();
    }

    // Act
    harness
        .app
        .decrease_product_price(&DecreaseProductPrice {
            correlation_id: Uuid::new_v4(),
            product_id: "p-1".to_owned(),
            price: 7.5,
        })
        .await
        .unwrap();
    harness
        .app
        .remove_product(&RemoveProduct {
            correlation_id: Uuid::new_v4(),
            product_id: "p-2".to_owned(),
        })
        .await
        .unwrap();

    // Assert
    let catalog = harness.app.get_catalog("store-1").await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, "p-1");
    assert!((catalog[0].price - 7.5).abs() < f64::EPSILON);
    assert!(matches!(
        harness.app.get_product("p-2").await,
        Err(DomainError::AggregateNotFound { .. })
    ));
    let removed = harness.app.products().load("p-2").await.unwrap();
    assert!(removed.removed);
    assert_eq!(removed.version(), 2);
}

#[tokio::test]
async fn test_failed_command_leaves_read_models_untouched() {
    let harness = start(StoresConfig::default());

    let result = harness
        .app
        .create_store(&CreateStore {
            correlation_id: Uuid::new_v4(),
            store_id: "store-1".to_owned(),
            name: String::new(),
            location: "L".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(harness.app.get_stores().await.unwrap().is_empty());
    assert!(
        harness
            .events
            .stream(STORE_AGGREGATE, "store-1")
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_restart_over_kept_storage_serves_existing_read_models() {
    // Arrange
    let first = start(StoresConfig::default());
    first
        .app
        .create_store(&create_store("store-1", "A"))
        .await
        .unwrap();
    first
        .app
        .enable_participation(&enable("store-1"))
        .await
        .unwrap();

    // Act
    let second = restart(
        first.events,
        first.snapshots,
        first.read_models,
        StoresConfig::default(),
    );
    let disabled = second
        .app
        .disable_participation(&DisableParticipation {
            correlation_id: Uuid::new_v4(),
            store_id: "store-1".to_owned(),
        })
        .await
        .unwrap();

    // Assert
    assert_eq!(disabled.version, 3);
    let listed = second.app.get_store("store-1").await.unwrap();
    assert_eq!(listed.name, "A");
    assert!(!listed.participating);
    assert!(second.app.get_participating_stores().await.unwrap().is_empty());
}
