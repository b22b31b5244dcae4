//! Integration tests for `AggregateRepository` over the full store chain.

mod common;

use std::sync::Arc;

use chrono::Utc;
use mallbots_core::aggregate::EventSourced;
use mallbots_core::error::DomainError;
use mallbots_core::event_store::{EventStorage, EventStore, StoredEvent};
use mallbots_core::memory::{InMemoryEventStorage, InMemorySnapshotStorage};
use mallbots_core::registry::Registry;
use mallbots_core::repository::AggregateRepository;
use mallbots_core::snapshot::SnapshotPolicy;
use mallbots_core::snapshot_store::{SnapshotStorage, StoredSnapshot};
use mallbots_test_support::{
    FailingEventBus, FailingEventStorage, FailingSnapshotStorage, FlakyEventStorage,
    RecordingEventBus, RecordingEventStorage,
};
use uuid::Uuid;

use common::{CREDITED, LEDGER, LEDGER_V1, Ledger, LedgerEvent};

#[tokio::test]
async fn test_save_then_load_round_trips_state_and_version() {
    // Arrange
    let storage = Arc::new(InMemoryEventStorage::new());
    let repo = common::plain_repository(storage);
    let mut ledger = Ledger::open("l-1", "ada");
    ledger.credit(10);
    ledger.debit(3);

    // Act
    repo.save(&mut ledger).await.unwrap();
    let loaded = repo.load("l-1").await.unwrap();

    // Assert
    assert_eq!(ledger.version(), 3);
    assert!(ledger.events().is_empty());
    assert_eq!(loaded.version(), 3);
    assert_eq!(loaded.pending_version(), 3);
    assert_eq!(loaded.owner, "ada");
    assert_eq!(loaded.balance, 7);
}

#[tokio::test]
async fn test_save_without_pending_events_does_not_touch_storage() {
    // Arrange
    let storage = Arc::new(RecordingEventStorage::new());
    let repo = common::plain_repository(storage.clone());
    let mut ledger = Ledger::open("l-1", "ada");
    repo.save(&mut ledger).await.unwrap();

    // Act
    repo.save(&mut ledger).await.unwrap();

    // Assert
    assert_eq!(storage.appended_events().len(), 1);
    assert_eq!(ledger.version(), 1);
}

#[tokio::test]
async fn test_save_after_load_without_changes_neither_appends_nor_publishes() {
    // Arrange
    let storage = Arc::new(RecordingEventStorage::new());
    let bus = Arc::new(RecordingEventBus::<LedgerEvent>::new());
    let repo = common::full_repository(
        storage.clone(),
        Arc::new(InMemorySnapshotStorage::new()),
        SnapshotPolicy::Always,
        bus.clone(),
    );
    let mut ledger = Ledger::open("l-1", "ada");
    ledger.credit(3);
    repo.save(&mut ledger).await.unwrap();
    let mut loaded = repo.load("l-1").await.unwrap();

    // Act
    repo.save(&mut loaded).await.unwrap();

    // Assert
    assert_eq!(storage.appended_events().len(), 1);
    assert_eq!(bus.batches().len(), 1);
    assert_eq!(loaded.version(), 2);
    assert_eq!(loaded.balance, 3);
}

#[tokio::test]
async fn test_rejected_apply_keeps_pending_events_and_skips_storage() {
    // Arrange
    let storage = Arc::new(RecordingEventStorage::new());
    let repo = common::plain_repository(storage.clone());
    let mut ledger = Ledger::open("l-1", "ada");
    ledger.aggregate_mut().add_event(
        CREDITED,
        LedgerEvent::Opened {
            owner: "mallory".to_owned(),
        },
        [],
    );

    // Act
    let result = repo.save(&mut ledger).await;

    // Assert
    assert!(matches!(result, Err(DomainError::ReplayContract(_))));
    assert!(storage.appended_events().is_empty());
    assert_eq!(ledger.version(), 0);
    assert_eq!(ledger.events().len(), 2);
    assert_eq!(ledger.owner, "ada");
}

#[tokio::test]
async fn test_retried_save_applies_each_event_once() {
    // Arrange
    let storage = Arc::new(FlakyEventStorage::new(1));
    let snapshots = Arc::new(InMemorySnapshotStorage::new());
    let bus = Arc::new(RecordingEventBus::<LedgerEvent>::new());
    let repo = common::full_repository(
        storage.clone(),
        snapshots.clone(),
        SnapshotPolicy::Always,
        bus.clone(),
    );
    let mut ledger = Ledger::open("l-1", "ada");
    ledger.credit(5);
    let first = repo.save(&mut ledger).await;

    // Act
    repo.save(&mut ledger).await.unwrap();
    let loaded = repo.load("l-1").await.unwrap();

    // Assert
    assert!(matches!(first, Err(DomainError::Infrastructure(_))));
    assert_eq!(ledger.balance, 5);
    assert_eq!(ledger.version(), 2);
    assert_eq!(loaded.balance, 5);
    assert_eq!(loaded.version(), 2);
    assert_eq!(storage.inner().stream(LEDGER, "l-1").unwrap().len(), 2);
    let snapshot = snapshots.load_snapshot(LEDGER, "l-1").await.unwrap().unwrap();
    assert_eq!(snapshot.aggregate_version, 2);
    assert_eq!(snapshot.payload["balance"], 5);
    assert_eq!(bus.batches().len(), 1);
}

#[tokio::test]
async fn test_second_writer_gets_concurrency_conflict_and_nothing_is_appended() {
    // Arrange
    let storage = Arc::new(InMemoryEventStorage::new());
    let repo = common::plain_repository(storage.clone());
    let mut ledger = Ledger::open("l-1", "ada");
    repo.save(&mut ledger).await.unwrap();

    let mut first = repo.load("l-1").await.unwrap();
    let mut second = repo.load("l-1").await.unwrap();
    first.credit(5);
    second.credit(7);
    repo.save(&mut first).await.unwrap();

    // Act
    let result = repo.save(&mut second).await;

    // Assert
    match result {
        Err(DomainError::ConcurrencyConflict {
            aggregate_id,
            expected,
            actual,
        }) => {
            assert_eq!(aggregate_id, "l-1");
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
    assert_eq!(second.version(), 1);
    assert_eq!(second.events().len(), 1);
    assert_eq!(storage.stream(LEDGER, "l-1").unwrap().len(), 2);
    assert_eq!(repo.load("l-1").await.unwrap().balance, 5);
}

#[tokio::test]
async fn test_load_of_unknown_id_returns_aggregate_not_found() {
    let repo = common::plain_repository(Arc::new(InMemoryEventStorage::new()));

    let result = repo.load("missing").await;

    match result {
        Err(DomainError::AggregateNotFound {
            aggregate_name,
            aggregate_id,
        }) => {
            assert_eq!(aggregate_name, LEDGER);
            assert_eq!(aggregate_id, "missing");
        }
        other => panic!("expected AggregateNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_with_unregistered_aggregate_name_returns_registry_error() {
    let registry = common::registry();
    let store = Arc::new(EventStore::<Ledger>::new(
        Arc::new(InMemoryEventStorage::new()),
        Arc::clone(&registry),
    ));
    let repo = AggregateRepository::new("tests.Unknown", registry, store);

    let result = repo.load("l-1").await;

    assert!(matches!(result, Err(DomainError::Registry(_))));
}

#[tokio::test]
async fn test_load_when_registry_builds_other_type_returns_type_mismatch() {
    // Arrange
    let mut registry = Registry::new();
    registry
        .register_aggregate(LEDGER, |id| id.to_owned())
        .unwrap();
    let registry = Arc::new(registry);
    let store = Arc::new(EventStore::<Ledger>::new(
        Arc::new(InMemoryEventStorage::new()),
        Arc::clone(&registry),
    ));
    let repo = AggregateRepository::new(LEDGER, registry, store);

    // Act
    let result = repo.load("l-1").await;

    // Assert
    match result {
        Err(DomainError::TypeMismatch {
            aggregate_name,
            expected,
        }) => {
            assert_eq!(aggregate_name, LEDGER);
            assert!(expected.ends_with("Ledger"));
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_of_unregistered_event_name_is_replay_contract_violation() {
    // Arrange
    let storage = Arc::new(InMemoryEventStorage::new());
    storage
        .append_events(
            LEDGER,
            "l-1",
            0,
            &[StoredEvent {
                event_id: Uuid::new_v4(),
                event_name: "tests.LedgerFrozen".to_owned(),
                aggregate_id: "l-1".to_owned(),
                aggregate_name: LEDGER.to_owned(),
                aggregate_version: 1,
                payload: serde_json::json!({}),
                metadata: serde_json::json!({}),
                occurred_at: Utc::now(),
            }],
        )
        .await
        .unwrap();
    let repo = common::plain_repository(storage);

    // Act
    let result = repo.load("l-1").await;

    // Assert
    assert!(matches!(result, Err(DomainError::ReplayContract(_))));
}

#[tokio::test]
async fn test_failed_durable_write_never_publishes() {
    // Arrange
    let bus = Arc::new(RecordingEventBus::<LedgerEvent>::new());
    let repo = common::full_repository(
        Arc::new(FailingEventStorage),
        Arc::new(InMemorySnapshotStorage::new()),
        SnapshotPolicy::Always,
        bus.clone(),
    );
    let mut ledger = Ledger::open("l-1", "ada");

    // Act
    let result = repo.save(&mut ledger).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    assert!(bus.published().is_empty());
    assert_eq!(ledger.version(), 0);
    assert_eq!(ledger.events().len(), 1);
}

#[tokio::test]
async fn test_saved_events_are_published_once_in_version_order() {
    // Arrange
    let bus = Arc::new(RecordingEventBus::<LedgerEvent>::new());
    let repo = common::full_repository(
        Arc::new(InMemoryEventStorage::new()),
        Arc::new(InMemorySnapshotStorage::new()),
        SnapshotPolicy::Never,
        bus.clone(),
    );
    let mut ledger = Ledger::open("l-1", "ada");
    ledger.credit(4);

    // Act
    repo.save(&mut ledger).await.unwrap();
    repo.save(&mut ledger).await.unwrap();

    // Assert
    let batches = bus.batches();
    assert_eq!(batches.len(), 1);
    let versions: Vec<i64> = batches[0].iter().map(|e| e.aggregate_version()).collect();
    assert_eq!(versions, vec![1, 2]);
    assert_eq!(batches[0][1].name(), common::CREDITED);
}

#[tokio::test]
async fn test_publish_failure_reports_publication_after_events_are_stored() {
    // Arrange
    let storage = Arc::new(InMemoryEventStorage::new());
    let repo = common::full_repository(
        storage.clone(),
        Arc::new(InMemorySnapshotStorage::new()),
        SnapshotPolicy::Never,
        Arc::new(FailingEventBus),
    );
    let mut ledger = Ledger::open("l-1", "ada");

    // Act
    let result = repo.save(&mut ledger).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Publication(_))));
    assert_eq!(storage.stream(LEDGER, "l-1").unwrap().len(), 1);
}

#[tokio::test]
async fn test_snapshot_load_replays_only_tail_and_matches_full_replay() {
    // Arrange
    let storage = Arc::new(RecordingEventStorage::new());
    let snapshots = Arc::new(InMemorySnapshotStorage::new());
    let repo = common::full_repository(
        storage.clone(),
        snapshots.clone(),
        SnapshotPolicy::EveryNVersions(3),
        Arc::new(RecordingEventBus::<LedgerEvent>::new()),
    );
    let mut ledger = Ledger::open("l-1", "ada");
    ledger.credit(10);
    ledger.credit(5);
    repo.save(&mut ledger).await.unwrap();
    let mut ledger = repo.load("l-1").await.unwrap();
    ledger.debit(4);
    repo.save(&mut ledger).await.unwrap();

    // Act
    let from_snapshot = repo.load("l-1").await.unwrap();
    let from_events = common::plain_repository(storage.clone())
        .load("l-1")
        .await
        .unwrap();

    // Assert
    let snapshot = snapshots.load_snapshot(LEDGER, "l-1").await.unwrap().unwrap();
    assert_eq!(snapshot.aggregate_version, 3);
    assert_eq!(snapshot.snapshot_name, LEDGER_V1);
    let loads = storage.loads();
    assert_eq!(loads[1], ("l-1".to_owned(), 3));
    assert_eq!(loads[2], ("l-1".to_owned(), 0));
    assert_eq!(from_snapshot.version(), 4);
    assert_eq!(from_snapshot.version(), from_events.version());
    assert_eq!(from_snapshot.balance, from_events.balance);
    assert_eq!(from_snapshot.owner, from_events.owner);
}

#[tokio::test]
async fn test_unavailable_snapshot_storage_degrades_to_full_replay() {
    // Arrange
    let repo = common::full_repository(
        Arc::new(InMemoryEventStorage::new()),
        Arc::new(FailingSnapshotStorage),
        SnapshotPolicy::Always,
        Arc::new(RecordingEventBus::<LedgerEvent>::new()),
    );
    let mut ledger = Ledger::open("l-1", "ada");
    ledger.credit(2);

    // Act
    repo.save(&mut ledger).await.unwrap();
    let loaded = repo.load("l-1").await.unwrap();

    // Assert
    assert_eq!(loaded.version(), 2);
    assert_eq!(loaded.balance, 2);
}

#[tokio::test]
async fn test_undecodable_snapshot_fails_the_load() {
    // Arrange
    let snapshots = Arc::new(InMemorySnapshotStorage::new());
    snapshots
        .save_snapshot(StoredSnapshot {
            aggregate_id: "l-1".to_owned(),
            aggregate_name: LEDGER.to_owned(),
            aggregate_version: 3,
            snapshot_name: LEDGER_V1.to_owned(),
            payload: serde_json::json!({ "unexpected": true }),
            taken_at: Utc::now(),
        })
        .await
        .unwrap();
    let repo = common::full_repository(
        Arc::new(InMemoryEventStorage::new()),
        snapshots,
        SnapshotPolicy::Never,
        Arc::new(RecordingEventBus::<LedgerEvent>::new()),
    );

    // Act
    let result = repo.load("l-1").await;

    // Assert
    assert!(matches!(result, Err(DomainError::ReplayContract(_))));
}
