//! Test storage: `EventStorage` and `SnapshotStorage` doubles for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mallbots_core::error::DomainError;
use mallbots_core::event_store::{EventStorage, StoredEvent};
use mallbots_core::memory::InMemoryEventStorage;
use mallbots_core::snapshot_store::{SnapshotStorage, StoredSnapshot};

/// An event storage that records every `append_events` call and forwards all
/// calls to an [`InMemoryEventStorage`].
#[derive(Debug, Default)]
pub struct RecordingEventStorage {
    inner: InMemoryEventStorage,
    loads: Mutex<Vec<(String, i64)>>,
    appended: Mutex<Vec<(String, i64, Vec<StoredEvent>)>>,
}

impl RecordingEventStorage {
    /// Creates an empty recording storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the wrapped in-memory log.
    #[must_use]
    pub fn inner(&self) -> &InMemoryEventStorage {
        &self.inner
    }

    /// Returns every `load_events` call as `(aggregate_id, after_version)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn loads(&self) -> Vec<(String, i64)> {
        self.loads.lock().unwrap().clone()
    }

    /// Returns every attempted append as
    /// `(aggregate_id, expected_version, events)`, including rejected ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(String, i64, Vec<StoredEvent>)> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventStorage for RecordingEventStorage {
    async fn load_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        after_version: i64,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        self.loads
            .lock()
            .unwrap()
            .push((aggregate_id.to_owned(), after_version));
        self.inner
            .load_events(aggregate_name, aggregate_id, after_version)
            .await
    }

    async fn append_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended.lock().unwrap().push((
            aggregate_id.to_owned(),
            expected_version,
            events.to_vec(),
        ));
        self.inner
            .append_events(aggregate_name, aggregate_id, expected_version, events)
            .await
    }
}

/// An event storage that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug, Default)]
pub struct FailingEventStorage;

#[async_trait]
impl EventStorage for FailingEventStorage {
    async fn load_events(
        &self,
        _aggregate_name: &str,
        _aggregate_id: &str,
        _after_version: i64,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_name: &str,
        _aggregate_id: &str,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// An event storage whose first `failures` appends return an infrastructure
/// error; every other call goes to an [`InMemoryEventStorage`].
#[derive(Debug, Default)]
pub struct FlakyEventStorage {
    inner: InMemoryEventStorage,
    failures: AtomicUsize,
}

impl FlakyEventStorage {
    /// Creates a storage that rejects the next `failures` appends.
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            inner: InMemoryEventStorage::new(),
            failures: AtomicUsize::new(failures),
        }
    }

    /// Returns the wrapped in-memory log.
    #[must_use]
    pub fn inner(&self) -> &InMemoryEventStorage {
        &self.inner
    }
}

#[async_trait]
impl EventStorage for FlakyEventStorage {
    async fn load_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        after_version: i64,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        self.inner
            .load_events(aggregate_name, aggregate_id, after_version)
            .await
    }

    async fn append_events(
        &self,
        aggregate_name: &str,
        aggregate_id: &str,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DomainError::Infrastructure("connection reset".into()));
        }
        self.inner
            .append_events(aggregate_name, aggregate_id, expected_version, events)
            .await
    }
}

/// A snapshot storage that always returns an infrastructure error.
#[derive(Debug, Default)]
pub struct FailingSnapshotStorage;

#[async_trait]
impl SnapshotStorage for FailingSnapshotStorage {
    async fn load_snapshot(
        &self,
        _aggregate_name: &str,
        _aggregate_id: &str,
    ) -> Result<Option<StoredSnapshot>, DomainError> {
        Err(DomainError::Infrastructure("snapshot backend offline".into()))
    }

    async fn save_snapshot(&self, _snapshot: StoredSnapshot) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("snapshot backend offline".into()))
    }
}
