//! Snapshot abstractions.
//!
//! A snapshot is a compacted projection of an aggregate's full state at some
//! version. Loading a snapshot first and replaying only the later events bounds
//! replay cost for long-lived aggregates.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::aggregate::EventSourced;
use crate::error::DomainError;

/// A named, serializable projection of aggregate state.
///
/// Snapshots carry no identity or version of their own; the snapshot store
/// pairs them with both.
pub trait Snapshot:
    Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Returns the registry name of this snapshot shape, e.g. `stores.StoreV1`.
    fn snapshot_name(&self) -> &'static str;
}

/// An aggregate that can be captured into, and restored from, a snapshot.
pub trait Snapshotter: EventSourced {
    /// The snapshot shape for this aggregate.
    type Snapshot: Snapshot;

    /// Overwrites domain state from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ReplayContract` if the snapshot is not one this
    /// aggregate recognizes.
    fn apply_snapshot(&mut self, snapshot: &Self::Snapshot) -> Result<(), DomainError>;

    /// Captures the current domain state.
    fn to_snapshot(&self) -> Self::Snapshot;
}

/// When the snapshot store writes a new snapshot during a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPolicy {
    /// Snapshot after every save.
    Always,
    /// Snapshot whenever a save crosses a multiple of `n` versions.
    EveryNVersions(i64),
    /// Never write snapshots; existing ones are still read.
    Never,
}

impl SnapshotPolicy {
    /// Decides whether a save moving from `version` to `pending_version`
    /// should write a snapshot.
    #[must_use]
    pub fn should_snapshot(&self, version: i64, pending_version: i64) -> bool {
        if pending_version <= version {
            return false;
        }
        match *self {
            Self::Always => true,
            Self::EveryNVersions(n) if n > 0 => pending_version / n > version / n,
            Self::EveryNVersions(_) | Self::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_n_versions_fires_when_crossing_multiple() {
        let policy = SnapshotPolicy::EveryNVersions(3);

        assert!(!policy.should_snapshot(0, 1));
        assert!(!policy.should_snapshot(1, 2));
        assert!(policy.should_snapshot(2, 3));
        assert!(policy.should_snapshot(1, 5));
        assert!(!policy.should_snapshot(3, 5));
        assert!(policy.should_snapshot(0, 7));
    }

    #[test]
    fn test_every_zero_versions_never_fires() {
        assert!(!SnapshotPolicy::EveryNVersions(0).should_snapshot(0, 10));
    }

    #[test]
    fn test_always_and_never() {
        assert!(SnapshotPolicy::Always.should_snapshot(0, 1));
        assert!(!SnapshotPolicy::Always.should_snapshot(1, 1));
        assert!(!SnapshotPolicy::Never.should_snapshot(0, 100));
    }
}
