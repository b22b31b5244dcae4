//! Event and snapshot replay protocol.
//!
//! These two functions are the only code allowed to force an aggregate's
//! version. The version is always taken from the replayed event or snapshot,
//! never inferred by counting, so replay stays correct over filtered reads.

use crate::aggregate::EventSourced;
use crate::error::DomainError;
use crate::event::Event;
use crate::snapshot::Snapshotter;

/// Applies a historical event and moves the aggregate to its version.
///
/// # Errors
///
/// Propagates the aggregate's `apply_event` error; the version is left
/// unchanged in that case.
pub fn load_event<T: EventSourced>(
    aggregate: &mut T,
    event: &Event<T::Payload>,
) -> Result<(), DomainError> {
    aggregate.apply_event(event)?;
    aggregate
        .aggregate_mut()
        .set_version(event.aggregate_version());
    Ok(())
}

/// Applies a snapshot and moves the aggregate to `version`.
///
/// # Errors
///
/// Propagates the aggregate's `apply_snapshot` error; the version is left
/// unchanged in that case.
pub fn load_snapshot<T: Snapshotter>(
    aggregate: &mut T,
    snapshot: &T::Snapshot,
    version: i64,
) -> Result<(), DomainError> {
    aggregate.apply_snapshot(snapshot)?;
    aggregate.aggregate_mut().set_version(version);
    Ok(())
}
