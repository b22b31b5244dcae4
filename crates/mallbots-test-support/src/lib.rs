//! Shared test doubles for the MallBots services.

mod bus;
mod clock;
mod storage;

pub use bus::{FailingEventBus, RecordingEventBus};
pub use clock::FixedClock;
pub use storage::{
    FailingEventStorage, FailingSnapshotStorage, FlakyEventStorage, RecordingEventStorage,
};
