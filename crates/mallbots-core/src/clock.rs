//! Time source for event timestamps.

use chrono::{DateTime, Utc};

/// Supplies the `occurred_at` timestamp of newly recorded events.
///
/// Business methods take a `&dyn Clock` so tests can pin event timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
