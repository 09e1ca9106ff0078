//! Clock abstraction used to stamp `occurred_at` on new events.

use chrono::{DateTime, Utc};

/// Source of the current time for domain methods.
///
/// Aggregates never call `Utc::now()` directly so that tests can pin the
/// timestamps recorded on uncommitted events.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
