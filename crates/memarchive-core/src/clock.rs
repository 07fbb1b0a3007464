//! Clock abstraction for stamping stage events.
//!
//! Wall-clock time only labels events; ordering and delays run on the
//! scheduler's virtual time.

use chrono::{DateTime, Utc};

/// Abstraction over system time for deterministic event metadata.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
