//! Wall-clock access for story folder names and publish timestamps.

use chrono::{DateTime, Utc};

/// Source of the current UTC time. Story handlers take one so tests can pin
/// the instant.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the host clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
