//! Test clock — a `Clock` pinned to one instant so story folder names and
//! publish timestamps are predictable.

use chrono::{DateTime, TimeZone, Utc};
use saga_core::clock::Clock;

/// A clock that always returns the same UTC instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Pins the clock to the given UTC date and time.
    ///
    /// # Panics
    ///
    /// Panics if the fields do not form a valid date and time.
    #[must_use]
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Self(Utc.with_ymd_and_hms(year, month, day, hour, min, sec).unwrap())
    }

    /// The pinned instant as a `story_YYYYMMDD_HHMMSS` folder name.
    #[must_use]
    pub fn folder_name(&self) -> String {
        format!("story_{}", self.0.format("%Y%m%d_%H%M%S"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
