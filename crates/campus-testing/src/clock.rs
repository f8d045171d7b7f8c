//! Controllable clock for expiry tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use campus_core::clock::Clock;

/// Clock whose time only moves when a test says so.
///
/// Clones share the same instant, so one handle can be given to the code
/// under test and another kept by the test to advance time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// A clock fixed at 2026-03-01T09:00:00Z.
    pub fn fixed() -> Self {
        Self::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
