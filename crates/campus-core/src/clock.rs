use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Every expiry comparison goes through this indirection so tests can move
/// time without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Seconds since the UNIX epoch, as used by JWT `iat`/`exp` claims.
    fn now_secs(&self) -> u64 {
        u64::try_from(self.now().timestamp()).unwrap_or(0)
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
