use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::error;

use campus_core::clock::SystemClock;

use crate::infra::db::{
    DbPasswordResetRepository, DbRefreshTokenRepository, DbTwoFactorCodeRepository,
};
use crate::usecase::sweep::ExpirySweep;

pub type DbExpirySweep = ExpirySweep<
    DbRefreshTokenRepository,
    DbTwoFactorCodeRepository,
    DbPasswordResetRepository,
    SystemClock,
>;

/// Run the sweep on a fixed period until the runtime shuts down. A failed
/// run is logged and retried on the next tick.
pub fn spawn_expiry_sweep(sweep: DbExpirySweep, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep.run_once().await {
                error!(error = %e, "expiry sweep failed");
            }
        }
    })
}
