//! Periodic deletion of expired tokens and codes.

use tracing::info;

use campus_core::clock::Clock;

use crate::domain::repository::{
    PasswordResetRepository, RefreshTokenRepository, TwoFactorCodeRepository,
};
use crate::domain::types::SweepReport;
use crate::error::AuthServiceError;

pub struct ExpirySweep<R, T, P, C>
where
    R: RefreshTokenRepository,
    T: TwoFactorCodeRepository,
    P: PasswordResetRepository,
    C: Clock,
{
    pub refresh_tokens: R,
    pub two_factor_codes: T,
    pub password_resets: P,
    pub clock: C,
}

impl<R, T, P, C> ExpirySweep<R, T, P, C>
where
    R: RefreshTokenRepository,
    T: TwoFactorCodeRepository,
    P: PasswordResetRepository,
    C: Clock,
{
    /// Delete every row whose deadline has passed. Safe to run concurrently
    /// with itself and with request traffic.
    pub async fn run_once(&self) -> Result<SweepReport, AuthServiceError> {
        let now = self.clock.now();
        let report = SweepReport {
            refresh_tokens: self.refresh_tokens.delete_expired(now).await?,
            two_factor_codes: self.two_factor_codes.delete_expired(now).await?,
            password_reset_tokens: self.password_resets.delete_expired(now).await?,
        };
        if report != SweepReport::default() {
            info!(
                refresh_tokens = report.refresh_tokens,
                two_factor_codes = report.two_factor_codes,
                password_reset_tokens = report.password_reset_tokens,
                "expired rows swept"
            );
        }
        Ok(report)
    }
}
