//! Email-delivered one-time codes for the second login factor.

use chrono::Duration;
use rand::RngExt;
use tracing::info;
use uuid::Uuid;

use campus_core::clock::Clock;

use crate::domain::repository::TwoFactorCodeRepository;
use crate::domain::types::{TWO_FACTOR_CODE_LEN, TwoFactorCode};
use crate::error::AuthServiceError;
use crate::usecase::opaque::{constant_time_eq, hash_token};

fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:0width$}", width = TWO_FACTOR_CODE_LEN)
}

pub struct TwoFactorChallenge<T, C>
where
    T: TwoFactorCodeRepository,
    C: Clock,
{
    pub codes: T,
    pub clock: C,
    pub ttl_secs: i64,
}

impl<T, C> TwoFactorChallenge<T, C>
where
    T: TwoFactorCodeRepository,
    C: Clock,
{
    /// Persist the hash of a fresh code for the user and return the code for
    /// delivery.
    ///
    /// The returned value must only reach the email sender.
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AuthServiceError> {
        let now = self.clock.now();
        let code = generate_code();
        self.codes
            .create(&TwoFactorCode {
                id: Uuid::new_v4(),
                user_id,
                code_hash: hash_token(&code),
                expires_at: now + Duration::seconds(self.ttl_secs),
                is_used: false,
                used_at: None,
                failed_attempts: 0,
                created_at: now,
            })
            .await?;
        Ok(code)
    }

    /// `true` exactly once per issued code, for the caller that consumed it.
    pub async fn verify(&self, user_id: Uuid, candidate: &str) -> Result<bool, AuthServiceError> {
        let now = self.clock.now();
        let Some(active) = self.codes.find_latest_active(user_id, now).await? else {
            info!(user_id = %user_id, "two-factor verification without active code");
            return Ok(false);
        };

        let candidate_hash = hash_token(candidate);
        if !constant_time_eq(active.code_hash.as_bytes(), candidate_hash.as_bytes()) {
            self.codes.record_failed_attempt(active.id).await?;
            info!(user_id = %user_id, "two-factor code mismatch");
            return Ok(false);
        }

        self.codes.mark_used(active.id, now).await
    }
}
