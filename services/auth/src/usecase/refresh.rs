//! Opaque refresh-token lifecycle.

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use campus_core::clock::Clock;

use crate::domain::repository::RefreshTokenRepository;
use crate::domain::types::{RefreshTokenRecord, RotateOutcome};
use crate::error::AuthServiceError;
use crate::usecase::opaque::{generate_token, hash_token};

/// A refresh token value as handed to the client, with its absolute deadline.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RotatedRefreshToken {
    pub user_id: Uuid,
    pub token: IssuedRefreshToken,
}

pub struct RefreshTokenStore<R, C>
where
    R: RefreshTokenRepository,
    C: Clock,
{
    pub repo: R,
    pub clock: C,
    pub ttl_secs: i64,
}

impl<R, C> RefreshTokenStore<R, C>
where
    R: RefreshTokenRepository,
    C: Clock,
{
    pub async fn issue(&self, user_id: Uuid) -> Result<IssuedRefreshToken, AuthServiceError> {
        let now = self.clock.now();
        let value = generate_token();
        let expires_at = now + Duration::seconds(self.ttl_secs);
        self.repo
            .create(&RefreshTokenRecord {
                id: Uuid::new_v4(),
                user_id,
                token_hash: hash_token(&value),
                expires_at,
                rotated_at: None,
                created_at: now,
            })
            .await?;
        Ok(IssuedRefreshToken { value, expires_at })
    }

    /// Exchange a live token for a new one. Any failure is `SessionExpired`.
    pub async fn rotate(&self, old_value: &str) -> Result<RotatedRefreshToken, AuthServiceError> {
        let now = self.clock.now();
        let value = generate_token();
        let expires_at = now + Duration::seconds(self.ttl_secs);

        let outcome = self
            .repo
            .rotate(&hash_token(old_value), &hash_token(&value), expires_at, now)
            .await?;

        match outcome {
            RotateOutcome::Rotated { user_id } => Ok(RotatedRefreshToken {
                user_id,
                token: IssuedRefreshToken { value, expires_at },
            }),
            RotateOutcome::NotFound => {
                warn!("refresh rejected: unknown token");
                Err(AuthServiceError::SessionExpired)
            }
            RotateOutcome::Expired => {
                info!("refresh rejected: token expired");
                Err(AuthServiceError::SessionExpired)
            }
            RotateOutcome::Reused { user_id } => {
                error!(user_id = %user_id, "refresh token reuse detected");
                Err(AuthServiceError::SessionExpired)
            }
        }
    }

    /// Delete the row for this value. Absent values are not an error.
    pub async fn revoke(&self, value: &str) -> Result<(), AuthServiceError> {
        self.repo.delete_by_hash(&hash_token(value)).await?;
        Ok(())
    }

    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AuthServiceError> {
        let deleted = self.repo.delete_by_user(user_id).await?;
        info!(user_id = %user_id, deleted, "revoked all refresh tokens");
        Ok(deleted)
    }
}
