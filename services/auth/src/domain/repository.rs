#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    AuthUser, PasswordResetToken, RefreshTokenRecord, RotateOutcome, TwoFactorCode,
};
use crate::error::AuthServiceError;

/// Read access to user credentials.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthServiceError>;
}

/// Repository for hashed refresh tokens.
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: &RefreshTokenRecord) -> Result<(), AuthServiceError>;

    /// Invalidate the row matching `old_hash` and insert a replacement row with
    /// `new_hash` for the same user, in one transaction.
    ///
    /// The invalidation is a conditional update on `rotated_at IS NULL`, so of
    /// two concurrent calls with the same `old_hash` exactly one returns
    /// [`RotateOutcome::Rotated`].
    async fn rotate(
        &self,
        old_hash: &str,
        new_hash: &str,
        new_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<RotateOutcome, AuthServiceError>;

    /// Returns the number of rows deleted.
    async fn delete_by_hash(&self, token_hash: &str) -> Result<u64, AuthServiceError>;

    async fn delete_by_user(&self, user_id: Uuid) -> Result<u64, AuthServiceError>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError>;
}

/// Repository for one-time second-factor codes.
pub trait TwoFactorCodeRepository: Send + Sync {
    /// Insert a new code, retiring the user's outstanding codes in the same transaction.
    async fn create(&self, code: &TwoFactorCode) -> Result<(), AuthServiceError>;

    /// Most recent unused, unexpired code under the attempt limit.
    async fn find_latest_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<TwoFactorCode>, AuthServiceError>;

    /// Mark a code used if it is still unused. Returns `true` only for the
    /// caller whose update took effect.
    async fn mark_used(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, AuthServiceError>;

    async fn record_failed_attempt(&self, id: Uuid) -> Result<(), AuthServiceError>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError>;
}

/// Repository for password reset tokens.
pub trait PasswordResetRepository: Send + Sync {
    async fn create(&self, token: &PasswordResetToken) -> Result<(), AuthServiceError>;

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordResetToken>, AuthServiceError>;

    /// Consume the token and apply the new credential atomically: mark this
    /// and every other outstanding reset token of the user used, replace the
    /// password hash, and delete all of the user's refresh tokens.
    ///
    /// Returns the user id, or `None` if the token was no longer active.
    async fn redeem(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AuthServiceError>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError>;
}
