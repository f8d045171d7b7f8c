use chrono::{DateTime, Utc};
use uuid::Uuid;

use campus_domain::user::UserRole;

/// Auth-owned projection of a platform user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub two_factor_enabled: bool,
}

/// Persisted refresh token. Only the SHA-256 of the opaque value is stored.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub rotated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Result of an atomic rotation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotateOutcome {
    /// Old row invalidated and replacement inserted.
    Rotated { user_id: Uuid },
    NotFound,
    Expired,
    /// Presented value was already rotated (replayed or lost a concurrent race).
    Reused { user_id: Uuid },
}

/// One-time second-factor code.
#[derive(Debug, Clone)]
pub struct TwoFactorCode {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 hex of the six-digit code.
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub failed_attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl TwoFactorCode {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at > now && self.failed_attempts < MAX_TWO_FACTOR_ATTEMPTS
    }
}

/// Single-use password reset token. Only the SHA-256 of the opaque value is stored.
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at > now
    }
}

/// Rows removed by one expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub refresh_tokens: u64,
    pub two_factor_codes: u64,
    pub password_reset_tokens: u64,
}

/// Number of digits in a two-factor code.
pub const TWO_FACTOR_CODE_LEN: usize = 6;

/// Failed guesses after which a two-factor code stops being accepted.
pub const MAX_TWO_FACTOR_ATTEMPTS: i32 = 5;

/// Random bytes behind refresh and password reset tokens.
pub const OPAQUE_TOKEN_BYTES: usize = 32;

/// Upper bound on password length in bytes.
pub const MAX_PASSWORD_BYTES: usize = 128;

/// Minimum HMAC secret length in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;
