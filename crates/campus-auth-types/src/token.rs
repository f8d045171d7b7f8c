//! JWT access-token claims and validation.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

use campus_domain::user::UserRole;

/// The only signature algorithm access tokens are ever issued or accepted with.
pub const ACCESS_TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Identity proven by a validated access token.
///
/// Handed explicitly to every operation that acts on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: UserRole,
    /// `jti` of the presented token.
    pub token_id: Uuid,
    /// Expiration timestamp (seconds since UNIX epoch).
    pub expires_at: u64,
}

/// Errors returned by [`TokenVerifier::verify`].
///
/// Callers reject the request identically for all three; the distinction
/// exists for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessTokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload shared by token creation (auth service) and validation.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `role` | custom | [`UserRole`] snake_case name |
/// | `jti` | `jti` | unique token ID (UUID string) |
/// | `iss` / `aud` | `iss` / `aud` | issuing service / intended audience |
/// | `iat` / `exp` | `iat` / `exp` | seconds since epoch |
///
/// [`Serialize`] requires the **`USE_ONLY_IN_AUTH_SERVICE`** cargo feature: the
/// auth service is the sole token issuer.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct AccessTokenClaims {
    pub sub: String,
    pub role: UserRole,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

/// Stateless access-token verifier. No storage lookups.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier pinned to HS256 and to the given issuer/audience.
    ///
    /// Expiry is checked against the caller-supplied `now` in [`verify`](Self::verify)
    /// rather than the system clock.
    pub fn new(secret: &[u8], issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::new(ACCESS_TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify signature, issuer, audience and expiry, returning the caller.
    pub fn verify(&self, token: &str, now_secs: u64) -> Result<Caller, AccessTokenError> {
        let claims = decode::<AccessTokenClaims>(token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience => AccessTokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => AccessTokenError::Expired,
                _ => AccessTokenError::Malformed,
            })?
            .claims;

        if now_secs > claims.exp {
            return Err(AccessTokenError::Expired);
        }

        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AccessTokenError::Malformed)?;
        let token_id = claims
            .jti
            .parse::<Uuid>()
            .map_err(|_| AccessTokenError::Malformed)?;

        Ok(Caller {
            user_id,
            role: claims.role,
            token_id,
            expires_at: claims.exp,
        })
    }
}
