//! Access-token issuance.

use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use campus_auth_types::token::{
    ACCESS_TOKEN_ALGORITHM, AccessTokenClaims, AccessTokenError, Caller, TokenVerifier,
};
use campus_core::clock::Clock;
use campus_domain::user::UserRole;

use crate::domain::types::MIN_JWT_SECRET_BYTES;
use crate::error::AuthServiceError;

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    /// Seconds since UNIX epoch.
    pub expires_at: u64,
}

/// Issues and validates HS256 access tokens. Holds the only copy of the
/// signing secret.
#[derive(Clone)]
pub struct TokenSigner<C> {
    encoding_key: EncodingKey,
    verifier: TokenVerifier,
    issuer: String,
    audience: String,
    ttl_secs: u64,
    clock: C,
}

impl<C: Clock> TokenSigner<C> {
    pub fn new(
        secret: &str,
        issuer: &str,
        audience: &str,
        ttl_secs: u64,
        clock: C,
    ) -> Result<Self, AuthServiceError> {
        if secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(AuthServiceError::Configuration(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_BYTES} bytes"
            )));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            verifier: TokenVerifier::new(secret.as_bytes(), issuer, audience),
            issuer: issuer.to_owned(),
            audience: audience.to_owned(),
            ttl_secs,
            clock,
        })
    }

    pub fn issue(&self, user_id: Uuid, role: UserRole) -> Result<AccessToken, AuthServiceError> {
        let iat = self.clock.now_secs();
        let exp = iat + self.ttl_secs;
        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            role,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp,
        };
        let token = encode(
            &Header::new(ACCESS_TOKEN_ALGORITHM),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok(AccessToken {
            token,
            expires_at: exp,
        })
    }

    pub fn validate(&self, token: &str) -> Result<Caller, AccessTokenError> {
        self.verifier.verify(token, self.clock.now_secs())
    }
}
