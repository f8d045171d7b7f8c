//! Login, second factor, refresh, logout and password reset flows.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use campus_auth_types::token::{AccessTokenError, Caller};
use campus_core::clock::Clock;
use campus_core::email::{EmailMessage, EmailSender};
use campus_domain::user::UserRole;

use crate::domain::repository::{
    PasswordResetRepository, RefreshTokenRepository, TwoFactorCodeRepository, UserRepository,
};
use crate::domain::types::{AuthUser, PasswordResetToken};
use crate::error::AuthServiceError;
use crate::usecase::opaque::{generate_token, hash_token};
use crate::usecase::password::PasswordHasher;
use crate::usecase::refresh::RefreshTokenStore;
use crate::usecase::token::TokenSigner;
use crate::usecase::two_factor::TwoFactorChallenge;

/// Access + refresh token pair for an authenticated session.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub user_id: Uuid,
    pub role: UserRole,
    pub access_token: String,
    /// Seconds since UNIX epoch.
    pub access_token_expires_at: u64,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Authenticated(SessionTokens),
    /// Password accepted; a code was sent and must be redeemed via
    /// [`AuthSessionOrchestrator::verify_two_factor`].
    PendingTwoFactor { user_id: Uuid },
}

/// Settings for the password reset flow.
#[derive(Debug, Clone)]
pub struct PasswordResetSettings {
    pub ttl_secs: i64,
    /// Link base; the token is appended as `?token=`.
    pub reset_url: String,
}

pub struct AuthSessionOrchestrator<U, R, T, P, E, C>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    T: TwoFactorCodeRepository,
    P: PasswordResetRepository,
    E: EmailSender + Clone + 'static,
    C: Clock,
{
    pub users: U,
    pub passwords: PasswordHasher,
    pub tokens: TokenSigner<C>,
    pub refresh_tokens: RefreshTokenStore<R, C>,
    pub two_factor: TwoFactorChallenge<T, C>,
    pub password_resets: P,
    pub email: E,
    pub clock: C,
    pub reset: PasswordResetSettings,
}

impl<U, R, T, P, E, C> AuthSessionOrchestrator<U, R, T, P, E, C>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    T: TwoFactorCodeRepository,
    P: PasswordResetRepository,
    E: EmailSender + Clone + 'static,
    C: Clock,
{
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthServiceError> {
        let Some(user) = self.users.find_by_email(&normalize_email(email)).await? else {
            self.passwords.verify_dummy(password);
            info!("login rejected");
            return Err(AuthServiceError::InvalidCredentials);
        };

        if !self.passwords.verify(&user.password_hash, password)? {
            info!(user_id = %user.id, "login rejected");
            return Err(AuthServiceError::InvalidCredentials);
        }

        if user.two_factor_enabled {
            let code = self.two_factor.issue(user.id).await?;
            self.deliver(EmailMessage {
                to: user.email.clone(),
                subject: "Your campus sign-in code".to_owned(),
                body: format!(
                    "Your sign-in code is {code}. It expires in {} minutes.",
                    self.two_factor.ttl_secs / 60
                ),
            });
            info!(user_id = %user.id, "login pending two-factor");
            return Ok(LoginOutcome::PendingTwoFactor { user_id: user.id });
        }

        let tokens = self.start_session(&user).await?;
        info!(user_id = %user.id, "login succeeded");
        Ok(LoginOutcome::Authenticated(tokens))
    }

    pub async fn verify_two_factor(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<SessionTokens, AuthServiceError> {
        if !self.two_factor.verify(user_id, code).await? {
            return Err(AuthServiceError::InvalidTwoFactorCode);
        }
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::InvalidTwoFactorCode)?;

        let tokens = self.start_session(&user).await?;
        info!(user_id = %user.id, "two-factor login succeeded");
        Ok(tokens)
    }

    /// Rotate the refresh token and mint an access token with the role as
    /// currently stored.
    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AuthServiceError> {
        let rotated = self.refresh_tokens.rotate(refresh_token).await?;
        let Some(user) = self.users.find_by_id(rotated.user_id).await? else {
            // Account removed mid-rotation: drop the successor so it does not linger.
            self.refresh_tokens.revoke(&rotated.token.value).await?;
            warn!(user_id = %rotated.user_id, "refresh for missing user");
            return Err(AuthServiceError::SessionExpired);
        };

        let access = self.tokens.issue(user.id, user.role)?;
        debug!(user_id = %user.id, "session refreshed");
        Ok(SessionTokens {
            user_id: user.id,
            role: user.role,
            access_token: access.token,
            access_token_expires_at: access.expires_at,
            refresh_token: rotated.token.value,
            refresh_token_expires_at: rotated.token.expires_at,
        })
    }

    /// Idempotent.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthServiceError> {
        self.refresh_tokens.revoke(refresh_token).await
    }

    /// Revoke every refresh token of the caller. Outstanding access tokens
    /// stay valid until they expire.
    pub async fn logout_everywhere(&self, caller: &Caller) -> Result<(), AuthServiceError> {
        self.refresh_tokens.revoke_all(caller.user_id).await?;
        Ok(())
    }

    pub fn authenticate(&self, access_token: &str) -> Result<Caller, AuthServiceError> {
        self.tokens.validate(access_token).map_err(|e| {
            match e {
                AccessTokenError::InvalidSignature => warn!("access token signature rejected"),
                AccessTokenError::Expired => debug!("access token expired"),
                AccessTokenError::Malformed => info!("malformed access token"),
            }
            AuthServiceError::InvalidToken
        })
    }

    /// Always succeeds. Whether the address is registered is never revealed.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthServiceError> {
        if let Err(e) = self.start_password_reset(email).await {
            error!(error = %e, "password reset request failed");
        }
        Ok(())
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthServiceError> {
        self.passwords.check_policy(new_password)?;

        let now = self.clock.now();
        let token_hash = hash_token(token);
        if self
            .password_resets
            .find_active(&token_hash, now)
            .await?
            .is_none()
        {
            return Err(AuthServiceError::InvalidOrExpiredToken);
        }

        let new_hash = self.passwords.hash(new_password)?;
        let user_id = self
            .password_resets
            .redeem(&token_hash, &new_hash, now)
            .await?
            .ok_or(AuthServiceError::InvalidOrExpiredToken)?;

        info!(user_id = %user_id, "password reset; all sessions revoked");
        Ok(())
    }

    async fn start_session(&self, user: &AuthUser) -> Result<SessionTokens, AuthServiceError> {
        let access = self.tokens.issue(user.id, user.role)?;
        let refresh = self.refresh_tokens.issue(user.id).await?;
        Ok(SessionTokens {
            user_id: user.id,
            role: user.role,
            access_token: access.token,
            access_token_expires_at: access.expires_at,
            refresh_token: refresh.value,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    async fn start_password_reset(&self, email: &str) -> Result<(), AuthServiceError> {
        let Some(user) = self.users.find_by_email(&normalize_email(email)).await? else {
            info!("password reset requested for unknown email");
            return Ok(());
        };

        let now = self.clock.now();
        let value = generate_token();
        self.password_resets
            .create(&PasswordResetToken {
                id: Uuid::new_v4(),
                user_id: user.id,
                token_hash: hash_token(&value),
                expires_at: now + Duration::seconds(self.reset.ttl_secs),
                is_used: false,
                used_at: None,
                created_at: now,
            })
            .await?;

        self.deliver(EmailMessage {
            to: user.email,
            subject: "Reset your campus password".to_owned(),
            body: format!(
                "Use this link to choose a new password: {}?token={value}\n\
                 The link expires in {} minutes. If you did not ask for a reset, ignore this email.",
                self.reset.reset_url,
                self.reset.ttl_secs / 60
            ),
        });
        info!(user_id = %user.id, "password reset token issued");
        Ok(())
    }

    /// Send on a background task; the caller never waits on the email API.
    fn deliver(&self, message: EmailMessage) {
        let email = self.email.clone();
        tokio::spawn(async move {
            if let Err(e) = email.send(&message).await {
                error!(error = %e, subject = %message.subject, "email delivery failed");
            }
        });
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
