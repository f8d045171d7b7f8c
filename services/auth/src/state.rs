use sea_orm::DatabaseConnection;

use campus_core::clock::SystemClock;

use crate::infra::db::{
    DbPasswordResetRepository, DbRefreshTokenRepository, DbTwoFactorCodeRepository,
    DbUserRepository,
};
use crate::infra::email::AppEmailSender;
use crate::infra::sweeper::DbExpirySweep;
use crate::usecase::password::PasswordHasher;
use crate::usecase::refresh::RefreshTokenStore;
use crate::usecase::session::{AuthSessionOrchestrator, PasswordResetSettings};
use crate::usecase::token::TokenSigner;
use crate::usecase::two_factor::TwoFactorChallenge;

pub type DbAuthSessionOrchestrator = AuthSessionOrchestrator<
    DbUserRepository,
    DbRefreshTokenRepository,
    DbTwoFactorCodeRepository,
    DbPasswordResetRepository,
    AppEmailSender,
    SystemClock,
>;

/// Lifetimes and policy knobs for the session flows.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub refresh_token_ttl_secs: i64,
    pub two_factor_code_ttl_secs: i64,
    pub min_password_length: usize,
    pub password_reset: PasswordResetSettings,
}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenSigner<SystemClock>,
    pub email: AppEmailSender,
    pub settings: SessionSettings,
    pub cookie_domain: String,
    pub clock: SystemClock,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn refresh_token_repo(&self) -> DbRefreshTokenRepository {
        DbRefreshTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn two_factor_code_repo(&self) -> DbTwoFactorCodeRepository {
        DbTwoFactorCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn password_reset_repo(&self) -> DbPasswordResetRepository {
        DbPasswordResetRepository {
            db: self.db.clone(),
        }
    }

    pub fn orchestrator(&self) -> DbAuthSessionOrchestrator {
        AuthSessionOrchestrator {
            users: self.user_repo(),
            passwords: PasswordHasher::new(self.settings.min_password_length),
            tokens: self.tokens.clone(),
            refresh_tokens: RefreshTokenStore {
                repo: self.refresh_token_repo(),
                clock: self.clock,
                ttl_secs: self.settings.refresh_token_ttl_secs,
            },
            two_factor: TwoFactorChallenge {
                codes: self.two_factor_code_repo(),
                clock: self.clock,
                ttl_secs: self.settings.two_factor_code_ttl_secs,
            },
            password_resets: self.password_reset_repo(),
            email: self.email.clone(),
            clock: self.clock,
            reset: self.settings.password_reset.clone(),
        }
    }

    pub fn expiry_sweep(&self) -> DbExpirySweep {
        DbExpirySweep {
            refresh_tokens: self.refresh_token_repo(),
            two_factor_codes: self.two_factor_code_repo(),
            password_resets: self.password_reset_repo(),
            clock: self.clock,
        }
    }
}
