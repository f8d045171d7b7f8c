use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use campus_auth_schema::{password_reset_tokens, refresh_tokens, two_factor_codes, users};
use campus_domain::user::UserRole;

use crate::domain::repository::{
    PasswordResetRepository, RefreshTokenRepository, TwoFactorCodeRepository, UserRepository,
};
use crate::domain::types::{
    AuthUser, MAX_TWO_FACTOR_ATTEMPTS, PasswordResetToken, RefreshTokenRecord, RotateOutcome,
    TwoFactorCode,
};
use crate::error::AuthServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }
}

fn user_from_model(model: users::Model) -> Result<AuthUser, AuthServiceError> {
    let role = u8::try_from(model.role)
        .ok()
        .and_then(UserRole::from_u8)
        .ok_or_else(|| {
            AuthServiceError::CorruptCredential(format!("unknown role {}", model.role))
        })?;
    Ok(AuthUser {
        id: model.id,
        email: model.email,
        role,
        password_hash: model.password_hash,
        two_factor_enabled: model.two_factor_enabled,
    })
}

// ── Refresh token repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRefreshTokenRepository {
    pub db: DatabaseConnection,
}

impl RefreshTokenRepository for DbRefreshTokenRepository {
    async fn create(&self, token: &RefreshTokenRecord) -> Result<(), AuthServiceError> {
        refresh_tokens::ActiveModel {
            id: Set(token.id),
            user_id: Set(token.user_id),
            token_hash: Set(token.token_hash.clone()),
            expires_at: Set(token.expires_at),
            rotated_at: Set(token.rotated_at),
            created_at: Set(token.created_at),
        }
        .insert(&self.db)
        .await
        .context("create refresh token")?;
        Ok(())
    }

    async fn rotate(
        &self,
        old_hash: &str,
        new_hash: &str,
        new_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<RotateOutcome, AuthServiceError> {
        let outcome = self
            .db
            .transaction::<_, RotateOutcome, sea_orm::DbErr>(|txn| {
                let old_hash = old_hash.to_owned();
                let new_hash = new_hash.to_owned();
                Box::pin(async move {
                    let Some(current) = refresh_tokens::Entity::find()
                        .filter(refresh_tokens::Column::TokenHash.eq(old_hash))
                        .one(txn)
                        .await?
                    else {
                        return Ok(RotateOutcome::NotFound);
                    };
                    if current.rotated_at.is_some() {
                        return Ok(RotateOutcome::Reused {
                            user_id: current.user_id,
                        });
                    }
                    if current.expires_at <= now {
                        return Ok(RotateOutcome::Expired);
                    }

                    // Of two concurrent rotations only one sees `rotated_at IS NULL`.
                    let invalidated = refresh_tokens::Entity::update_many()
                        .col_expr(refresh_tokens::Column::RotatedAt, Expr::value(now))
                        .filter(refresh_tokens::Column::Id.eq(current.id))
                        .filter(refresh_tokens::Column::RotatedAt.is_null())
                        .exec(txn)
                        .await?;
                    if invalidated.rows_affected == 0 {
                        return Ok(RotateOutcome::Reused {
                            user_id: current.user_id,
                        });
                    }

                    insert_refresh_token(
                        txn,
                        &RefreshTokenRecord {
                            id: Uuid::new_v4(),
                            user_id: current.user_id,
                            token_hash: new_hash,
                            expires_at: new_expires_at,
                            rotated_at: None,
                            created_at: now,
                        },
                    )
                    .await?;
                    Ok(RotateOutcome::Rotated {
                        user_id: current.user_id,
                    })
                })
            })
            .await
            .context("rotate refresh token")?;
        Ok(outcome)
    }

    async fn delete_by_hash(&self, token_hash: &str) -> Result<u64, AuthServiceError> {
        let result = refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::TokenHash.eq(token_hash))
            .exec(&self.db)
            .await
            .context("delete refresh token")?;
        Ok(result.rows_affected)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<u64, AuthServiceError> {
        let result = refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete refresh tokens by user")?;
        Ok(result.rows_affected)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let result = refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .context("delete expired refresh tokens")?;
        Ok(result.rows_affected)
    }
}

async fn insert_refresh_token(
    txn: &DatabaseTransaction,
    token: &RefreshTokenRecord,
) -> Result<(), sea_orm::DbErr> {
    refresh_tokens::ActiveModel {
        id: Set(token.id),
        user_id: Set(token.user_id),
        token_hash: Set(token.token_hash.clone()),
        expires_at: Set(token.expires_at),
        rotated_at: Set(token.rotated_at),
        created_at: Set(token.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

// ── Two-factor code repository ───────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTwoFactorCodeRepository {
    pub db: DatabaseConnection,
}

impl TwoFactorCodeRepository for DbTwoFactorCodeRepository {
    async fn create(&self, code: &TwoFactorCode) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let code = code.clone();
                Box::pin(async move {
                    two_factor_codes::Entity::update_many()
                        .col_expr(two_factor_codes::Column::IsUsed, Expr::value(true))
                        .col_expr(two_factor_codes::Column::UsedAt, Expr::value(code.created_at))
                        .filter(two_factor_codes::Column::UserId.eq(code.user_id))
                        .filter(two_factor_codes::Column::IsUsed.eq(false))
                        .exec(txn)
                        .await?;
                    two_factor_codes::ActiveModel {
                        id: Set(code.id),
                        user_id: Set(code.user_id),
                        code_hash: Set(code.code_hash.clone()),
                        expires_at: Set(code.expires_at),
                        is_used: Set(code.is_used),
                        used_at: Set(code.used_at),
                        failed_attempts: Set(code.failed_attempts),
                        created_at: Set(code.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("create two-factor code")?;
        Ok(())
    }

    async fn find_latest_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<TwoFactorCode>, AuthServiceError> {
        let model = two_factor_codes::Entity::find()
            .filter(two_factor_codes::Column::UserId.eq(user_id))
            .filter(two_factor_codes::Column::IsUsed.eq(false))
            .filter(two_factor_codes::Column::ExpiresAt.gt(now))
            .filter(two_factor_codes::Column::FailedAttempts.lt(MAX_TWO_FACTOR_ATTEMPTS))
            .order_by_desc(two_factor_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest active two-factor code")?;
        Ok(model.map(two_factor_code_from_model))
    }

    async fn mark_used(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, AuthServiceError> {
        let result = two_factor_codes::Entity::update_many()
            .col_expr(two_factor_codes::Column::IsUsed, Expr::value(true))
            .col_expr(two_factor_codes::Column::UsedAt, Expr::value(now))
            .filter(two_factor_codes::Column::Id.eq(id))
            .filter(two_factor_codes::Column::IsUsed.eq(false))
            .exec(&self.db)
            .await
            .context("mark two-factor code used")?;
        Ok(result.rows_affected == 1)
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<(), AuthServiceError> {
        two_factor_codes::Entity::update_many()
            .col_expr(
                two_factor_codes::Column::FailedAttempts,
                Expr::col(two_factor_codes::Column::FailedAttempts).add(1),
            )
            .filter(two_factor_codes::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("record failed two-factor attempt")?;
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let result = two_factor_codes::Entity::delete_many()
            .filter(two_factor_codes::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .context("delete expired two-factor codes")?;
        Ok(result.rows_affected)
    }
}

fn two_factor_code_from_model(model: two_factor_codes::Model) -> TwoFactorCode {
    TwoFactorCode {
        id: model.id,
        user_id: model.user_id,
        code_hash: model.code_hash,
        expires_at: model.expires_at,
        is_used: model.is_used,
        used_at: model.used_at,
        failed_attempts: model.failed_attempts,
        created_at: model.created_at,
    }
}

// ── Password reset repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPasswordResetRepository {
    pub db: DatabaseConnection,
}

impl PasswordResetRepository for DbPasswordResetRepository {
    async fn create(&self, token: &PasswordResetToken) -> Result<(), AuthServiceError> {
        password_reset_tokens::ActiveModel {
            id: Set(token.id),
            user_id: Set(token.user_id),
            token_hash: Set(token.token_hash.clone()),
            expires_at: Set(token.expires_at),
            is_used: Set(token.is_used),
            used_at: Set(token.used_at),
            created_at: Set(token.created_at),
        }
        .insert(&self.db)
        .await
        .context("create password reset token")?;
        Ok(())
    }

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordResetToken>, AuthServiceError> {
        let model = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::TokenHash.eq(token_hash))
            .filter(password_reset_tokens::Column::IsUsed.eq(false))
            .filter(password_reset_tokens::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find active password reset token")?;
        Ok(model.map(password_reset_from_model))
    }

    async fn redeem(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AuthServiceError> {
        let user_id = self
            .db
            .transaction::<_, Option<Uuid>, sea_orm::DbErr>(|txn| {
                let token_hash = token_hash.to_owned();
                let new_password_hash = new_password_hash.to_owned();
                Box::pin(async move {
                    let Some(token) = password_reset_tokens::Entity::find()
                        .filter(password_reset_tokens::Column::TokenHash.eq(token_hash))
                        .filter(password_reset_tokens::Column::IsUsed.eq(false))
                        .filter(password_reset_tokens::Column::ExpiresAt.gt(now))
                        .one(txn)
                        .await?
                    else {
                        return Ok(None);
                    };

                    let consumed = password_reset_tokens::Entity::update_many()
                        .col_expr(password_reset_tokens::Column::IsUsed, Expr::value(true))
                        .col_expr(password_reset_tokens::Column::UsedAt, Expr::value(now))
                        .filter(password_reset_tokens::Column::Id.eq(token.id))
                        .filter(password_reset_tokens::Column::IsUsed.eq(false))
                        .exec(txn)
                        .await?;
                    if consumed.rows_affected == 0 {
                        return Ok(None);
                    }

                    password_reset_tokens::Entity::update_many()
                        .col_expr(password_reset_tokens::Column::IsUsed, Expr::value(true))
                        .col_expr(password_reset_tokens::Column::UsedAt, Expr::value(now))
                        .filter(password_reset_tokens::Column::UserId.eq(token.user_id))
                        .filter(password_reset_tokens::Column::IsUsed.eq(false))
                        .exec(txn)
                        .await?;

                    users::Entity::update_many()
                        .col_expr(users::Column::PasswordHash, Expr::value(new_password_hash))
                        .filter(users::Column::Id.eq(token.user_id))
                        .exec(txn)
                        .await?;

                    refresh_tokens::Entity::delete_many()
                        .filter(refresh_tokens::Column::UserId.eq(token.user_id))
                        .exec(txn)
                        .await?;

                    Ok(Some(token.user_id))
                })
            })
            .await
            .context("redeem password reset token")?;
        Ok(user_id)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let result = password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .context("delete expired password reset tokens")?;
        Ok(result.rows_affected)
    }
}

fn password_reset_from_model(model: password_reset_tokens::Model) -> PasswordResetToken {
    PasswordResetToken {
        id: model.id,
        user_id: model.user_id,
        token_hash: model.token_hash,
        expires_at: model.expires_at,
        is_used: model.is_used,
        used_at: model.used_at,
        created_at: model.created_at,
    }
}
