use std::time::Duration;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use campus_auth::config::AuthConfig;
use campus_auth::infra::email::AppEmailSender;
use campus_auth::infra::sweeper::spawn_expiry_sweep;
use campus_auth::router::build_router;
use campus_auth::state::{AppState, SessionSettings};
use campus_auth::usecase::session::PasswordResetSettings;
use campus_auth::usecase::token::TokenSigner;
use campus_core::clock::SystemClock;
use campus_core::config::Config;
use campus_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AuthConfig::from_env().context("load auth config")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    let clock = SystemClock;
    let tokens = TokenSigner::new(
        &config.jwt_secret,
        &config.jwt_issuer,
        &config.jwt_audience,
        config.access_token_ttl_secs,
        clock,
    )?;

    let state = AppState {
        db,
        tokens,
        email: AppEmailSender::from_config(
            config.email_api_url.clone(),
            config.email_from.clone(),
            Duration::from_secs(config.email_timeout_secs),
        )?,
        settings: SessionSettings {
            refresh_token_ttl_secs: config.refresh_token_ttl_secs,
            two_factor_code_ttl_secs: config.two_factor_code_ttl_secs,
            min_password_length: config.min_password_length,
            password_reset: PasswordResetSettings {
                ttl_secs: config.password_reset_ttl_secs,
                reset_url: config.password_reset_url.clone(),
            },
        },
        cookie_domain: config.cookie_domain.clone(),
        clock,
    };

    let _sweeper = spawn_expiry_sweep(
        state.expiry_sweep(),
        Duration::from_secs(config.sweep_interval_secs),
    );

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
