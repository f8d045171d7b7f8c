use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use uuid::Uuid;

use campus_auth_types::{
    cookie::{CAMPUS_REFRESH_TOKEN, clear_refresh_token_cookie, set_refresh_token_cookie},
    identity::BearerToken,
};
use campus_core::clock::Clock;
use campus_domain::user::UserRole;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::session::SessionTokens;

#[derive(Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub role: UserRole,
    pub access_token: String,
    pub access_token_expires_at: u64,
}

/// Put the refresh token in its cookie and the access token in the body.
/// The cookie's Max-Age follows the stored token's deadline.
pub(crate) fn session_response(
    state: &AppState,
    jar: CookieJar,
    tokens: SessionTokens,
) -> (StatusCode, CookieJar, Json<SessionResponse>) {
    let max_age = (tokens.refresh_token_expires_at - state.clock.now()).num_seconds();
    let jar = set_refresh_token_cookie(
        jar,
        tokens.refresh_token,
        state.cookie_domain.clone(),
        max_age,
    );
    let body = SessionResponse {
        user_id: tokens.user_id,
        role: tokens.role,
        access_token: tokens.access_token,
        access_token_expires_at: tokens.access_token_expires_at,
    };
    (StatusCode::OK, jar, Json(body))
}

// ── GET /auth/token ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CheckTokenResponse {
    pub user_id: Uuid,
    pub role: UserRole,
    pub access_token_expires_at: u64,
}

pub async fn check_token(
    State(state): State<AppState>,
    bearer: Result<BearerToken, StatusCode>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let BearerToken(token) = bearer.map_err(|_| AuthServiceError::InvalidToken)?;
    let caller = state.orchestrator().authenticate(&token)?;
    Ok(Json(CheckTokenResponse {
        user_id: caller.user_id,
        role: caller.role,
        access_token_expires_at: caller.expires_at,
    }))
}

// ── PATCH /auth/token ─────────────────────────────────────────────────────────

pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    let refresh_value = jar
        .get(CAMPUS_REFRESH_TOKEN)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(AuthServiceError::SessionExpired)?;

    let tokens = state.orchestrator().refresh(&refresh_value).await?;
    Ok(session_response(&state, jar, tokens))
}

// ── DELETE /auth/token ────────────────────────────────────────────────────────

pub async fn revoke_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    if let Some(cookie) = jar.get(CAMPUS_REFRESH_TOKEN) {
        state.orchestrator().logout(cookie.value()).await?;
    }
    let jar = clear_refresh_token_cookie(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}

// ── DELETE /auth/sessions ─────────────────────────────────────────────────────

pub async fn revoke_all_sessions(
    State(state): State<AppState>,
    bearer: Result<BearerToken, StatusCode>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    let BearerToken(token) = bearer.map_err(|_| AuthServiceError::InvalidToken)?;
    let orchestrator = state.orchestrator();
    let caller = orchestrator.authenticate(&token)?;
    orchestrator.logout_everywhere(&caller).await?;
    let jar = clear_refresh_token_cookie(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}
