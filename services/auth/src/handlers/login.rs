use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthServiceError;
use crate::handlers::token::session_response;
use crate::state::AppState;
use crate::usecase::session::LoginOutcome;

// ── POST /auth/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct PendingTwoFactorResponse {
    pub user_id: Uuid,
    pub two_factor_required: bool,
}

/// 200 with a session, or 202 when a second factor is still required.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AuthServiceError> {
    let outcome = state
        .orchestrator()
        .login(&body.email, &body.password)
        .await?;

    let response = match outcome {
        LoginOutcome::Authenticated(tokens) => session_response(&state, jar, tokens).into_response(),
        LoginOutcome::PendingTwoFactor { user_id } => (
            StatusCode::ACCEPTED,
            Json(PendingTwoFactorResponse {
                user_id,
                two_factor_required: true,
            }),
        )
            .into_response(),
    };
    Ok(response)
}

// ── POST /auth/two-factor ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyTwoFactorRequest {
    pub user_id: Uuid,
    pub code: String,
}

pub async fn verify_two_factor(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyTwoFactorRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let tokens = state
        .orchestrator()
        .verify_two_factor(body.user_id, &body.code)
        .await?;
    Ok(session_response(&state, jar, tokens))
}
