use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use campus_core::health::healthz;
use campus_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    health::readyz,
    login::{login, verify_two_factor},
    password::{forgot_password, reset_password},
    token::{check_token, refresh_token, revoke_all_sessions, revoke_token},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Login
        .route("/auth/login", post(login))
        .route("/auth/two-factor", post(verify_two_factor))
        // Token
        .route(
            "/auth/token",
            get(check_token).patch(refresh_token).delete(revoke_token),
        )
        .route("/auth/sessions", delete(revoke_all_sessions))
        // Password reset
        .route("/auth/password/forgot", post(forgot_password))
        .route("/auth/password/reset", post(reset_password))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
