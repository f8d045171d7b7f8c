use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use sea_orm::DatabaseConnection;
use tower::ServiceExt as _;
use uuid::Uuid;

use campus_auth::infra::email::AppEmailSender;
use campus_auth::router::build_router;
use campus_auth::state::{AppState, SessionSettings};
use campus_auth::usecase::session::PasswordResetSettings;
use campus_auth::usecase::token::TokenSigner;
use campus_core::clock::SystemClock;
use campus_domain::user::UserRole;

use crate::helpers::{
    ACCESS_TTL_SECS, REFRESH_TTL_SECS, RESET_TTL_SECS, RESET_URL, TEST_AUDIENCE, TEST_ISSUER,
    TEST_JWT_SECRET, TWO_FACTOR_TTL_SECS,
};

/// State backed by a disconnected database: only routes that never reach
/// storage can succeed.
fn offline_state() -> AppState {
    AppState {
        db: DatabaseConnection::Disconnected,
        tokens: TokenSigner::new(
            TEST_JWT_SECRET,
            TEST_ISSUER,
            TEST_AUDIENCE,
            ACCESS_TTL_SECS,
            SystemClock,
        )
        .unwrap(),
        email: AppEmailSender::from_config(
            None,
            "noreply@campus.test".to_owned(),
            Duration::from_secs(10),
        )
        .unwrap(),
        settings: SessionSettings {
            refresh_token_ttl_secs: REFRESH_TTL_SECS,
            two_factor_code_ttl_secs: TWO_FACTOR_TTL_SECS,
            min_password_length: 12,
            password_reset: PasswordResetSettings {
                ttl_secs: RESET_TTL_SECS,
                reset_url: RESET_URL.to_owned(),
            },
        },
        cookie_domain: "campus.test".to_owned(),
        clock: SystemClock,
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_is_ok_and_echoes_request_id() {
    let response = build_router(offline_state())
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn readyz_reports_unavailable_without_database() {
    let response = build_router(offline_state())
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn check_token_without_bearer_is_unauthenticated() {
    let response = build_router(offline_state())
        .oneshot(Request::get("/auth/token").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "UNAUTHENTICATED");
    assert_eq!(body["message"], "authentication failed");
}

#[tokio::test]
async fn check_token_with_tampered_bearer_matches_missing_bearer() {
    let state = offline_state();
    let issued = state.tokens.issue(Uuid::new_v4(), UserRole::Student).unwrap();
    let tampered = format!("{}x", issued.token);

    let response = build_router(state)
        .oneshot(
            Request::get("/auth/token")
                .header(header::AUTHORIZATION, format!("Bearer {tampered}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn check_token_returns_caller_for_valid_bearer() {
    let state = offline_state();
    let user_id = Uuid::new_v4();
    let issued = state.tokens.issue(user_id, UserRole::Admin).unwrap();

    let response = build_router(state)
        .oneshot(
            Request::get("/auth/token")
                .header(header::AUTHORIZATION, format!("Bearer {}", issued.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user_id"], user_id.to_string());
    assert_eq!(body["role"], "admin");
    assert_eq!(body["access_token_expires_at"], issued.expires_at);
}

#[tokio::test]
async fn refresh_without_cookie_is_unauthenticated() {
    let response = build_router(offline_state())
        .oneshot(
            Request::patch("/auth/token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn logout_without_cookie_still_clears_it() {
    let response = build_router(offline_state())
        .oneshot(
            Request::delete("/auth/token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("campus_refresh_token="), "got {set_cookie}");
    assert!(set_cookie.contains("Max-Age=0"), "got {set_cookie}");
    assert!(set_cookie.contains("HttpOnly"), "got {set_cookie}");
}

#[tokio::test]
async fn revoke_all_sessions_requires_bearer() {
    let response = build_router(offline_state())
        .oneshot(
            Request::delete("/auth/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
