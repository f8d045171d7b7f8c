use std::sync::Arc;

use chrono::Duration;

use campus_auth::error::AuthServiceError;
use campus_auth::usecase::session::{LoginOutcome, SessionTokens};
use campus_core::clock::Clock;
use campus_domain::user::UserRole;
use campus_testing::clock::ManualClock;
use campus_testing::email::RecordingEmailSender;

use crate::helpers::{MemoryStore, REFRESH_TTL_SECS, TEST_PASSWORD, TestOrchestrator, orchestrator, test_user};

async fn logged_in(
    two_factor: bool,
) -> (
    MemoryStore,
    ManualClock,
    TestOrchestrator<RecordingEmailSender>,
    SessionTokens,
) {
    let user = test_user(two_factor);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let auth = orchestrator(&store, RecordingEmailSender::new(), &clock);
    let LoginOutcome::Authenticated(tokens) = auth.login(&user.email, TEST_PASSWORD).await.unwrap()
    else {
        panic!("expected Authenticated");
    };
    (store, clock, auth, tokens)
}

#[tokio::test]
async fn should_rotate_refresh_token() {
    let (store, _clock, auth, first) = logged_in(false).await;

    let second = auth.refresh(&first.refresh_token).await.unwrap();

    assert_ne!(second.refresh_token, first.refresh_token);
    assert_eq!(second.user_id, first.user_id);
    assert!(auth.authenticate(&second.access_token).is_ok());

    let rows = store.refresh_tokens();
    assert_eq!(rows.len(), 2, "rotated row is kept for reuse detection");
    assert_eq!(rows.iter().filter(|r| r.rotated_at.is_none()).count(), 1);
}

#[tokio::test]
async fn should_reject_rotated_token_reuse() {
    let (_store, _clock, auth, first) = logged_in(false).await;

    let second = auth.refresh(&first.refresh_token).await.unwrap();
    let replay = auth.refresh(&first.refresh_token).await;

    assert!(
        matches!(replay, Err(AuthServiceError::SessionExpired)),
        "expected SessionExpired, got {replay:?}"
    );
    // The legitimate successor keeps working.
    assert!(auth.refresh(&second.refresh_token).await.is_ok());
}

#[tokio::test]
async fn should_reject_expired_refresh_token() {
    let (_store, clock, auth, first) = logged_in(false).await;

    clock.advance(Duration::seconds(REFRESH_TTL_SECS));
    let result = auth.refresh(&first.refresh_token).await;

    assert!(
        matches!(result, Err(AuthServiceError::SessionExpired)),
        "expected SessionExpired, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unknown_refresh_token() {
    let (_store, _clock, auth, _first) = logged_in(false).await;

    let result = auth.refresh("not-a-real-token").await;
    assert!(matches!(result, Err(AuthServiceError::SessionExpired)));
}

#[tokio::test]
async fn should_carry_current_role_into_refreshed_access_token() {
    let (store, _clock, auth, first) = logged_in(false).await;
    store.set_role(first.user_id, UserRole::Association);

    let second = auth.refresh(&first.refresh_token).await.unwrap();

    assert_eq!(second.role, UserRole::Association);
    let caller = auth.authenticate(&second.access_token).unwrap();
    assert_eq!(caller.role, UserRole::Association);
    assert_eq!(store.user(first.user_id).role, UserRole::Association);
}

#[tokio::test]
async fn should_set_fresh_absolute_deadline_on_rotation() {
    let (_store, clock, auth, first) = logged_in(false).await;
    assert_eq!(
        first.refresh_token_expires_at,
        clock.now() + Duration::seconds(REFRESH_TTL_SECS)
    );

    clock.advance(Duration::hours(1));
    let second = auth.refresh(&first.refresh_token).await.unwrap();

    assert_eq!(
        second.refresh_token_expires_at,
        clock.now() + Duration::seconds(REFRESH_TTL_SECS)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_let_exactly_one_concurrent_refresh_win() {
    let (store, _clock, auth, first) = logged_in(false).await;
    let auth = Arc::new(auth);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let auth = Arc::clone(&auth);
            let token = first.refresh_token.clone();
            tokio::spawn(async move { auth.refresh(&token).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert!(
                matches!(e, AuthServiceError::SessionExpired),
                "expected SessionExpired, got {e:?}"
            ),
        }
    }

    assert_eq!(successes, 1, "exactly one rotation must succeed");
    let live = store
        .refresh_tokens()
        .into_iter()
        .filter(|r| r.rotated_at.is_none())
        .count();
    assert_eq!(live, 1);
}

#[tokio::test]
async fn should_not_leave_live_successor_when_user_is_gone() {
    let (store, _clock, auth, first) = logged_in(false).await;
    store.remove_user(first.user_id);

    let result = auth.refresh(&first.refresh_token).await;

    assert!(
        matches!(result, Err(AuthServiceError::SessionExpired)),
        "expected SessionExpired, got {result:?}"
    );
    let live = store
        .refresh_tokens()
        .into_iter()
        .filter(|r| r.rotated_at.is_none())
        .count();
    assert_eq!(live, 0, "no refresh token may outlive its user");
}
