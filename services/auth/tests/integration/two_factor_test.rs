use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use campus_auth::domain::types::MAX_TWO_FACTOR_ATTEMPTS;
use campus_auth::error::AuthServiceError;
use campus_auth::usecase::opaque::hash_token;
use campus_auth::usecase::session::LoginOutcome;
use campus_testing::clock::ManualClock;
use campus_testing::email::{FailingEmailSender, RecordingEmailSender, SlowEmailSender};

use crate::helpers::{MemoryStore, TEST_PASSWORD, TWO_FACTOR_TTL_SECS, code_from_body, orchestrator, test_user};

fn wrong_code(code: &str) -> String {
    let first = if code.starts_with('0') { '1' } else { '0' };
    format!("{first}{}", &code[1..])
}

#[tokio::test]
async fn should_complete_login_with_emailed_code() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let email = RecordingEmailSender::new();
    let auth = orchestrator(&store, email.clone(), &clock);

    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let code = code_from_body(&email.nth_delivered(0).await.body);

    let tokens = auth.verify_two_factor(user.id, &code).await.unwrap();

    assert_eq!(tokens.user_id, user.id);
    assert!(auth.authenticate(&tokens.access_token).is_ok());
    assert_eq!(store.refresh_tokens().len(), 1);
    assert!(store.two_factor_codes()[0].is_used);
}

#[tokio::test]
async fn should_accept_code_only_once() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let email = RecordingEmailSender::new();
    let auth = orchestrator(&store, email.clone(), &clock);

    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let code = code_from_body(&email.nth_delivered(0).await.body);

    auth.verify_two_factor(user.id, &code).await.unwrap();
    let again = auth.verify_two_factor(user.id, &code).await;

    assert!(
        matches!(again, Err(AuthServiceError::InvalidTwoFactorCode)),
        "expected InvalidTwoFactorCode, got {again:?}"
    );
    assert_eq!(store.refresh_tokens().len(), 1);
}

#[tokio::test]
async fn should_count_failed_attempts() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let email = RecordingEmailSender::new();
    let auth = orchestrator(&store, email.clone(), &clock);

    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let code = code_from_body(&email.nth_delivered(0).await.body);

    let result = auth.verify_two_factor(user.id, &wrong_code(&code)).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidTwoFactorCode)));
    assert_eq!(store.two_factor_codes()[0].failed_attempts, 1);

    // Still redeemable below the limit.
    assert!(auth.verify_two_factor(user.id, &code).await.is_ok());
}

#[tokio::test]
async fn should_lock_code_after_max_failed_attempts() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let email = RecordingEmailSender::new();
    let auth = orchestrator(&store, email.clone(), &clock);

    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let code = code_from_body(&email.nth_delivered(0).await.body);

    for _ in 0..MAX_TWO_FACTOR_ATTEMPTS {
        let _ = auth.verify_two_factor(user.id, &wrong_code(&code)).await;
    }
    let result = auth.verify_two_factor(user.id, &code).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidTwoFactorCode)),
        "expected InvalidTwoFactorCode, got {result:?}"
    );
    assert!(store.refresh_tokens().is_empty());
}

#[tokio::test]
async fn should_reject_expired_code() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let email = RecordingEmailSender::new();
    let auth = orchestrator(&store, email.clone(), &clock);

    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let code = code_from_body(&email.nth_delivered(0).await.body);

    clock.advance(Duration::seconds(TWO_FACTOR_TTL_SECS));
    let result = auth.verify_two_factor(user.id, &code).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidTwoFactorCode)),
        "expected InvalidTwoFactorCode, got {result:?}"
    );
}

#[tokio::test]
async fn should_retire_previous_code_on_new_login() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let email = RecordingEmailSender::new();
    let auth = orchestrator(&store, email.clone(), &clock);

    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let first_code = code_from_body(&email.nth_delivered(0).await.body);
    clock.advance(Duration::seconds(30));
    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let second_code = code_from_body(&email.nth_delivered(1).await.body);

    if first_code != second_code {
        let stale = auth.verify_two_factor(user.id, &first_code).await;
        assert!(matches!(stale, Err(AuthServiceError::InvalidTwoFactorCode)));
    }
    assert!(auth.verify_two_factor(user.id, &second_code).await.is_ok());

    // After the newest code is consumed nothing older becomes redeemable.
    let replay = auth.verify_two_factor(user.id, &first_code).await;
    assert!(matches!(replay, Err(AuthServiceError::InvalidTwoFactorCode)));
}

#[tokio::test]
async fn should_reject_code_for_other_user() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let email = RecordingEmailSender::new();
    let auth = orchestrator(&store, email.clone(), &clock);

    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let code = code_from_body(&email.nth_delivered(0).await.body);

    let result = auth.verify_two_factor(Uuid::new_v4(), &code).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidTwoFactorCode)));
}

#[tokio::test]
async fn should_stay_pending_when_code_delivery_fails() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let auth = orchestrator(&store, FailingEmailSender, &clock);

    let outcome = auth.login(&user.email, TEST_PASSWORD).await.unwrap();

    assert!(matches!(outcome, LoginOutcome::PendingTwoFactor { .. }));
    assert_eq!(store.two_factor_codes().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_let_exactly_one_concurrent_verification_win() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let email = RecordingEmailSender::new();
    let auth = Arc::new(orchestrator(&store, email.clone(), &clock));

    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let code = code_from_body(&email.nth_delivered(0).await.body);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let auth = Arc::clone(&auth);
            let code = code.clone();
            let user_id = user.id;
            tokio::spawn(async move { auth.verify_two_factor(user_id, &code).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert!(
                matches!(e, AuthServiceError::InvalidTwoFactorCode),
                "expected InvalidTwoFactorCode, got {e:?}"
            ),
        }
    }

    assert_eq!(successes, 1, "a code must be redeemed at most once");
    assert_eq!(store.refresh_tokens().len(), 1);
}

#[tokio::test]
async fn should_not_wait_for_email_api_before_answering_login() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let slow = SlowEmailSender {
        delay: std::time::Duration::from_secs(60),
    };
    let auth = orchestrator(&store, slow, &clock);

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(20),
        auth.login(&user.email, TEST_PASSWORD),
    )
    .await
    .expect("login must not block on email delivery")
    .unwrap();

    assert!(matches!(outcome, LoginOutcome::PendingTwoFactor { .. }));
}

#[tokio::test]
async fn should_store_only_hash_of_code() {
    let user = test_user(true);
    let store = MemoryStore::with_users(vec![user.clone()]);
    let clock = ManualClock::fixed();
    let email = RecordingEmailSender::new();
    let auth = orchestrator(&store, email.clone(), &clock);

    auth.login(&user.email, TEST_PASSWORD).await.unwrap();
    let code = code_from_body(&email.nth_delivered(0).await.body);

    let stored = &store.two_factor_codes()[0];
    assert_ne!(stored.code_hash, code);
    assert_eq!(stored.code_hash, hash_token(&code));
}
