use chrono::Duration;
use uuid::Uuid;

use campus_auth::domain::types::{
    PasswordResetToken, RefreshTokenRecord, SweepReport, TwoFactorCode,
};
use campus_auth::usecase::sweep::ExpirySweep;
use campus_core::clock::Clock;
use campus_testing::clock::ManualClock;

use crate::helpers::MemoryStore;

fn seed(store: &MemoryStore, clock: &ManualClock) {
    let now = clock.now();
    let user_id = Uuid::new_v4();
    let mut tables = store.tables.lock().unwrap();
    for (hash, expires_at) in [("expired", now - Duration::seconds(1)), ("live", now + Duration::hours(1))] {
        tables.refresh_tokens.push(RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id,
            token_hash: hash.to_owned(),
            expires_at,
            rotated_at: None,
            created_at: now - Duration::days(7),
        });
        tables.two_factor_codes.push(TwoFactorCode {
            id: Uuid::new_v4(),
            user_id,
            code_hash: "123456".to_owned(),
            expires_at,
            is_used: false,
            used_at: None,
            failed_attempts: 0,
            created_at: now - Duration::minutes(10),
        });
        tables.password_reset_tokens.push(PasswordResetToken {
            id: Uuid::new_v4(),
            user_id,
            token_hash: hash.to_owned(),
            expires_at,
            is_used: false,
            used_at: None,
            created_at: now - Duration::hours(1),
        });
    }
}

fn sweep(store: &MemoryStore, clock: &ManualClock) -> ExpirySweep<MemoryStore, MemoryStore, MemoryStore, ManualClock> {
    ExpirySweep {
        refresh_tokens: store.clone(),
        two_factor_codes: store.clone(),
        password_resets: store.clone(),
        clock: clock.clone(),
    }
}

#[tokio::test]
async fn should_delete_only_expired_rows() {
    let store = MemoryStore::default();
    let clock = ManualClock::fixed();
    seed(&store, &clock);

    let report = sweep(&store, &clock).run_once().await.unwrap();

    assert_eq!(
        report,
        SweepReport {
            refresh_tokens: 1,
            two_factor_codes: 1,
            password_reset_tokens: 1,
        }
    );
    assert!(store.refresh_tokens().iter().all(|t| t.token_hash == "live"));
    assert_eq!(store.two_factor_codes().len(), 1);
    assert!(store.password_reset_tokens().iter().all(|t| t.token_hash == "live"));
}

#[tokio::test]
async fn should_be_idempotent() {
    let store = MemoryStore::default();
    let clock = ManualClock::fixed();
    seed(&store, &clock);
    let sweep = sweep(&store, &clock);

    sweep.run_once().await.unwrap();
    let second = sweep.run_once().await.unwrap();

    assert_eq!(second, SweepReport::default());
    assert_eq!(store.refresh_tokens().len(), 1);
}

#[tokio::test]
async fn should_pick_up_rows_that_expire_later() {
    let store = MemoryStore::default();
    let clock = ManualClock::fixed();
    seed(&store, &clock);
    let sweep = sweep(&store, &clock);
    sweep.run_once().await.unwrap();

    clock.advance(Duration::hours(1));
    let report = sweep.run_once().await.unwrap();

    assert_eq!(report.refresh_tokens, 1);
    assert!(store.refresh_tokens().is_empty());
    assert!(store.two_factor_codes().is_empty());
    assert!(store.password_reset_tokens().is_empty());
}
