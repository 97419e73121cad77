//! Session custody semantics: TTL expiry, logout, step-two login, lockout,
//! and the background sweeper.

use std::time::Duration;

use docseal_access::Role;
use docseal_engine::{EngineConfig, EngineError, LoginOutcome};

mod common;
use common::{wrong_code, TestEnv, PASSWORD};

fn config_with(f: impl FnOnce(&mut EngineConfig)) -> EngineConfig {
    let mut config = EngineConfig::default();
    f(&mut config);
    config
}

#[tokio::test]
async fn test_expired_session_requires_reauth_and_is_evicted() {
    let env = TestEnv::with_config(config_with(|c| c.session_ttl_secs = 0));
    env.register_active("alice@example.org", Role::Author).await;

    let session = env.login("alice@example.org").await;

    // The handle expired the moment it was bound; any protected operation
    // hits the authentication boundary, never a silent no-op.
    let err = env
        .engine
        .download_paper(&session, "does-not-matter", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ReauthRequired));

    // Detecting expiry evicted the handle.
    assert_eq!(env.engine.custody.live_handles(), 0);
}

#[tokio::test]
async fn test_logout_releases_custody_idempotently() {
    let env = TestEnv::new();
    env.register_active("alice@example.org", Role::Author).await;

    let session = env.login("alice@example.org").await;
    assert_eq!(env.engine.custody.live_handles(), 1);

    env.engine.logout(&session).await;
    env.engine.logout(&session).await; // second logout is a no-op
    assert_eq!(env.engine.custody.live_handles(), 0);

    let err = env
        .engine
        .download_paper(&session, "anything", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ReauthRequired));
}

#[tokio::test]
async fn test_step_two_login_gates_the_session() {
    let env = TestEnv::with_config(config_with(|c| c.otp_on_login = true));
    env.register_active("alice@example.org", Role::Author).await;

    let LoginOutcome::OtpRequired {
        session_id,
        otp_code,
        ..
    } = env.engine.login("alice@example.org", PASSWORD).await.unwrap()
    else {
        panic!("expected a second-factor challenge");
    };

    // The pending session cannot be used for protected work.
    let err = env
        .engine
        .download_paper(&session_id, "anything", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Authentication));

    // One mismatch leaves the session pending.
    let err = env
        .engine
        .complete_login(&session_id, wrong_code(&otp_code))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Authentication));

    env.engine
        .complete_login(&session_id, &otp_code)
        .await
        .unwrap();

    // Authenticated now: the same call proceeds past the boundary and fails
    // only because the object does not exist.
    let err = env
        .engine
        .download_paper(&session_id, "anything", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound));

    // Completing twice is a state conflict, not a second login.
    let err = env
        .engine
        .complete_login(&session_id, &otp_code)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn test_step_two_lockout_erases_the_half_open_session() {
    let env = TestEnv::with_config(config_with(|c| c.otp_on_login = true));
    env.register_active("alice@example.org", Role::Author).await;

    let LoginOutcome::OtpRequired {
        session_id,
        otp_code,
        ..
    } = env.engine.login("alice@example.org", PASSWORD).await.unwrap()
    else {
        panic!("expected a second-factor challenge");
    };

    for _ in 0..3 {
        let err = env
            .engine
            .complete_login(&session_id, wrong_code(&otp_code))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Authentication));
    }

    // The challenge is locked; even the correct code is refused, and the
    // key handle is erased first.
    let err = env
        .engine
        .complete_login(&session_id, &otp_code)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Authentication));
    assert_eq!(env.engine.custody.live_handles(), 0);

    let err = env
        .engine
        .complete_login(&session_id, &otp_code)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ReauthRequired));
}

#[tokio::test]
async fn test_failed_logins_lock_the_account() {
    let env = TestEnv::with_config(config_with(|c| {
        c.max_failed_logins = 2;
        c.lockout_secs = 3600;
    }));
    env.register_active("alice@example.org", Role::Author).await;

    for _ in 0..2 {
        let err = env
            .engine
            .login("alice@example.org", "Wrong-Horse-43!")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Authentication));
    }

    // Locked out: the correct password is refused with the same label.
    let err = env
        .engine
        .login("alice@example.org", PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Authentication));
}

#[tokio::test]
async fn test_sweeper_evicts_expired_handles() {
    let env = TestEnv::with_config(config_with(|c| {
        c.session_ttl_secs = 0;
        c.sweep_interval_secs = 1;
    }));
    env.register_active("alice@example.org", Role::Author).await;

    env.login("alice@example.org").await;
    assert_eq!(env.engine.custody.live_handles(), 1);

    let sweeper = env.engine.spawn_sweeper();

    // The first interval tick fires immediately.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(env.engine.custody.live_handles(), 0);

    sweeper.abort();
}
