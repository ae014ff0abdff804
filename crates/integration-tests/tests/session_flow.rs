//! Session lifecycle against the in-process backend.
//!
//! Run with: cargo test -p cartwheel-integration-tests

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use cartwheel_client::models::{ProfileUpdate, Registration};
use cartwheel_client::storage::keys;
use cartwheel_client::{Error, RefreshPolicy};
use cartwheel_core::Role;
use cartwheel_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, CUSTOMER_EMAIL, CUSTOMER_PASSWORD, FakeBackend, Shop,
};
use secrecy::SecretString;

fn secret(raw: &str) -> SecretString {
    SecretString::from(raw.to_string())
}

async fn signed_in(backend: &FakeBackend, dir: &std::path::Path) -> Shop {
    let shop = Shop::open(&backend.config(dir)).await;
    shop.session
        .login(CUSTOMER_EMAIL, &secret(CUSTOMER_PASSWORD))
        .await
        .expect("Login should succeed");
    shop
}

// ============================================================================
// Login and Restore
// ============================================================================

#[tokio::test]
async fn test_login_survives_restart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let first = signed_in(&backend, dir.path()).await;
    let user = first.session.user().unwrap();
    assert_eq!(user.name, "Ada");
    assert_eq!(user.role, Role::Customer);

    let second = Shop::open(&backend.config(dir.path())).await;
    assert!(!second.session.is_loading());
    assert!(second.session.is_authenticated());
    assert_eq!(second.session.user().unwrap().email.as_str(), CUSTOMER_EMAIL);
    assert!(backend.was_called("GET /api/users/me"));
}

#[tokio::test]
async fn test_bad_password_leaves_no_session() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::open(&backend.config(dir.path())).await;

    let err = shop
        .session
        .login(CUSTOMER_EMAIL, &secret("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(ref m) if m == "Invalid email or password"));
    assert!(!shop.session.is_authenticated());
    assert!(shop.storage.read(keys::TOKEN).await.is_none());
}

#[tokio::test]
async fn test_empty_credentials_never_reach_backend() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::open(&backend.config(dir.path())).await;

    let err = shop.session.login("", &secret("pw")).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(!backend.was_called("POST /api/auth/login"));
}

#[tokio::test]
async fn test_fresh_install_is_signed_out() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let shop = Shop::open(&backend.config(dir.path())).await;

    assert!(!shop.session.is_loading());
    assert!(!shop.session.is_authenticated());
    assert!(!backend.was_called("GET /api/users/me"));
}

// ============================================================================
// Revalidation
// ============================================================================

#[tokio::test]
async fn test_revoked_token_signs_out_on_restart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    drop(signed_in(&backend, dir.path()).await);

    backend.revoke_tokens();
    let shop = Shop::open(&backend.config(dir.path())).await;

    assert!(!shop.session.is_authenticated());
    assert!(shop.storage.read(keys::USER).await.is_none());
    assert!(shop.storage.read(keys::TOKEN).await.is_none());
}

#[tokio::test]
async fn test_server_error_signs_out_by_default() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    drop(signed_in(&backend, dir.path()).await);

    backend.fail_profile(Some(StatusCode::INTERNAL_SERVER_ERROR));
    let shop = Shop::open(&backend.config(dir.path())).await;

    assert!(!shop.session.is_authenticated());
}

#[tokio::test]
async fn test_server_error_keeps_session_under_auth_rejection_policy() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    drop(signed_in(&backend, dir.path()).await);

    backend.fail_profile(Some(StatusCode::BAD_GATEWAY));
    let mut config = backend.config(dir.path());
    config.refresh_policy = RefreshPolicy::AuthRejection;
    let shop = Shop::open(&config).await;

    assert!(shop.session.is_authenticated());
    assert!(!shop.session.is_loading());
}

#[tokio::test]
async fn test_slow_profile_times_out_and_signs_out() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    drop(signed_in(&backend, dir.path()).await);

    backend.delay_profile(Some(Duration::from_secs(2)));
    let mut config = backend.config(dir.path());
    config.request_timeout = Duration::from_millis(200);
    let shop = Shop::open(&config).await;

    assert!(!shop.session.is_loading());
    assert!(!shop.session.is_authenticated());
}

#[tokio::test]
async fn test_wiped_device_mirror_restores_from_browser() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    drop(signed_in(&backend, dir.path()).await);

    std::fs::remove_dir_all(dir.path().join("device")).unwrap();
    let shop = Shop::open(&backend.config(dir.path())).await;

    assert!(shop.session.is_authenticated());
}

// ============================================================================
// Account Management
// ============================================================================

#[tokio::test]
async fn test_register_then_login() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::open(&backend.config(dir.path())).await;

    let user = shop
        .session
        .register(&Registration {
            name: "Grace".to_string(),
            email: "grace@shop.test".to_string(),
            password: secret("hopper"),
        })
        .await
        .unwrap();
    assert_eq!(user.role, Role::Customer);
    assert!(!shop.session.is_authenticated());

    shop.session
        .login("grace@shop.test", &secret("hopper"))
        .await
        .unwrap();
    assert_eq!(shop.session.user().unwrap().name, "Grace");
}

#[tokio::test]
async fn test_duplicate_registration_surfaces_backend_message() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::open(&backend.config(dir.path())).await;

    let err = shop
        .session
        .register(&Registration {
            name: "Ada again".to_string(),
            email: CUSTOMER_EMAIL.to_string(),
            password: secret("pw"),
        })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Email is already in use."));
}

#[tokio::test]
async fn test_profile_update_persists() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = signed_in(&backend, dir.path()).await;

    let updated = shop
        .session
        .update_profile(&ProfileUpdate {
            name: "Ada L.".to_string(),
            email: CUSTOMER_EMAIL.to_string(),
            password: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Ada L.");

    let reopened = Shop::open(&backend.config(dir.path())).await;
    assert_eq!(reopened.session.user().unwrap().name, "Ada L.");
}

#[tokio::test]
async fn test_delete_account_signs_out() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = signed_in(&backend, dir.path()).await;

    let message = shop.session.delete_account().await.unwrap();

    assert_eq!(message, "User deleted successfully");
    assert!(!shop.session.is_authenticated());
    let err = shop
        .session
        .login(CUSTOMER_EMAIL, &secret(CUSTOMER_PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_admin_cannot_delete_own_account() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::open(&backend.config(dir.path())).await;
    shop.session
        .login(ADMIN_EMAIL, &secret(ADMIN_PASSWORD))
        .await
        .unwrap();

    let err = shop.session.delete_account().await.unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
    assert!(shop.session.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_both_mirrors() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let shop = signed_in(&backend, dir.path()).await;

    shop.session.logout().await;

    assert!(!shop.session.is_authenticated());
    assert!(!dir.path().join("device").join("token").exists());
    let reopened = Shop::open(&backend.config(dir.path())).await;
    assert!(!reopened.session.is_authenticated());
}
