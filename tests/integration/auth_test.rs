//! Integration tests for registration, login, and token flows.

mod helpers;

use chrono::{Duration, Utc};

use warden_auth::HashEngine;
use warden_auth::RegisterRequest;
use warden_auth::store::{CredentialStore, USER_NAME_HAS_AT};
use warden_auth::token::INVALID_TOKEN;
use warden_core::config::AppConfig;
use warden_core::error::ErrorKind;
use warden_entity::identity::LoginIdentifier;
use warden_entity::token::TokenType;

#[test]
fn test_password_digest_scenario() {
    let engine = HashEngine::new();
    assert_eq!(
        engine.digest("Password"),
        "e7cf3ef4f17c3999a94f2c6f612e8a888e5b1026878e4e19398b23bd38ec221a"
    );

    let salt = "e3254be6fcc8492185d92843c5a3b2ba";
    let verifier = engine.salted_verifier(&engine.digest("Password"), salt);
    assert_eq!(
        verifier.salt_encoded,
        "6533323534626536666363383439323138356439323834336335613362326261"
    );
    assert!(engine.verify("Password", &verifier.salt_encoded, &verifier.stored_hash));
    assert!(!engine.verify("password", &verifier.salt_encoded, &verifier.stored_hash));
}

#[tokio::test]
async fn test_register_login_authenticate() {
    let app = helpers::TestApp::new();
    let identity = app.create_test_identity("alice", "Password").await;

    let token = app.flow.login("alice@example.com", "Password").await.unwrap();
    let resolved = app
        .flow
        .authenticate(&token.opaque_value, TokenType::Auth)
        .await
        .unwrap();
    assert_eq!(resolved.id, identity.id);

    let err = app
        .flow
        .authenticate(&token.opaque_value, TokenType::Refresh)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_plaintext_is_never_stored() {
    let app = helpers::TestApp::new();
    app.create_test_identity("alice", "Password").await;

    let record = app
        .credentials
        .load_security_record(&LoginIdentifier::parse("alice"))
        .await
        .unwrap()
        .expect("security record");
    assert_eq!(record.verifier.stored_hash.len(), 128);
    assert!(!record.verifier.stored_hash.contains("Password"));
    assert_eq!(record.verifier.salt_encoded.len(), 64);
}

#[tokio::test]
async fn test_same_password_different_salts() {
    let app = helpers::TestApp::new();
    let alice = app.create_test_identity("alice", "Password").await;
    let bob = app.create_test_identity("bob", "Password").await;

    let alice = app.credentials.find_security_record(alice.id).await.unwrap().unwrap();
    let bob = app.credentials.find_security_record(bob.id).await.unwrap().unwrap();
    assert_ne!(alice.verifier.salt_encoded, bob.verifier.salt_encoded);
    assert_ne!(alice.verifier.stored_hash, bob.verifier.stored_hash);
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_are_identical() {
    let app = helpers::TestApp::new();
    app.create_test_identity("alice", "Password").await;

    let wrong = app.flow.login("alice", "password").await.unwrap_err();
    let unknown = app.flow.login("mallory", "Password").await.unwrap_err();
    assert_eq!(wrong.kind, unknown.kind);
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn test_inactive_identity_cannot_login_or_authenticate() {
    let app = helpers::TestApp::new();
    let identity = app.create_test_identity("alice", "Password").await;
    let token = app.flow.login("alice", "Password").await.unwrap();

    app.credentials
        .set_identity_active(identity.id, false)
        .await
        .unwrap();

    let err = app.flow.login("alice", "Password").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    let err = app
        .flow
        .authenticate(&token.opaque_value, TokenType::Auth)
        .await
        .unwrap_err();
    assert_eq!(err.message, INVALID_TOKEN);
}

#[tokio::test]
async fn test_logout_invalidates_tokens() {
    let app = helpers::TestApp::new();
    let identity = app.create_test_identity("alice", "Password").await;
    let pair = app.flow.login_with_refresh("alice", "Password").await.unwrap();

    app.flow.logout(identity.id).await.unwrap();

    assert!(app.flow.authenticate(&pair.auth.opaque_value, TokenType::Auth).await.is_err());
    assert!(app.flow.refresh(&pair.refresh.opaque_value).await.is_err());
}

#[tokio::test]
async fn test_refresh_rotation() {
    let app = helpers::TestApp::new();
    let identity = app.create_test_identity("alice", "Password").await;
    let pair = app.flow.login_with_refresh("alice", "Password").await.unwrap();

    let rotated = app.flow.refresh(&pair.refresh.opaque_value).await.unwrap();
    assert_eq!(rotated.auth.subject_id, identity.id);

    let err = app.flow.refresh(&pair.refresh.opaque_value).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert!(app.flow.authenticate(&rotated.auth.opaque_value, TokenType::Auth).await.is_ok());
}

#[tokio::test]
async fn test_change_password() {
    let app = helpers::TestApp::new();
    let identity = app.create_test_identity("alice", "Password").await;
    let token = app.flow.login("alice", "Password").await.unwrap();

    app.flow
        .change_password(identity.id, "Password", "Another Password")
        .await
        .unwrap();

    assert!(app.flow.login("alice", "Password").await.is_err());
    assert!(app.flow.login("alice", "Another Password").await.is_ok());
    assert!(app.flow.authenticate(&token.opaque_value, TokenType::Auth).await.is_err());
}

#[tokio::test]
async fn test_expired_token_fails() {
    let mut config = AppConfig::default();
    config.auth.auth_token_ttl_minutes = 1;
    let app = helpers::TestApp::with_config(config);
    let identity = app.create_test_identity("alice", "Password").await;

    let token = app
        .flow
        .issuer()
        .issue_at(identity.id, TokenType::Auth, Utc::now() - Duration::minutes(2))
        .await
        .unwrap();

    let err = app
        .flow
        .authenticate(&token.opaque_value, TokenType::Auth)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() -> anyhow::Result<()> {
    let app = helpers::TestApp::new();
    app.create_test_identity("alice", "Password").await;

    let err = app
        .flow
        .register(RegisterRequest::new("alice@example.com", "alice2", "Password"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = app
        .flow
        .register(RegisterRequest::new("", "", "Password"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(
        err.details,
        ["Identity 'email' is required!", "Identity 'user_name' is required!"]
    );

    // The failed registrations left the original identity usable.
    app.flow.login("alice", "Password").await?;
    Ok(())
}

#[tokio::test]
async fn test_email_and_user_name_never_collide() {
    for _ in 0..20 {
        let app = helpers::TestApp::new();
        let owner = app
            .flow
            .register(RegisterRequest::new("shared@example.com", "owner", "PasswordA"))
            .await
            .unwrap();

        let err = app
            .flow
            .register(RegisterRequest::new("other@example.com", "shared@example.com", "PasswordB"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.details, [USER_NAME_HAS_AT]);

        let other = app
            .flow
            .register(RegisterRequest::new("other@example.com", "shared", "PasswordB"))
            .await
            .unwrap();

        let token = app.flow.login("Shared@Example.com", "PasswordA").await.unwrap();
        assert_eq!(token.subject_id, owner.id);
        let token = app.flow.login("shared", "PasswordB").await.unwrap();
        assert_eq!(token.subject_id, other.id);
        assert!(app.flow.login("shared@example.com", "PasswordB").await.is_err());
    }
}

#[tokio::test]
async fn test_email_case_is_folded_once_at_registration() {
    let app = helpers::TestApp::new();
    let identity = app
        .flow
        .register(RegisterRequest::new(" Roh@BÜCHER.Example ", "roh", "Password"))
        .await
        .unwrap();
    assert_eq!(identity.email, "roh@bücher.example");

    let token = app.flow.login("ROH@bücher.EXAMPLE", "Password").await.unwrap();
    assert_eq!(token.subject_id, identity.id);

    let err = app
        .flow
        .register(RegisterRequest::new("roh@Bücher.example", "roh2", "Password"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_one_token_validated_concurrently() {
    let app = helpers::TestApp::new();
    let identity = app.create_test_identity("alice", "Password").await;
    let token = app.flow.login("alice", "Password").await.unwrap();

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let flow = app.flow.clone();
            let presented = token.opaque_value.clone();
            tokio::spawn(async move { flow.authenticate(&presented, TokenType::Auth).await })
        })
        .collect();

    for task in tasks {
        let resolved = task.await.unwrap().unwrap();
        assert_eq!(resolved.id, identity.id);
    }
}
