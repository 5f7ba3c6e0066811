//! Integration tests for role-graph authorization.

mod helpers;

use warden_auth::Requirement;
use warden_auth::store::RoleStore;
use warden_core::error::ErrorKind;
use warden_entity::role::{Capability, Permission, Role};

#[tokio::test]
async fn test_admin_and_editor_permissions() {
    let app = helpers::TestApp::new();
    let admin = app.create_role("Admin", &["read", "write"]).await;
    let editor = app.create_role("Editor", &["read"]).await;

    let alice = app.create_test_identity("alice", "Password").await;
    let bob = app.create_test_identity("bob", "Password").await;
    app.assign(&alice, &admin).await;
    app.assign(&bob, &editor).await;

    let write = Requirement::permission("write");
    assert!(app.flow.authorize(&alice, &write).await.unwrap());
    assert!(!app.flow.authorize(&bob, &write).await.unwrap());
    assert!(app.flow.authorize(&bob, &Requirement::permission("read")).await.unwrap());
}

#[tokio::test]
async fn test_deactivating_permission_revokes_grant() {
    let app = helpers::TestApp::new();
    let admin = app.create_role("Admin", &["read", "write"]).await;
    let alice = app.create_test_identity("alice", "Password").await;
    app.assign(&alice, &admin).await;

    let write = Requirement::permission("write");
    assert!(app.flow.authorize(&alice, &write).await.unwrap());

    assert!(app.roles.set_permission_active("write", false).await.unwrap());
    assert!(!app.flow.authorize(&alice, &write).await.unwrap());

    // The link itself is untouched.
    let admin = app.roles.find_role("Admin").await.unwrap().unwrap();
    assert!(admin.permission_named("write").is_some());
    assert!(app.flow.authorize(&alice, &Requirement::permission("read")).await.unwrap());
}

#[tokio::test]
async fn test_inactive_role_grants_nothing() {
    let app = helpers::TestApp::new();
    let admin = app.create_role("Admin", &["read"]).await;
    let alice = app.create_test_identity("alice", "Password").await;
    app.assign(&alice, &admin).await;

    app.roles.set_role_active("Admin", false).await.unwrap();
    assert!(!app.flow.authorize(&alice, &Requirement::permission("read")).await.unwrap());
    assert!(app.flow.permissions_of(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_capability_through_permission_and_role() {
    let app = helpers::TestApp::new();
    let role = Role::new("Operator")
        .with_permission(Permission::new("files").with_capability(Capability::new("files.delete")))
        .with_capability(Capability::new("jobs.run"));
    let role = app.roles.save_role(role).await.unwrap();
    let alice = app.create_test_identity("alice", "Password").await;
    app.assign(&alice, &role).await;

    assert!(app.flow.authorize(&alice, &Requirement::capability("files.delete")).await.unwrap());
    assert!(app.flow.authorize(&alice, &Requirement::capability("jobs.run")).await.unwrap());
    assert!(!app.flow.authorize(&alice, &Requirement::capability("files.create")).await.unwrap());

    app.roles.set_permission_active("files", false).await.unwrap();
    assert!(!app.flow.authorize(&alice, &Requirement::capability("files.delete")).await.unwrap());
    assert!(app.flow.authorize(&alice, &Requirement::capability("jobs.run")).await.unwrap());
}

#[tokio::test]
async fn test_require_names_missing_grant() {
    let app = helpers::TestApp::new();
    let editor = app.create_role("Editor", &["read"]).await;
    let bob = app.create_test_identity("bob", "Password").await;
    app.assign(&bob, &editor).await;

    let err = app
        .flow
        .require(&bob, &Requirement::permission("write"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(err.message, "Missing permission 'write'");

    app.flow.require(&bob, &"permission: read".parse().unwrap()).await.unwrap();
}

#[tokio::test]
async fn test_identity_without_roles_is_denied() {
    let app = helpers::TestApp::new();
    let carol = app.create_test_identity("carol", "Password").await;
    assert!(!app.flow.authorize(&carol, &Requirement::permission("read")).await.unwrap());
}
