//! Admin surface: role gating and the account lifecycle endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use aegis::store::CredentialStore;
use common::spawn_app;

#[tokio::test]
async fn admin_routes_require_a_token() {
    let app = spawn_app();

    let response = app.server.get("/api/v1/admin/users").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_role_cannot_reach_admin_routes() {
    let app = spawn_app();
    let token = app.register("alice@x.com", "alice", "Secret123!").await;

    let response = app
        .server
        .get("/api/v1/admin/users")
        .add_header("Authorization", format!("Bearer {}", token))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "admin access required");
}

#[tokio::test]
async fn admin_lists_all_users() {
    let app = spawn_app();
    app.register("alice@x.com", "alice", "Secret123!").await;
    app.register("bob@x.com", "bob", "Secret123!").await;
    let admin_token = app.seed_admin("root@x.com", "root", "RootSecret1!").await;

    let response = app
        .server
        .get("/api/v1/admin/users")
        .add_header("Authorization", format!("Bearer {}", admin_token))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 3);

    // Full records stay server-side; the listing is the client projection.
    for user in users {
        assert!(user.get("password_hash").is_none());
        assert!(user["email"].is_string());
        assert!(user["is_active"].is_boolean());
    }
}

#[tokio::test]
async fn deactivate_locks_out_login_and_activate_restores_it() {
    let app = spawn_app();
    app.register("alice@x.com", "alice", "Secret123!").await;
    let admin_token = app.seed_admin("root@x.com", "root", "RootSecret1!").await;

    let alice = app.store.find_by_email("alice@x.com").await.unwrap().unwrap();

    let response = app
        .server
        .put(&format!("/api/v1/admin/users/{}/deactivate", alice.id))
        .add_header("Authorization", format!("Bearer {}", admin_token))
        .await;
    response.assert_status_ok();

    let login = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "alice@x.com", "password": "Secret123!" }))
        .await;
    login.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .put(&format!("/api/v1/admin/users/{}/activate", alice.id))
        .add_header("Authorization", format!("Bearer {}", admin_token))
        .await;
    response.assert_status_ok();

    let login = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "alice@x.com", "password": "Secret123!" }))
        .await;
    login.assert_status_ok();
}

#[tokio::test]
async fn lifecycle_on_unknown_user_is_not_found() {
    let app = spawn_app();
    let admin_token = app.seed_admin("root@x.com", "root", "RootSecret1!").await;

    let response = app
        .server
        .put("/api/v1/admin/users/no-such-id/deactivate")
        .add_header("Authorization", format!("Bearer {}", admin_token))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deactivation_does_not_revoke_outstanding_tokens() {
    // Tokens are stateless: deactivation stops new logins, but a pair minted
    // before the flip stays valid until it expires.
    let app = spawn_app();
    let alice_token = app.register("alice@x.com", "alice", "Secret123!").await;
    let admin_token = app.seed_admin("root@x.com", "root", "RootSecret1!").await;

    let alice = app.store.find_by_email("alice@x.com").await.unwrap().unwrap();
    app.server
        .put(&format!("/api/v1/admin/users/{}/deactivate", alice.id))
        .add_header("Authorization", format!("Bearer {}", admin_token))
        .await
        .assert_status_ok();

    let response = app
        .server
        .get("/api/v1/users/me")
        .add_header("Authorization", format!("Bearer {}", alice_token))
        .await;
    response.assert_status_ok();
}
