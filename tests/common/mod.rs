//! Shared helpers for integration tests: an in-memory application instance
//! behind an axum-test server, plus seeding shortcuts.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use chrono::Utc;
use serde_json::json;

use aegis::api::routes::create_router;
use aegis::auth::password::PasswordHasher;
use aegis::oidc::IdentityBridge;
use aegis::store::{Credential, CredentialStore, MemoryStore, NewCredential, ProfileFields};
use aegis::types::Role;
use aegis::utils::config::AegisConfig;
use aegis::{AppState, TokenCodec, TokenIssuer};

/// Signing secret shared by every test instance (32+ bytes).
pub const TEST_SECRET: &[u8] = b"integration-test-signing-secret-32b+";

/// Short TTLs keep refresh tests fast while staying comfortably unexpired.
pub const ACCESS_TTL: i64 = 900;
pub const REFRESH_TTL: i64 = 604800;

/// A fully wired application over the in-memory store.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub codec: Arc<TokenCodec>,
}

/// Build a test application without a federated bridge.
pub fn spawn_app() -> TestApp {
    spawn_app_with_bridge(None)
}

/// Build a test application, optionally wiring a federated identity bridge.
pub fn spawn_app_with_bridge(bridge: Option<Arc<dyn IdentityBridge>>) -> TestApp {
    let mut config = AegisConfig::default();
    config.database.url = ":memory:".to_string();

    let store = Arc::new(MemoryStore::new());
    let codec = Arc::new(TokenCodec::new(TEST_SECRET));
    let issuer = Arc::new(TokenIssuer::new(
        store.clone() as Arc<dyn CredentialStore>,
        codec.clone(),
        bridge,
        ACCESS_TTL,
        REFRESH_TTL,
        8,
    ));

    let state = AppState {
        config: Arc::new(config),
        store: store.clone(),
        codec: codec.clone(),
        issuer,
    };

    let server = TestServer::new(create_router(state)).expect("failed to build test server");

    TestApp {
        server,
        store,
        codec,
    }
}

impl TestApp {
    /// Register through the API and return the access token.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/v1/auth/register")
            .json(&json!({
                "email": email,
                "username": username,
                "password": password,
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Seed an admin credential directly into the store and return a valid
    /// access token for it. Admin accounts are never created through the
    /// public API, so tests plant them the way an operator would.
    pub async fn seed_admin(&self, email: &str, username: &str, password: &str) -> String {
        let hash = PasswordHasher::new().hash(password).unwrap();
        self.store
            .create(NewCredential {
                email: email.to_string(),
                username: username.to_string(),
                password_hash: hash,
                role: Role::Admin,
                is_active: true,
                subject: None,
                profile: ProfileFields::default(),
            })
            .await
            .unwrap();

        self.login(email, password).await
    }

    /// Login through the API, asserting success, and return the access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/v1/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Mint an access token straight from the codec for a stored credential.
    pub fn access_token_for(&self, credential: &Credential) -> String {
        use aegis::auth::token::{TokenClaims, TokenKind};

        let claims = TokenClaims::new(&credential.id, credential.role, TokenKind::Access, ACCESS_TTL);
        self.codec.sign(&claims).unwrap()
    }

    /// Flip `is_active` on a stored credential.
    pub async fn set_active(&self, email: &str, active: bool) {
        let mut credential = self.store.find_by_email(email).await.unwrap().unwrap();
        credential.is_active = active;
        credential.updated_at = Utc::now();
        self.store.update(&credential).await.unwrap();
    }
}
