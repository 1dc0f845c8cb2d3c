//! # A.E.G.I.S - Auth & Entitlement Gateway for Identity Services
//!
//! A credential-issuance and request-authorization service: it converts user
//! credentials (or a federated identity-provider assertion) into short-lived
//! access tokens and longer-lived refresh tokens, and gates protected
//! requests through a token-validation and role-check pipeline.
//!
//! ## Overview
//!
//! AEGIS can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `aegis-server` binary
//! 2. **As a library** - Embed the issuance core in your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use aegis::auth::issuer::TokenIssuer;
//! use aegis::auth::token::TokenCodec;
//! use aegis::store::StoreProvider;
//! use std::sync::Arc;
//!
//! # async fn run() -> aegis::Result<()> {
//! let store = StoreProvider::Memory.connect().await?;
//! let codec = Arc::new(TokenCodec::new(b"a-32-byte-minimum-signing-secret!"));
//! let issuer = TokenIssuer::new(store, codec, None, 900, 604800, 8);
//!
//! let pair = issuer
//!     .register("alice@x.com", "alice", "Secret123!", Default::default())
//!     .await?;
//! let refreshed = issuer.refresh(&pair.refresh_token).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - Password hashing, token codec, issuance, request gates
//! - [`api`] - REST API handlers and routes
//! - [`oidc`] - Federated identity bridge
//! - [`store`] - Credential persistence (in-memory, libsql)
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration
//!
//! ## Security Model
//!
//! One symmetric signing secret is injected at startup and shared by issuer
//! and verifiers (a single trust domain); tokens are stateless, so there is
//! no server-side revocation list and a pair stays valid until its own
//! expiry. See the [`auth`] module docs for the full property list.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Authentication core: hashing, codec, issuance, middleware.
pub mod auth;
/// CLI parsing and project scaffolding.
pub mod cli;
/// Federated identity bridge.
pub mod oidc;
/// Credential store abstraction and implementations.
pub mod store;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use auth::issuer::TokenIssuer;
pub use auth::token::{TokenClaims, TokenCodec, TokenKind};
pub use store::{CredentialStore, StoreProvider};
pub use types::{AuthError, Result, Role, TokenPair};
pub use utils::config::{AegisConfig, ConfigError};

use oidc::{IdentityBridge, OidcBridge, OidcSettings};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Validated startup configuration.
    pub config: Arc<AegisConfig>,
    /// Credential store handle.
    pub store: Arc<dyn CredentialStore>,
    /// Token codec; keys derived once from the signing secret.
    pub codec: Arc<TokenCodec>,
    /// Token issuance orchestrator.
    pub issuer: Arc<TokenIssuer>,
}

impl AppState {
    /// Assemble the full application state from validated configuration:
    /// resolve the signing secret, connect the store, and wire the optional
    /// federated bridge into the issuer.
    pub async fn initialize(config: AegisConfig) -> anyhow::Result<Self> {
        let secret = config.jwt_secret()?;
        let codec = Arc::new(TokenCodec::new(secret.as_bytes()));

        let store = StoreProvider::from_url(&config.database.url)
            .connect()
            .await?;

        let bridge: Option<Arc<dyn IdentityBridge>> = match (
            config.federated.as_ref(),
            config.federated_client_secret()?,
        ) {
            (Some(federated), Some(client_secret)) => {
                Some(Arc::new(OidcBridge::new(OidcSettings {
                    issuer_url: federated.issuer_url.clone(),
                    client_id: federated.client_id.clone(),
                    client_secret,
                    redirect_url: federated.redirect_url.clone(),
                })))
            }
            _ => None,
        };

        let issuer = Arc::new(TokenIssuer::new(
            store.clone(),
            codec.clone(),
            bridge,
            config.auth.access_token_ttl,
            config.auth.refresh_token_ttl,
            config.auth.password_min_length,
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            codec,
            issuer,
        })
    }
}
