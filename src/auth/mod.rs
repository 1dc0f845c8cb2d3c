//! Authentication core: hashing, token codec, issuance, and request gates.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id hashing and verification
//! - [`auth::token`](crate::auth::token) - HS256 claim codec and token kinds
//! - [`auth::issuer`](crate::auth::issuer) - register/login/refresh/federated orchestration
//! - [`auth::middleware`](crate::auth::middleware) - Axum layers and the `CurrentUser` extractor
//!
//! # Security Properties
//!
//! - **Password Hashing**: Argon2id (memory-hard) PHC strings, fresh salt per hash
//! - **Tokens**: HS256-signed pairs; access and refresh kinds are enforced at
//!   the codec, so neither is ever accepted in the other's place
//! - **Expiry**: strict boundary; a token is invalid from the instant `now == exp`
//! - **Enumeration**: unknown identity and wrong password collapse into one
//!   client-visible category
//!
//! # Configuration
//!
//! Configure via `aegis.toml`:
//! ```toml
//! [auth]
//! jwt_secret_env = "AEGIS_JWT_SECRET"  # env var holding the signing secret
//! access_token_ttl = 900               # seconds
//! refresh_token_ttl = 604800           # seconds
//! password_min_length = 8
//! ```

/// Token issuance orchestration (register, login, refresh, federated).
pub mod issuer;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Password hashing and verification.
pub mod password;
/// Signed-token codec and claim types.
pub mod token;
