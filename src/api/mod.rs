//! HTTP API handlers and routes, built on Axum.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route groups, layers, and router assembly
//!
//! # API Endpoints
//!
//! ## Public (`/api/v1`)
//! - `GET  /health` - Liveness probe
//! - `POST /auth/register` - Create an account, receive a token pair
//! - `POST /auth/login` - Password login
//! - `POST /auth/refresh` - Exchange a refresh token for a new pair
//! - `GET  /auth/federated/login` - Redirect to the identity provider
//! - `GET  /auth/federated/callback` - Complete federated login
//!
//! ## Protected (bearer access token)
//! - `GET /users/me` - The caller's account record
//!
//! ## Admin (bearer access token, `admin` role)
//! - `GET /admin/users` - List accounts
//! - `PUT /admin/users/{id}/activate` - Re-enable an account
//! - `PUT /admin/users/{id}/deactivate` - Disable an account
//!
//! # Authentication
//!
//! Protected endpoints require a valid access token:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::OpenApi;

/// OpenAPI document covering the full surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::federated_login,
        handlers::auth::federated_callback,
        handlers::users::me,
        handlers::admin::list_users,
        handlers::admin::activate_user,
        handlers::admin::deactivate_user,
    ),
    components(schemas(
        crate::types::RegisterRequest,
        crate::types::LoginRequest,
        crate::types::RefreshRequest,
        crate::types::TokenPair,
        crate::types::UserResponse,
        crate::types::Role,
    )),
    tags(
        (name = "auth", description = "Credential issuance"),
        (name = "users", description = "Authenticated account access"),
        (name = "admin", description = "Account lifecycle"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
