//! Request and response handlers for all API endpoints.

/// Admin account-lifecycle handlers.
pub mod admin;
/// Registration, login, refresh, and federated login handlers.
pub mod auth;
/// Authenticated user handlers.
pub mod users;

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
