use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::types::{AuthError, Result, UserResponse};
use crate::AppState;

/// List every account as its public view.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "All accounts", body = [UserResponse]),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>> {
    let all = state.store.list_all().await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// Re-enable an account. Takes effect on the next password login.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/activate",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account activated", body = UserResponse),
        (status = 404, description = "Unknown account")
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn activate_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    set_active(&state, &id, true).await
}

/// Deactivate an account. Outstanding tokens stay valid until their own
/// expiry; only subsequent logins are blocked.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/deactivate",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deactivated", body = UserResponse),
        (status = 404, description = "Unknown account")
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    set_active(&state, &id, false).await
}

async fn set_active(state: &AppState, id: &str, active: bool) -> Result<Json<UserResponse>> {
    let mut credential = state.store.find_by_id(id).await?.ok_or(AuthError::NotFound)?;

    credential.is_active = active;
    state.store.update(&credential).await?;

    info!(user_id = %credential.id, active, "account lifecycle change");
    Ok(Json(credential.into()))
}
