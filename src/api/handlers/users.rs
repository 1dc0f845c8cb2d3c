use axum::{extract::State, Json};

use crate::auth::middleware::CurrentUser;
use crate::types::{AuthError, Result, UserResponse};
use crate::AppState;

/// The caller's own account record, looked up from the identity the auth
/// layer bound to this request.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<UserResponse>> {
    let credential = state
        .store
        .find_by_id(&identity.user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    Ok(Json(credential.into()))
}
