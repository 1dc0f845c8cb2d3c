use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::Deserialize;

use crate::store::ProfileFields;
use crate::types::{LoginRequest, RefreshRequest, RegisterRequest, Result, TokenPair};
use crate::AppState;

/// Register a new account and receive its first token pair.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenPair),
        (status = 400, description = "Invalid input or weak password"),
        (status = 409, description = "Email or username already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenPair>)> {
    let profile = ProfileFields {
        first_name: payload.first_name,
        last_name: payload.last_name,
        display_name: Some(payload.username.clone()),
    };

    let pair = state
        .issuer
        .register(&payload.email, &payload.username, &payload.password, profile)
        .await?;

    Ok((StatusCode::CREATED, Json(pair)))
}

/// Login with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account is inactive")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPair>> {
    let pair = state.issuer.login(&payload.email, &payload.password).await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a fresh pair.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPair>> {
    let pair = state.issuer.refresh(&payload.refresh_token).await?;
    Ok(Json(pair))
}

/// Redirect the browser to the federated provider's authorization page.
#[utoipa::path(
    get,
    path = "/api/v1/auth/federated/login",
    responses(
        (status = 307, description = "Redirect to the identity provider"),
        (status = 404, description = "No federated provider configured")
    ),
    tag = "auth"
)]
pub async fn federated_login(State(state): State<AppState>) -> Result<Redirect> {
    let url = state.issuer.federated_login_url()?;
    Ok(Redirect::temporary(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
}

/// Complete the federated login: exchange the code, link or create the
/// credential, and mint a pair.
#[utoipa::path(
    get,
    path = "/api/v1/auth/federated/callback",
    params(("code" = String, Query, description = "Authorization code from the provider")),
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 401, description = "Identity exchange failed"),
        (status = 404, description = "No federated provider configured")
    ),
    tag = "auth"
)]
pub async fn federated_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<TokenPair>> {
    let pair = state.issuer.federated_callback(&params.code).await?;
    Ok(Json(pair))
}
