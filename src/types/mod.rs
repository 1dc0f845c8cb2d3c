//! Core types: roles, request/response DTOs, and the error taxonomy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::Credential;

// ============= Roles & Identity =============

/// Privilege level carried on a credential and inside every signed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Wire representation (`user` / `admin`), also used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::Internal(format!("unknown role '{}'", other))),
        }
    }
}

/// The validated identity bound to a request after the auth middleware
/// accepts its access token. Lives in the request extensions only and is
/// dropped when the request completes.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub role: Role,
}

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// An access/refresh token pair, minted once per issuance event and never
/// persisted server-side. `expires_in` is the access-token TTL in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Client-safe projection of a credential record. Never carries the
/// password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Credential> for UserResponse {
    fn from(cred: Credential) -> Self {
        Self {
            id: cred.id,
            email: cred.email,
            username: cred.username,
            role: cred.role,
            is_active: cred.is_active,
            last_login_at: cred.last_login_at,
            created_at: cred.created_at,
        }
    }
}

// ============= Error Types =============

/// The closed error taxonomy every collaborator failure is wrapped into
/// before it reaches the transport boundary. Raw storage or cryptographic
/// errors never leak field-level detail to a client.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown identity or wrong password. Deliberately one category so
    /// callers cannot enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account exists and the password verified, but the account is
    /// deactivated. Checked only after password verification.
    #[error("account is inactive")]
    AccountInactive,

    /// Duplicate email or username on registration.
    #[error("email or username already exists")]
    AlreadyExists,

    /// Bad signature, wrong kind, malformed payload, or expired. One
    /// category at the boundary.
    #[error("invalid or expired token")]
    InvalidToken,

    /// No `Authorization` header on a protected route.
    #[error("authorization header required")]
    MissingCredential,

    /// Header present but not exactly `Bearer <token>`.
    #[error("invalid authorization format")]
    MalformedHeader,

    /// Authenticated but lacking the required role.
    #[error("admin access required")]
    Forbidden,

    /// The federated identity bridge could not exchange the code.
    #[error("identity exchange failed: {0}")]
    ExchangeFailed(String),

    /// Stored password hash is unreadable. A data-integrity bug: logged
    /// loudly, but presented to the client as invalid credentials.
    #[error("stored credential is corrupt for user {0}")]
    CorruptCredential(String),

    /// Password below the configured minimum length.
    #[error("password does not meet minimum requirements")]
    WeakPassword,

    /// Request body failed shape validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found")]
    NotFound,

    /// Credential store adapter failure.
    #[error("store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        // The one place internal detail is logged; client bodies stay generic.
        let (status, message) = match &self {
            AuthError::InvalidCredentials => {
                tracing::debug!("login rejected: invalid credentials");
                (StatusCode::UNAUTHORIZED, "invalid credentials")
            }
            AuthError::CorruptCredential(id) => {
                tracing::error!(user_id = %id, "stored password hash is unreadable");
                // Disguised as a routine rejection; the log line is the signal.
                (StatusCode::UNAUTHORIZED, "invalid credentials")
            }
            AuthError::AccountInactive => (StatusCode::FORBIDDEN, "account is inactive"),
            AuthError::AlreadyExists => (StatusCode::CONFLICT, "email or username already exists"),
            AuthError::InvalidToken => {
                tracing::debug!("token rejected");
                (StatusCode::UNAUTHORIZED, "invalid or expired token")
            }
            AuthError::MissingCredential => {
                (StatusCode::UNAUTHORIZED, "authorization header required")
            }
            AuthError::MalformedHeader => {
                (StatusCode::UNAUTHORIZED, "invalid authorization format")
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "admin access required"),
            AuthError::ExchangeFailed(detail) => {
                tracing::warn!(%detail, "federated identity exchange failed");
                (StatusCode::UNAUTHORIZED, "authentication failed")
            }
            AuthError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "password does not meet minimum requirements",
            ),
            AuthError::InvalidRequest(detail) => {
                tracing::debug!(%detail, "request rejected");
                (StatusCode::BAD_REQUEST, "invalid request")
            }
            AuthError::NotFound => (StatusCode::NOT_FOUND, "not found"),
            AuthError::Store(detail) => {
                tracing::error!(%detail, "credential store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
            AuthError::Internal(detail) => {
                tracing::error!(%detail, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
