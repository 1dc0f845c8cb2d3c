//! Per-request authorization gates.
//!
//! `require_auth` walks the header → scheme → verify → bind state machine
//! and rejects at the first failing step. `require_admin` composes after it
//! and only ever consumes the bound identity; neither gate touches the
//! credential store.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::auth::token::TokenKind;
use crate::types::{AuthError, AuthenticatedIdentity, Result, Role};
use crate::AppState;

/// Validate the bearer access token and bind the caller's identity into the
/// request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;

    let header_str = header_value
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    // Exactly `Bearer <token>`: two parts, one space, case-sensitive scheme.
    let parts: Vec<&str> = header_str.split(' ').collect();
    if parts.len() != 2 || parts[0] != "Bearer" || parts[1].is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    let claims = state.codec.verify(parts[1], TokenKind::Access)?;

    req.extensions_mut().insert(AuthenticatedIdentity {
        user_id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Role gate: requires the bound identity to be an admin. Layered inside
/// `require_auth`, so a missing identity here means the stack was wired
/// wrong, not that the client skipped a header.
pub async fn require_admin(req: Request, next: Next) -> Result<Response> {
    let identity = req
        .extensions()
        .get::<AuthenticatedIdentity>()
        .ok_or(AuthError::Forbidden)?;

    if identity.role != Role::Admin {
        return Err(AuthError::Forbidden);
    }

    Ok(next.run(req).await)
}

/// Extractor handing handlers the identity bound by `require_auth`.
pub struct CurrentUser(pub AuthenticatedIdentity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::MissingCredential)
    }
}
