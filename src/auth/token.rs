//! Signed-token codec: HS256 compact JWT encoding of [`TokenClaims`].
//!
//! The codec is the single place kind enforcement lives; every `verify`
//! call states the kind it requires so a refresh token can never slip
//! through an access-token gate. Verification is pure and stateless, so
//! the codec is shared read-only across request tasks.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::types::{AuthError, Result, Role};

/// Discriminates the two token flavors sharing one wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Strongly-typed claim set. Decoding rejects any payload that does not
/// match this shape exactly; there is no optimistic field casting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    /// Subject: the credential id.
    pub sub: String,
    pub role: Role,
    pub typ: TokenKind,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds. The token is valid only while `now < exp`.
    pub exp: i64,
}

impl TokenClaims {
    /// Mint a claim set expiring `ttl_secs` from now. `ttl_secs` comes from
    /// validated config and is strictly positive, so `exp > iat` holds by
    /// construction.
    pub fn new(subject: &str, role: Role, kind: TokenKind, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            role,
            typ: kind,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        }
    }
}

/// HS256 sign/verify over the shared process secret. Keys are derived once
/// at construction; the secret itself is not retained.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a claim set into the compact three-segment wire form.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Verify signature, expiry, shape, and kind. Every failure collapses
    /// into `InvalidToken`; callers never learn which check tripped.
    pub fn verify(&self, token: &str, required_kind: TokenKind) -> Result<TokenClaims> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)?;

        // The library check accepts the exact boundary second; the contract
        // is strict (`now < exp`), so re-check here.
        if Utc::now().timestamp() >= claims.exp {
            return Err(AuthError::InvalidToken);
        }

        if claims.typ != required_kind {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
