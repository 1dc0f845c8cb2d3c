//! Federated identity bridge.
//!
//! The [`IdentityBridge`] trait is the contract boundary: exchange an
//! authorization code for a verified `{subject, email}` assertion, plus the
//! browser-redirect URL for the login leg. [`OidcBridge`] is the shipped
//! reference implementation against an OIDC-shaped provider; the deep
//! protocol stays outside the issuance core's correctness surface.

use async_trait::async_trait;
use serde::Deserialize;

use crate::types::{AuthError, Result};

/// Verified external identity returned by a code exchange.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    /// Provider-scoped stable subject identifier.
    pub subject: String,
    pub email: String,
}

/// External collaborator contract for federated login.
#[async_trait]
pub trait IdentityBridge: Send + Sync {
    /// Redirect target for the browser leg, carrying the given `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a verified identity.
    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity>;
}

/// Settings for [`OidcBridge`], resolved from config at startup.
#[derive(Debug, Clone)]
pub struct OidcSettings {
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

/// reqwest-backed bridge: code → token endpoint → userinfo endpoint.
pub struct OidcBridge {
    http: reqwest::Client,
    settings: OidcSettings,
}

#[derive(Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfoResponse {
    sub: String,
    email: String,
}

impl OidcBridge {
    pub fn new(settings: OidcSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!(
            "{}/protocol/openid-connect/{}",
            self.settings.issuer_url.trim_end_matches('/'),
            suffix
        )
    }
}

#[async_trait]
impl IdentityBridge for OidcBridge {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&scope=openid%20email&redirect_uri={}&state={}",
            self.endpoint("auth"),
            self.settings.client_id,
            self.settings.redirect_url,
            state
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity> {
        let token: TokenEndpointResponse = self
            .http
            .post(self.endpoint("token"))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("redirect_uri", self.settings.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::ExchangeFailed(format!("token request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AuthError::ExchangeFailed(format!("token endpoint rejected code: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::ExchangeFailed(format!("bad token response: {}", e)))?;

        let info: UserInfoResponse = self
            .http
            .get(self.endpoint("userinfo"))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AuthError::ExchangeFailed(format!("userinfo request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AuthError::ExchangeFailed(format!("userinfo rejected token: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::ExchangeFailed(format!("bad userinfo response: {}", e)))?;

        Ok(ExternalIdentity {
            subject: info.sub,
            email: info.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> OidcBridge {
        OidcBridge::new(OidcSettings {
            issuer_url: "https://id.example.com/realms/main".to_string(),
            client_id: "aegis".to_string(),
            client_secret: "s3cret".to_string(),
            redirect_url: "http://localhost:3000/api/v1/auth/federated/callback".to_string(),
        })
    }

    #[test]
    fn authorization_url_carries_client_and_state() {
        let url = bridge().authorization_url("xyzzy");

        assert!(url.starts_with(
            "https://id.example.com/realms/main/protocol/openid-connect/auth?client_id=aegis"
        ));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=xyzzy"));
    }

    #[test]
    fn trailing_slash_on_issuer_is_tolerated() {
        let bridge = OidcBridge::new(OidcSettings {
            issuer_url: "https://id.example.com/realms/main/".to_string(),
            client_id: "aegis".to_string(),
            client_secret: "s3cret".to_string(),
            redirect_url: "http://localhost:3000/cb".to_string(),
        });

        assert!(!bridge.endpoint("token").contains("//protocol"));
    }
}
