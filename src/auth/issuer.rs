//! Token issuance orchestration: register, login, refresh, and the
//! federated-callback path.

use std::sync::Arc;

use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::PasswordHasher;
use crate::auth::token::{TokenClaims, TokenCodec, TokenKind};
use crate::oidc::IdentityBridge;
use crate::store::{Credential, CredentialStore, NewCredential, ProfileFields};
use crate::types::{AuthError, Result, Role, TokenPair};

/// Issues access/refresh token pairs. The only component that touches both
/// the credential store and the codec; request gating never goes through it.
pub struct TokenIssuer {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: Arc<TokenCodec>,
    bridge: Option<Arc<dyn IdentityBridge>>,
    access_ttl: i64,
    refresh_ttl: i64,
    password_min_length: usize,
}

impl TokenIssuer {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        bridge: Option<Arc<dyn IdentityBridge>>,
        access_ttl: i64,
        refresh_ttl: i64,
        password_min_length: usize,
    ) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
            codec,
            bridge,
            access_ttl,
            refresh_ttl,
            password_min_length,
        }
    }

    /// Create a credential with role `user` and mint its first token pair.
    /// Credential and profile are persisted as one unit by the store.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        profile: ProfileFields,
    ) -> Result<TokenPair> {
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidRequest("email is required".to_string()));
        }
        if username.is_empty() {
            return Err(AuthError::InvalidRequest("username is required".to_string()));
        }
        if password.chars().count() < self.password_min_length {
            return Err(AuthError::WeakPassword);
        }

        let password_hash = self.hasher.hash(password)?;

        let credential = self
            .store
            .create(NewCredential {
                email: email.to_string(),
                username: username.to_string(),
                password_hash,
                role: Role::User,
                is_active: true,
                subject: None,
                profile,
            })
            .await?;

        info!(user_id = %credential.id, "registered new credential");
        self.mint_pair(&credential.id, credential.role)
    }

    /// Password login. Unknown email and wrong password are deliberately
    /// indistinguishable; the inactive check runs only after the password
    /// has verified, so inactive accounts are not enumerable either.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let mut credential = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .hasher
            .verify(password, &credential.password_hash, &credential.id)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        if !credential.is_active {
            return Err(AuthError::AccountInactive);
        }

        self.record_login(&mut credential).await;

        info!(user_id = %credential.id, "login succeeded");
        self.mint_pair(&credential.id, credential.role)
    }

    /// Mint a fresh pair from a refresh token. Subject and role are carried
    /// over from the presented token's claims without re-reading the store,
    /// so a role change propagates only once outstanding refresh tokens
    /// expire (bounded by the refresh TTL). The presented token stays valid
    /// until its own expiry; there is no rotation blacklist.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.codec.verify(refresh_token, TokenKind::Refresh)?;

        info!(user_id = %claims.sub, "refreshed token pair");
        self.mint_pair(&claims.sub, claims.role)
    }

    /// Browser-redirect target for the federated login leg, with a fresh
    /// random `state` token per call.
    pub fn federated_login_url(&self) -> Result<String> {
        let bridge = self.bridge.as_ref().ok_or(AuthError::NotFound)?;
        Ok(bridge.authorization_url(&random_urlsafe(32)))
    }

    /// Exchange an authorization code for an external identity, then link
    /// to an existing credential or create one, and mint a pair. Linking
    /// prefers the federated subject; an email match records the subject on
    /// the credential for next time.
    pub async fn federated_callback(&self, code: &str) -> Result<TokenPair> {
        let bridge = self.bridge.as_ref().ok_or(AuthError::NotFound)?;
        let identity = bridge.exchange_code(code).await?;

        let mut credential = match self.store.find_by_subject(&identity.subject).await? {
            Some(found) => found,
            None => match self.store.find_by_email(&identity.email).await? {
                Some(mut found) => {
                    found.subject = Some(identity.subject.clone());
                    self.store.update(&found).await?;
                    info!(user_id = %found.id, "linked federated subject to credential");
                    found
                }
                None => self.create_federated(&identity).await?,
            },
        };

        if !credential.is_active {
            return Err(AuthError::AccountInactive);
        }

        self.record_login(&mut credential).await;

        info!(user_id = %credential.id, "federated login succeeded");
        self.mint_pair(&credential.id, credential.role)
    }

    async fn create_federated(
        &self,
        identity: &crate::oidc::ExternalIdentity,
    ) -> Result<Credential> {
        // The account is federated-only: the stored hash is random and
        // unusable, so password login cannot succeed against it.
        let unusable = self.hasher.hash(&random_urlsafe(48))?;

        let base = identity
            .email
            .split('@')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("user")
            .to_string();
        let username = if self.store.find_by_username(&base).await?.is_some() {
            format!("{}-{}", base, &Uuid::new_v4().to_string()[..8])
        } else {
            base
        };

        let credential = self
            .store
            .create(NewCredential {
                email: identity.email.clone(),
                username,
                password_hash: unusable,
                role: Role::User,
                is_active: true,
                subject: Some(identity.subject.clone()),
                profile: ProfileFields::default(),
            })
            .await?;

        info!(user_id = %credential.id, "created credential from federated identity");
        Ok(credential)
    }

    /// Best-effort `last_login_at` update. Concurrent logins race on this
    /// field; last-writer-wins is acceptable and a write failure must not
    /// fail the login itself.
    async fn record_login(&self, credential: &mut Credential) {
        credential.last_login_at = Some(Utc::now());
        if let Err(e) = self.store.update(credential).await {
            warn!(user_id = %credential.id, error = %e, "failed to record login time");
        }
    }

    fn mint_pair(&self, subject: &str, role: Role) -> Result<TokenPair> {
        let access = TokenClaims::new(subject, role, TokenKind::Access, self.access_ttl);
        let refresh = TokenClaims::new(subject, role, TokenKind::Refresh, self.refresh_ttl);

        Ok(TokenPair {
            access_token: self.codec.sign(&access)?,
            refresh_token: self.codec.sign(&refresh)?,
            expires_in: self.access_ttl,
        })
    }
}

fn random_urlsafe(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, MockCredentialStore};

    const SECRET: &[u8] = b"issuer-test-secret-32-bytes-or-more!!!!!";

    fn issuer_over(store: Arc<dyn CredentialStore>) -> TokenIssuer {
        TokenIssuer::new(store, Arc::new(TokenCodec::new(SECRET)), None, 900, 604800, 8)
    }

    fn issuer() -> (TokenIssuer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (issuer_over(store.clone()), store)
    }

    #[tokio::test]
    async fn register_then_login_with_matching_role() {
        let (issuer, _) = issuer();

        let pair = issuer
            .register("alice@x.com", "alice", "Secret123!", ProfileFields::default())
            .await
            .unwrap();
        assert!(pair.expires_in > 0);

        let login_pair = issuer.login("alice@x.com", "Secret123!").await.unwrap();
        let codec = TokenCodec::new(SECRET);
        let claims = codec
            .verify(&login_pair.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn register_duplicate_email_conflicts() {
        let (issuer, _) = issuer();
        issuer
            .register("alice@x.com", "alice", "Secret123!", ProfileFields::default())
            .await
            .unwrap();

        let err = issuer
            .register("alice@x.com", "alice2", "Secret123!", ProfileFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AlreadyExists));
    }

    #[tokio::test]
    async fn register_short_password_is_weak() {
        let (issuer, _) = issuer();

        let err = issuer
            .register("a@x.com", "a", "short", ProfileFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let (issuer, _) = issuer();
        issuer
            .register("alice@x.com", "alice", "Secret123!", ProfileFields::default())
            .await
            .unwrap();

        let unknown = issuer.login("ghost@x.com", "Secret123!").await.unwrap_err();
        let wrong = issuer.login("alice@x.com", "wrong-pass").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn inactive_account_with_correct_password() {
        let (issuer, store) = issuer();
        issuer
            .register("alice@x.com", "alice", "Secret123!", ProfileFields::default())
            .await
            .unwrap();

        let mut cred = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        cred.is_active = false;
        store.update(&cred).await.unwrap();

        // Correct password on a deactivated account is a distinct category,
        // but a wrong password still reads as invalid credentials.
        let err = issuer.login("alice@x.com", "Secret123!").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountInactive));

        let err = issuer.login("alice@x.com", "wrong-pass").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_records_last_login_time() {
        let (issuer, store) = issuer();
        issuer
            .register("alice@x.com", "alice", "Secret123!", ProfileFields::default())
            .await
            .unwrap();
        issuer.login("alice@x.com", "Secret123!").await.unwrap();

        let cred = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert!(cred.last_login_at.is_some());
    }

    #[tokio::test]
    async fn refresh_mints_pair_for_same_subject_and_role() {
        let (issuer, store) = issuer();
        let pair = issuer
            .register("alice@x.com", "alice", "Secret123!", ProfileFields::default())
            .await
            .unwrap();

        let refreshed = issuer.refresh(&pair.refresh_token).await.unwrap();

        let codec = TokenCodec::new(SECRET);
        let old = codec.verify(&pair.access_token, TokenKind::Access).unwrap();
        let new = codec
            .verify(&refreshed.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(old.sub, new.sub);
        assert_eq!(old.role, new.role);

        let cred = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(cred.id, new.sub);
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() {
        let (issuer, _) = issuer();
        let pair = issuer
            .register("alice@x.com", "alice", "Secret123!", ProfileFields::default())
            .await
            .unwrap();

        let err = issuer.refresh(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn corrupt_stored_hash_surfaces_as_corrupt_credential() {
        let store = Arc::new(MemoryStore::new());
        store
            .create(NewCredential {
                email: "broken@x.com".to_string(),
                username: "broken".to_string(),
                password_hash: "garbage-not-phc".to_string(),
                role: Role::User,
                is_active: true,
                subject: None,
                profile: ProfileFields::default(),
            })
            .await
            .unwrap();

        let issuer = issuer_over(store);
        let err = issuer.login("broken@x.com", "whatever1").await.unwrap_err();
        assert!(matches!(err, AuthError::CorruptCredential(_)));
    }

    #[tokio::test]
    async fn federated_paths_without_bridge_are_not_found() {
        let (issuer, _) = issuer();

        assert!(matches!(
            issuer.federated_login_url().unwrap_err(),
            AuthError::NotFound
        ));
        assert!(matches!(
            issuer.federated_callback("code").await.unwrap_err(),
            AuthError::NotFound
        ));
    }

    #[tokio::test]
    async fn store_failure_on_register_propagates() {
        let mut mock = MockCredentialStore::new();
        mock.expect_create()
            .returning(|_| Err(AuthError::Store("connection refused".to_string())));

        let issuer = issuer_over(Arc::new(mock));
        let err = issuer
            .register("a@x.com", "a", "Secret123!", ProfileFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }

    #[tokio::test]
    async fn login_survives_last_login_write_failure() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("Secret123!").unwrap();
        let cred = Credential {
            id: "user-1".to_string(),
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            password_hash: hash,
            role: Role::User,
            is_active: true,
            subject: None,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut mock = MockCredentialStore::new();
        let stored = cred.clone();
        mock.expect_find_by_email()
            .returning(move |_| Ok(Some(stored.clone())));
        mock.expect_update()
            .returning(|_| Err(AuthError::Store("write failed".to_string())));

        let issuer = issuer_over(Arc::new(mock));
        // The pair still comes back; the write failure is only logged.
        issuer.login("a@x.com", "Secret123!").await.unwrap();
    }
}
