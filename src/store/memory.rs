//! In-memory credential store for tests and development.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::{Credential, CredentialStore, NewCredential, ProfileFields};
use crate::types::{AuthError, Result};
use async_trait::async_trait;

#[derive(Default)]
struct Inner {
    records: HashMap<String, Credential>,
    profiles: HashMap<String, ProfileFields>,
}

/// HashMap-backed store. Uniqueness is enforced under the single write
/// lock, which also makes credential + profile creation trivially atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_where<F>(&self, pred: F) -> Option<Credential>
    where
        F: Fn(&Credential) -> bool,
    {
        self.inner.read().records.values().find(|c| pred(c)).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create(&self, new: NewCredential) -> Result<Credential> {
        let mut inner = self.inner.write();

        let duplicate = inner
            .records
            .values()
            .any(|c| c.email == new.email || c.username == new.username);
        if duplicate {
            return Err(AuthError::AlreadyExists);
        }

        let now = Utc::now();
        let credential = Credential {
            id: Uuid::new_v4().to_string(),
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            is_active: new.is_active,
            subject: new.subject,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        inner.profiles.insert(credential.id.clone(), new.profile);
        inner
            .records
            .insert(credential.id.clone(), credential.clone());

        Ok(credential)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Credential>> {
        Ok(self.inner.read().records.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        Ok(self.find_where(|c| c.email == email))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>> {
        Ok(self.find_where(|c| c.username == username))
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Option<Credential>> {
        Ok(self.find_where(|c| c.subject.as_deref() == Some(subject)))
    }

    async fn update(&self, credential: &Credential) -> Result<()> {
        let mut inner = self.inner.write();

        let record = inner
            .records
            .get_mut(&credential.id)
            .ok_or(AuthError::NotFound)?;

        record.is_active = credential.is_active;
        record.subject = credential.subject.clone();
        record.last_login_at = credential.last_login_at;
        record.updated_at = Utc::now();

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Credential>> {
        let mut all: Vec<Credential> = self.inner.read().records.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }
}
