//! Credential store abstraction.
//!
//! The issuance core never runs raw storage queries; everything goes through
//! the [`CredentialStore`] trait. Two implementations ship: an in-memory
//! store for tests and development, and a libsql/SQLite store for durable
//! local deployments, selected by [`StoreProvider`] at startup.

mod libsql;
mod memory;

pub use libsql::LibsqlStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::types::{Result, Role};

/// A stored identity record. Owned by the credential store; the issuance
/// core mutates only `last_login_at` (on login) and the federated `subject`
/// link (on first federated match). The admin surface flips `is_active`.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    /// Federated identity-provider subject, when this account is linked.
    pub subject: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional profile data captured at registration and persisted together
/// with the credential in one atomic create.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
}

/// Input to [`CredentialStore::create`]. Credential and profile travel as a
/// single unit so the adapter can persist both inside one transactional
/// boundary; no orphaned-credential state can exist.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub subject: Option<String>,
    pub profile: ProfileFields,
}

/// Abstract trait for credential persistence.
///
/// `create` must reject duplicate email or username with
/// [`AuthError::AlreadyExists`](crate::types::AuthError::AlreadyExists) and
/// persist credential + profile atomically. `update` covers the mutable
/// fields this system writes: `is_active`, `subject`, `last_login_at`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new credential (with profile) and return the stored record.
    async fn create(&self, new: NewCredential) -> Result<Credential>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Credential>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>>;

    /// Look up by federated identity-provider subject.
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Credential>>;

    /// Write back the mutable fields of an existing record.
    async fn update(&self, credential: &Credential) -> Result<()>;

    /// All records, for the admin surface. Public views are projected by
    /// the caller; this returns full records.
    async fn list_all(&self) -> Result<Vec<Credential>>;
}

/// Store backend selection.
#[derive(Debug, Clone, Default)]
pub enum StoreProvider {
    /// In-memory store (ephemeral, lost on restart).
    #[default]
    Memory,
    /// File-based SQLite store via libsql.
    Sqlite {
        /// Path to the database file.
        path: String,
    },
}

impl StoreProvider {
    /// Map a config database URL onto a provider. `:memory:` selects the
    /// in-memory store; anything else is treated as a file path.
    pub fn from_url(url: &str) -> Self {
        if url == ":memory:" {
            StoreProvider::Memory
        } else {
            StoreProvider::Sqlite {
                path: url.to_string(),
            }
        }
    }

    /// Connect and return a shared store handle.
    pub async fn connect(&self) -> Result<Arc<dyn CredentialStore>> {
        match self {
            StoreProvider::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreProvider::Sqlite { path } => {
                let store = LibsqlStore::new_local(path).await?;
                Ok(Arc::new(store))
            }
        }
    }
}
