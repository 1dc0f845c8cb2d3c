//! libsql/SQLite credential store.

use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row};

use super::{Credential, CredentialStore, NewCredential};
use crate::types::{AuthError, Result};
use async_trait::async_trait;

/// Durable local store backed by a libsql database file.
pub struct LibsqlStore {
    db: Database,
}

impl LibsqlStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AuthError::Store(format!("failed to open database: {}", e)))?;

        let store = Self { db };
        store.initialize_schema().await?;

        Ok(store)
    }

    fn connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| AuthError::Store(format!("failed to get connection: {}", e)))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                is_active INTEGER NOT NULL,
                subject TEXT,
                last_login_at INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AuthError::Store(format!("failed to create users table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                first_name TEXT,
                last_name TEXT,
                display_name TEXT,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
            (),
        )
        .await
        .map_err(|e| AuthError::Store(format!("failed to create profiles table: {}", e)))?;

        Ok(())
    }

    async fn find_one(&self, sql: &str, param: &str) -> Result<Option<Credential>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(sql, [param])
            .await
            .map_err(|e| AuthError::Store(format!("failed to query credential: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?
        {
            Some(row) => Ok(Some(row_to_credential(&row)?)),
            None => Ok(None),
        }
    }
}

const CREDENTIAL_COLUMNS: &str =
    "id, email, username, password_hash, role, is_active, subject, last_login_at, \
     created_at, updated_at";

fn row_to_credential(row: &Row) -> Result<Credential> {
    let store_err = |e: libsql::Error| AuthError::Store(e.to_string());

    let role_str: String = row.get(4).map_err(store_err)?;
    let last_login_at: Option<i64> = row.get(7).map_err(store_err)?;

    Ok(Credential {
        id: row.get(0).map_err(store_err)?,
        email: row.get(1).map_err(store_err)?,
        username: row.get(2).map_err(store_err)?,
        password_hash: row.get(3).map_err(store_err)?,
        role: role_str.parse()?,
        is_active: row.get::<i64>(5).map_err(store_err)? != 0,
        subject: row.get(6).map_err(store_err)?,
        last_login_at: last_login_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        created_at: timestamp(row.get::<i64>(8).map_err(store_err)?)?,
        updated_at: timestamp(row.get::<i64>(9).map_err(store_err)?)?,
    })
}

fn timestamp(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| AuthError::Store(format!("timestamp {} out of range", ts)))
}

fn is_unique_violation(err: &libsql::Error) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

#[async_trait]
impl CredentialStore for LibsqlStore {
    async fn create(&self, new: NewCredential) -> Result<Credential> {
        let conn = self.connection()?;
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();

        // Credential and profile land in one transaction.
        let tx = conn
            .transaction()
            .await
            .map_err(|e| AuthError::Store(format!("failed to begin transaction: {}", e)))?;

        tx.execute(
            "INSERT INTO users (id, email, username, password_hash, role, is_active, subject, \
             last_login_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)",
            (
                id.as_str(),
                new.email.as_str(),
                new.username.as_str(),
                new.password_hash.as_str(),
                new.role.as_str(),
                new.is_active as i64,
                new.subject.clone(),
                now.timestamp(),
                now.timestamp(),
            ),
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::AlreadyExists
            } else {
                AuthError::Store(format!("failed to create credential: {}", e))
            }
        })?;

        tx.execute(
            "INSERT INTO profiles (user_id, first_name, last_name, display_name)
             VALUES (?, ?, ?, ?)",
            (
                id.as_str(),
                new.profile.first_name.clone(),
                new.profile.last_name.clone(),
                new.profile.display_name.clone(),
            ),
        )
        .await
        .map_err(|e| AuthError::Store(format!("failed to create profile: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AuthError::Store(format!("failed to commit: {}", e)))?;

        Ok(Credential {
            id,
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            is_active: new.is_active,
            subject: new.subject,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Credential>> {
        self.find_one(
            &format!("SELECT {} FROM users WHERE id = ?", CREDENTIAL_COLUMNS),
            id,
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        self.find_one(
            &format!("SELECT {} FROM users WHERE email = ?", CREDENTIAL_COLUMNS),
            email,
        )
        .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>> {
        self.find_one(
            &format!("SELECT {} FROM users WHERE username = ?", CREDENTIAL_COLUMNS),
            username,
        )
        .await
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Option<Credential>> {
        self.find_one(
            &format!("SELECT {} FROM users WHERE subject = ?", CREDENTIAL_COLUMNS),
            subject,
        )
        .await
    }

    async fn update(&self, credential: &Credential) -> Result<()> {
        let conn = self.connection()?;

        let affected = conn
            .execute(
                "UPDATE users SET is_active = ?, subject = ?, last_login_at = ?, updated_at = ?
                 WHERE id = ?",
                (
                    credential.is_active as i64,
                    credential.subject.clone(),
                    credential.last_login_at.map(|t| t.timestamp()),
                    Utc::now().timestamp(),
                    credential.id.as_str(),
                ),
            )
            .await
            .map_err(|e| AuthError::Store(format!("failed to update credential: {}", e)))?;

        if affected == 0 {
            return Err(AuthError::NotFound);
        }

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Credential>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM users ORDER BY created_at ASC",
                    CREDENTIAL_COLUMNS
                ),
                (),
            )
            .await
            .map_err(|e| AuthError::Store(format!("failed to list credentials: {}", e)))?;

        let mut all = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?
        {
            all.push(row_to_credential(&row)?);
        }

        Ok(all)
    }
}
