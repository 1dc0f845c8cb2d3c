//! TOML-based configuration for AEGIS.
//!
//! Secrets use env-var indirection: the file names the variable, never the
//! value. Everything is resolved once at startup; there is no file watching
//! or hot reload, and the signing secret rotates only via redeploy.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from `aegis.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AegisConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Federated identity provider; absent means the bridge is disabled.
    #[serde(default)]
    pub federated: Option<FederatedConfig>,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request-wide timeout; propagates cancellation into store and bridge
    /// calls so a slow backend cannot pin request capacity.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the token signing secret.
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Access-token TTL in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl: i64,

    /// Refresh-token TTL in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl: i64,

    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

fn default_jwt_secret_env() -> String {
    "AEGIS_JWT_SECRET".to_string()
}

fn default_access_ttl() -> i64 {
    900
}

fn default_refresh_ttl() -> i64 {
    604800
}

fn default_password_min_length() -> usize {
    8
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            access_token_ttl: default_access_ttl(),
            refresh_token_ttl: default_refresh_ttl(),
            password_min_length: default_password_min_length(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path; `:memory:` selects the in-memory store.
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "./data/aegis.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

// ============= Federated Identity Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedConfig {
    pub issuer_url: String,

    pub client_id: String,

    /// Environment variable name containing the client secret.
    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,

    pub redirect_url: String,
}

fn default_client_secret_env() -> String {
    "AEGIS_OIDC_CLIENT_SECRET".to_string()
}

// ============= Loading & Validation =============

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl AegisConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AegisConfig = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Load from the given path, or fall back to defaults when the file does
    /// not exist. Defaults are still validated (the secret env var must be
    /// set either way).
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Validate internal consistency and env-var availability.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if !KNOWN_LOG_LEVELS.contains(&self.server.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown log level '{}'",
                self.server.log_level
            )));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "server.request_timeout_secs must be positive".to_string(),
            ));
        }

        if self.auth.access_token_ttl <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.access_token_ttl must be strictly positive".to_string(),
            ));
        }
        if self.auth.refresh_token_ttl <= self.auth.access_token_ttl {
            return Err(ConfigError::ValidationError(
                "auth.refresh_token_ttl must exceed auth.access_token_ttl".to_string(),
            ));
        }

        let secret = self.jwt_secret()?;
        if secret.len() < 32 {
            return Err(ConfigError::ValidationError(
                "signing secret must be at least 32 bytes".to_string(),
            ));
        }

        if let Some(ref federated) = self.federated {
            if federated.issuer_url.is_empty() || federated.client_id.is_empty() {
                return Err(ConfigError::ValidationError(
                    "federated.issuer_url and federated.client_id are required".to_string(),
                ));
            }
            self.resolve_env(&federated.client_secret_env)?;
        }

        Ok(())
    }

    fn resolve_env(&self, name: &str) -> Result<String, ConfigError> {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(name.to_string())),
        }
    }

    /// The token signing secret, resolved from the environment.
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
    }

    /// The federated client secret, when a bridge is configured.
    pub fn federated_client_secret(&self) -> Result<Option<String>, ConfigError> {
        match self.federated {
            Some(ref f) => Ok(Some(self.resolve_env(&f.client_secret_env)?)),
            None => Ok(None),
        }
    }
}

/// Short SHA-256 fingerprint of a secret, safe to log at startup for deploy
/// diagnostics (never the secret itself).
pub fn secret_fingerprint(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    hex::encode(&digest[..4])
}
