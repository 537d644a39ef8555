//! TOML-based configuration for the account server
//!
//! Settings come from `account.toml`; a handful of deployment environment
//! variables override the file:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `APPLICATION_NAME` | `auth.issuer` |
//! | `LOGIN_EXPIRATION_DURATION` | `auth.token_expiry_secs` (`3600`, `90s`, `15m`, `24h`) |
//! | `DATABASE_URL` | `database.url` |

use crate::auth::jwt::TokenKeys;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_APPLICATION_NAME: &str = "APPLICATION_NAME";
pub const ENV_LOGIN_EXPIRATION_DURATION: &str = "LOGIN_EXPIRATION_DURATION";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Upper bound for `auth.token_expiry_secs`: ten years.
pub const MAX_TOKEN_EXPIRY_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Root configuration structure loaded from account.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// `iss` claim of issued tokens
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Token lifetime in seconds
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: i64,

    /// PEM encoded RSA private key used for signing
    #[serde(default = "default_private_key_path")]
    pub private_key_path: PathBuf,

    /// PEM encoded RSA public key used for verification
    #[serde(default = "default_public_key_path")]
    pub public_key_path: PathBuf,

    /// bcrypt work factor
    #[serde(default = "default_password_cost")]
    pub password_cost: u32,
}

fn default_issuer() -> String {
    "account-server".to_string()
}

fn default_token_expiry() -> i64 {
    86400
}

fn default_private_key_path() -> PathBuf {
    PathBuf::from("cert/id_rsa")
}

fn default_public_key_path() -> PathBuf {
    PathBuf::from("cert/id_rsa.pub")
}

fn default_password_cost() -> u32 {
    crate::auth::password::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            token_expiry_secs: default_token_expiry(),
            private_key_path: default_private_key_path(),
            public_key_path: default_public_key_path(),
            password_cost: default_password_cost(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "./data/account.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid value for environment variable '{0}': {1}")]
    InvalidEnvVar(String, String),

    #[error("Failed to read key file {0}")]
    KeyFile(std::io::Error),
}

impl AccountConfig {
    /// Load configuration from a TOML file, apply environment overrides and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config: AccountConfig = toml::from_str(&content)?;

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(issuer) = lookup(ENV_APPLICATION_NAME) {
            self.auth.issuer = issuer;
        }

        if let Some(raw) = lookup(ENV_LOGIN_EXPIRATION_DURATION) {
            self.auth.token_expiry_secs = parse_duration_secs(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar(ENV_LOGIN_EXPIRATION_DURATION.to_string(), raw.clone())
            })?;
        }

        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database.url = url;
        }

        Ok(())
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host must not be empty".to_string(),
            ));
        }

        if self.auth.issuer.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.issuer must not be empty".to_string(),
            ));
        }

        if !(1..=MAX_TOKEN_EXPIRY_SECS).contains(&self.auth.token_expiry_secs) {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_expiry_secs must be between 1 and {}, got {}",
                MAX_TOKEN_EXPIRY_SECS, self.auth.token_expiry_secs
            )));
        }

        if !(4..=31).contains(&self.auth.password_cost) {
            return Err(ConfigError::ValidationError(format!(
                "auth.password_cost must be between 4 and 31, got {}",
                self.auth.password_cost
            )));
        }

        Ok(())
    }

    /// Reads both PEM files. A missing or unreadable file is fatal.
    pub fn load_token_keys(&self) -> Result<TokenKeys, ConfigError> {
        TokenKeys::from_files(&self.auth.private_key_path, &self.auth.public_key_path)
            .map_err(ConfigError::KeyFile)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Parses `"90"`, `"90s"`, `"15m"` or `"24h"` into seconds.
pub fn parse_duration_secs(s: &str) -> Option<i64> {
    let s = s.trim().to_lowercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .and_then(|n| n.checked_mul(multiplier))
}
