//! # Store Configuration
//!
//! Reads the store location and credentials from the environment.
//!
//! ## Variables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Variable                       Default          Notes                  │
//! │  ─────────────────────────────  ───────────────  ─────────────────────  │
//! │  STOCKWISE_DB_URL               stockwise.db     path or sqlite:// URL  │
//! │  STOCKWISE_DB_USER              stockwise        principal              │
//! │  STOCKWISE_DB_PASSWORD          (none)           REQUIRED               │
//! │  STOCKWISE_DB_MAX_CONNECTIONS   5                pool size              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The credential is never hard-coded. Startup fails when it is missing.

use std::env;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::pool::DbConfig;

pub const ENV_DB_URL: &str = "STOCKWISE_DB_URL";
pub const ENV_DB_USER: &str = "STOCKWISE_DB_USER";
pub const ENV_DB_PASSWORD: &str = "STOCKWISE_DB_PASSWORD";
pub const ENV_DB_MAX_CONNECTIONS: &str = "STOCKWISE_DB_MAX_CONNECTIONS";

const DEFAULT_DB_URL: &str = "stockwise.db";
const DEFAULT_DB_USER: &str = "stockwise";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// Errors
// =============================================================================

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The credential variable is unset or empty.
    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

// =============================================================================
// Store Config
// =============================================================================

/// Connection string, principal and credential for the durable store.
#[derive(Clone)]
pub struct StoreConfig {
    pub url: String,
    pub user: String,
    password: String,
    pub max_connections: u32,
}

impl StoreConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Lets tests supply variables without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let password = lookup(ENV_DB_PASSWORD)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingCredential(ENV_DB_PASSWORD))?;

        let url = lookup(ENV_DB_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_URL.to_string());

        let user = lookup(ENV_DB_USER)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_USER.to_string());

        let max_connections = match lookup(ENV_DB_MAX_CONNECTIONS) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_DB_MAX_CONNECTIONS,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(StoreConfig {
            url,
            user,
            password,
            max_connections,
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Filesystem path of the SQLite database, with any `sqlite:` scheme
    /// and query string stripped.
    pub fn database_path(&self) -> PathBuf {
        let path = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))
            .unwrap_or(&self.url);
        let path = path.split('?').next().unwrap_or(path);
        PathBuf::from(path)
    }

    /// Pool configuration for this store.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path()).max_connections(self.max_connections)
    }
}

// The credential stays out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"***")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
