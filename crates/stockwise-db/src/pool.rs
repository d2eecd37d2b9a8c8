//! # Store Connection
//!
//! Opens the SQLite store every repository shares and brings its schema up
//! to date before any cache loads.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreConfig (env, credential required)                                │
//! │       │ db_config()                                                     │
//! │       ▼                                                                 │
//! │  DbConfig ──► Database::new                                            │
//! │                 ├── open file (created if missing), foreign_keys = ON  │
//! │                 ├── SqlitePool (max_connections)                       │
//! │                 └── migrations ─► column reconciliation               │
//! │                                 └► delete-policy check                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database (clone per store adapter, one pool)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! File stores run in WAL mode so report snapshots can read while a writer
//! holds a repository lock. An in-memory store lives inside its single
//! connection, so that connection is never reaped.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{DbError, DbResult};
use crate::migrations;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the store lives and how the pool around it behaves.
///
/// Usually derived from [`StoreConfig::db_config`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file path, or `:memory:`.
    pub database_path: PathBuf,

    pub max_connections: u32,

    /// How long a store call waits for a free connection.
    pub acquire_timeout: Duration,

    /// `None` keeps idle connections open for the life of the pool.
    pub idle_timeout: Option<Duration>,

    /// `None` never retires a connection by age.
    pub max_lifetime: Option<Duration>,

    /// Apply migrations and reconciliation on open.
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed store at `path`, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Skips schema work on open. Used to stage tables the way older
    /// releases left them before reconciling.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Private in-memory store, gone when the pool closes.
    ///
    /// Every connection to `:memory:` opens a fresh empty database, so the
    /// pool holds exactly one connection and never recycles it.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            max_lifetime: None,
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle on the shared store. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the store described by `config`.
    ///
    /// This is the unchecked entry point: it takes no credential. Startup
    /// code goes through [`Database::connect`] (or `Inventory::connect`),
    /// which cannot be reached without a [`StoreConfig`]. `new` is for
    /// tests and for embedders that already own their store file.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening store");

        let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let mut options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .foreign_keys(true)
            .create_if_missing(true);

        if !config.is_in_memory() {
            // Durable across process crashes; the last commit may be lost
            // on power failure.
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Opens the store named by the environment configuration.
    ///
    /// SQLite has no login, so the credential only gates startup:
    /// `StoreConfig` cannot be built without it.
    pub async fn connect(config: &StoreConfig) -> DbResult<Self> {
        info!(url = %config.url, user = %config.user, "Connecting to store");
        Self::new(config.db_config()).await
    }

    /// Brings the schema up to date.
    ///
    /// Applies pending migrations, adds columns older tables lack, then
    /// reports tables whose product references still cascade on delete.
    /// Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        migrations::reconcile_columns(&self.pool).await?;
        migrations::cascading_product_references(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every connection. Store calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing store");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
