//! # stockwise-db: Store Layer for StockWise
//!
//! Cached repositories over SQLite, plus report assembly and stock
//! movements. Uses sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockWise Data Flow                              │
//! │                                                                         │
//! │  Caller (form, CLI, seed binary)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockwise-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Inventory   │    │  Repositories │    │   Database   │  │   │
//! │  │   │ (context.rs)  │───►│ cache + store │───►│  (pool.rs)   │  │   │
//! │  │   │ reports()     │    │ ProductRepo   │    │  SqlitePool  │  │   │
//! │  │   │ record_mvmt() │    │ SupplierRepo  │    │  migrations  │  │   │
//! │  │   └───────────────┘    │ TransactionRe │    └──────────────┘  │   │
//! │  │                        └───────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   $STOCKWISE_DB_URL (default ./stockwise.db)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Store configuration from the environment
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded migrations and column reconciliation
//! - [`error`] - Store error types
//! - [`repository`] - Store adapters and cached repositories
//! - [`context`] - The `Inventory` application context
//! - [`movement`] - Atomic stock movements
//! - [`report`] - Report assembly over the analytics visitors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockwise_db::{Inventory, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let inventory = Inventory::connect(&config).await?;
//!
//! let low = inventory.reports().build_low_stock_report().await;
//! let value = inventory.reports().build_valuation_report().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod context;
pub mod error;
pub mod migrations;
pub mod movement;
pub mod pool;
pub mod report;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StoreConfig};
pub use context::Inventory;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use report::ReportAssembler;

// Repository re-exports for convenience
pub use repository::{
    generate_id, CachedRepository, EntityStore, ProductRepository, ProductStore, Record,
    SupplierRepository, SupplierStore, TransactionRepository, TransactionStore,
};
