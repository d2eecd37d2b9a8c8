//! # Inventory Context
//!
//! Owns one repository per entity type, built once at startup and passed
//! around by reference.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Inventory                                                             │
//! │  ├── db: Database ─────────────── shared pool                          │
//! │  ├── products:     ProductRepository     ── ProductStore(db)           │
//! │  ├── suppliers:    SupplierRepository    ── SupplierStore(db)          │
//! │  └── transactions: TransactionRepository ── TransactionStore(db)       │
//! │                                                                         │
//! │  inventory.reports()          → ReportAssembler                        │
//! │  inventory.record_movement()  → transaction + stock delta, one commit  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::config::StoreConfig;
use crate::error::DbResult;
use crate::pool::Database;
use crate::report::ReportAssembler;
use crate::repository::{
    ProductRepository, ProductStore, SupplierRepository, SupplierStore, TransactionRepository,
    TransactionStore,
};

/// Application context holding every repository.
pub struct Inventory {
    db: Database,
    products: ProductRepository,
    suppliers: SupplierRepository,
    transactions: TransactionRepository,
}

impl Inventory {
    /// Builds every repository over `db`, loading each cache.
    ///
    /// Products load first so a failure surfaces before dependent data.
    /// No credential is checked here; startup goes through
    /// [`Inventory::connect`].
    pub async fn load(db: Database) -> DbResult<Self> {
        let products = ProductRepository::new(ProductStore::new(db.clone())).await?;
        let suppliers = SupplierRepository::new(SupplierStore::new(db.clone())).await?;
        let transactions = TransactionRepository::new(TransactionStore::new(db.clone())).await?;

        info!(
            products = products.len().await,
            suppliers = suppliers.len().await,
            transactions = transactions.len().await,
            "Inventory loaded"
        );

        Ok(Inventory {
            db,
            products,
            suppliers,
            transactions,
        })
    }

    /// Connects to the configured store and loads the inventory.
    ///
    /// The only startup path: a [`StoreConfig`] exists only once the
    /// credential has been read.
    pub async fn connect(config: &StoreConfig) -> DbResult<Self> {
        let db = Database::connect(config).await?;
        Self::load(db).await
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn products(&self) -> &ProductRepository {
        &self.products
    }

    pub fn suppliers(&self) -> &SupplierRepository {
        &self.suppliers
    }

    pub fn transactions(&self) -> &TransactionRepository {
        &self.transactions
    }

    /// Reloads every cache from the store.
    ///
    /// Stops at the first failure; caches already reloaded keep their new
    /// contents, the failing one keeps its old contents.
    pub async fn reload(&self) -> DbResult<()> {
        self.products.load_all().await?;
        self.suppliers.load_all().await?;
        self.transactions.load_all().await?;
        Ok(())
    }

    /// Report builder over this inventory.
    pub fn reports(&self) -> ReportAssembler<'_> {
        ReportAssembler::new(self)
    }
}
