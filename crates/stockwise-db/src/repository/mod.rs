//! # Repository Module
//!
//! Write-through cached repositories for StockWise entities.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Write-Through Cache                                  │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  repo.update(product)                                          │
//! │       ▼                                                                 │
//! │  CachedRepository<ProductStore>                                        │
//! │  ├── cache: RwLock<Vec<Product>>   ◄── get_all / find_by_id (read)     │
//! │  │                                                                     │
//! │  │   1. take write guard                                               │
//! │  │   2. store.update(&product)      ── SQL ──►  SQLite                 │
//! │  │   3. rows > 0 ?  replace cached entry in place                      │
//! │  │      rows = 0 ?  NotFound, cache untouched                          │
//! │  │      Err      ?  returned, cache untouched                          │
//! │  │   4. release guard                                                  │
//! │  ▼                                                                     │
//! │  Result<(), DbError>                                                   │
//! │                                                                         │
//! │  Invariant: cache == store contents as of the last completed          │
//! │  operation on this repository.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Products, plus date and owner queries
//! - [`SupplierRepository`] - Suppliers with their supplied-product links
//! - [`TransactionRepository`] - Stock movements, plus product and range queries
//!
//! Writers hold the cache's write guard across the store round-trip, so
//! two writers on one repository never interleave. Readers take the read
//! guard and always receive clones.

pub mod product;
pub mod supplier;
pub mod transaction;

use async_trait::async_trait;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockwise_core::{Product, Supplier, Transaction};

pub use product::{ProductRepository, ProductStore};
pub use supplier::{SupplierRepository, SupplierStore};
pub use transaction::{TransactionRepository, TransactionStore};

// =============================================================================
// Record
// =============================================================================

/// An entity with a unique string key.
pub trait Record: Clone + Send + Sync + 'static {
    /// Entity name used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Record for Product {
    const KIND: &'static str = "Product";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Supplier {
    const KIND: &'static str = "Supplier";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Transaction {
    const KIND: &'static str = "Transaction";

    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Entity Store
// =============================================================================

/// Durable storage for one entity type.
///
/// `update` and `delete` report rows affected; the repository turns zero
/// into `DbError::NotFound`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    type Entity: Record;

    /// Every stored record, in insertion order.
    async fn fetch_all(&self) -> DbResult<Vec<Self::Entity>>;

    async fn insert(&self, entity: &Self::Entity) -> DbResult<()>;

    async fn update(&self, entity: &Self::Entity) -> DbResult<u64>;

    async fn delete(&self, id: &str) -> DbResult<u64>;
}

// =============================================================================
// Cached Repository
// =============================================================================

/// In-memory cache kept consistent with an [`EntityStore`].
pub struct CachedRepository<S: EntityStore> {
    store: S,
    cache: RwLock<Vec<S::Entity>>,
}

impl<S: EntityStore> CachedRepository<S> {
    /// Creates the repository and performs the initial full load.
    pub async fn new(store: S) -> DbResult<Self> {
        let repo = CachedRepository {
            store,
            cache: RwLock::new(Vec::new()),
        };
        repo.load_all().await?;
        Ok(repo)
    }

    /// The underlying store adapter.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Re-reads every record and replaces the cache.
    ///
    /// All or nothing: on error the previous cache is kept.
    pub async fn load_all(&self) -> DbResult<usize> {
        let mut cache = self.cache.write().await;

        let entities = self.store.fetch_all().await.map_err(|e| {
            warn!(kind = S::Entity::KIND, error = %e, "Reload failed, keeping previous cache");
            e
        })?;

        *cache = entities;
        info!(kind = S::Entity::KIND, count = cache.len(), "Cache loaded");
        Ok(cache.len())
    }

    /// Snapshot of every cached entity.
    pub async fn get_all(&self) -> Vec<S::Entity> {
        self.cache.read().await.clone()
    }

    /// Cached entity with the given id.
    pub async fn find_by_id(&self, id: &str) -> Option<S::Entity> {
        self.cache.read().await.iter().find(|e| e.id() == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Persists a new entity, then appends it to the cache.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - id already stored
    /// * `Err(DbError::ForeignKeyViolation)` - referenced product missing
    pub async fn add(&self, entity: S::Entity) -> DbResult<()> {
        let mut cache = self.cache.write().await;

        debug!(kind = S::Entity::KIND, id = %entity.id(), "Adding");

        if let Err(e) = self.store.insert(&entity).await {
            warn!(kind = S::Entity::KIND, id = %entity.id(), error = %e, "Add failed");
            return Err(e);
        }

        cache.push(entity);
        Ok(())
    }

    /// Overwrites the stored record with the same id, then replaces the
    /// cached entry in place.
    pub async fn update(&self, entity: S::Entity) -> DbResult<()> {
        let mut cache = self.cache.write().await;

        debug!(kind = S::Entity::KIND, id = %entity.id(), "Updating");

        let rows = self.store.update(&entity).await.map_err(|e| {
            warn!(kind = S::Entity::KIND, id = %entity.id(), error = %e, "Update failed");
            e
        })?;

        if rows == 0 {
            return Err(DbError::not_found(S::Entity::KIND, entity.id()));
        }

        match cache.iter_mut().find(|e| e.id() == entity.id()) {
            Some(slot) => *slot = entity,
            // Stored but not cached: another process added it after our load.
            None => cache.push(entity),
        }
        Ok(())
    }

    /// Deletes the record with `id`, then drops it from the cache.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such id
    /// * `Err(DbError::ForeignKeyViolation)` - record still referenced
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut cache = self.cache.write().await;

        debug!(kind = S::Entity::KIND, id = %id, "Deleting");

        let rows = self.store.delete(id).await.map_err(|e| {
            warn!(kind = S::Entity::KIND, id = %id, error = %e, "Delete failed");
            e
        })?;

        if rows == 0 {
            return Err(DbError::not_found(S::Entity::KIND, id));
        }

        cache.retain(|e| e.id() != id);
        Ok(())
    }

    /// Exclusive access to the cache for multi-repository operations.
    pub(crate) async fn lock_cache(&self) -> RwLockWriteGuard<'_, Vec<S::Entity>> {
        self.cache.write().await
    }
}

/// Generates a new entity id.
///
/// ## Usage
/// ```rust,ignore
/// let product = Product::new(generate_id(), "Bolt", 10, 5, 0.25);
/// ```
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
