//! # Product Repository
//!
//! Store adapter and cached repository for products.
//!
//! ## Key Operations
//! - CRUD through [`CachedRepository`]
//! - Historical queries straight from the store (by creation day, by owner)
//! - Stock deltas applied inside a caller's transaction (stock movements)
//!
//! ## Stock Delta
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  Absolute: UPDATE products SET quantity = 15 WHERE id = ?          │
//! │     → used by update(), the caller computed the new level          │
//! │                                                                     │
//! │  Delta:    UPDATE products SET quantity = quantity + 5 WHERE id = ? │
//! │     → used by record_movement(), alongside the transaction insert  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteExecutor;
use tracing::debug;

use super::{CachedRepository, EntityStore};
use crate::error::DbResult;
use crate::pool::Database;
use stockwise_core::Product;

/// Cached product repository.
pub type ProductRepository = CachedRepository<ProductStore>;

const SELECT_PRODUCTS: &str = r#"
    SELECT id, name, quantity, threshold, unit_price, username, created_at
    FROM products
"#;

/// Raw product row. Every column but the key may be NULL in tables
/// created by older releases.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: Option<String>,
    quantity: Option<i64>,
    threshold: Option<i64>,
    unit_price: Option<f64>,
    username: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name.unwrap_or_default(),
            quantity: row.quantity.unwrap_or(0),
            threshold: row.threshold.unwrap_or(0),
            unit_price: row.unit_price.unwrap_or(0.0),
            username: row.username,
            // Default is the UNIX epoch.
            date_added: row.created_at.unwrap_or_default(),
        }
    }
}

/// SQLite-backed product storage.
///
/// ## Usage
/// ```rust,ignore
/// let products = ProductRepository::new(ProductStore::new(db.clone())).await?;
/// let todays = products.find_by_date(Utc::now().date_naive()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductStore {
    db: Database,
}

impl ProductStore {
    pub fn new(db: Database) -> Self {
        ProductStore { db }
    }

    /// Products created on the given UTC calendar day.
    pub async fn find_by_date(&self, date: NaiveDate) -> DbResult<Vec<Product>> {
        debug!(date = %date, "Querying products by date");

        let sql = format!("{} WHERE date(created_at) = ?1 ORDER BY rowid", SELECT_PRODUCTS);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(date.format("%Y-%m-%d").to_string())
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Products owned by `username`.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Vec<Product>> {
        debug!(username = %username, "Querying products by owner");

        let sql = format!("{} WHERE username = ?1 ORDER BY rowid", SELECT_PRODUCTS);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(username)
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[async_trait]
impl EntityStore for ProductStore {
    type Entity = Product;

    async fn fetch_all(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{} ORDER BY rowid", SELECT_PRODUCTS);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn insert(&self, product: &Product) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, quantity, threshold, unit_price, username, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.threshold)
        .bind(product.unit_price)
        .bind(&product.username)
        .bind(product.date_added)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                quantity = ?3,
                threshold = ?4,
                unit_price = ?5,
                username = ?6,
                created_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.threshold)
        .bind(product.unit_price)
        .bind(&product.username)
        .bind(product.date_added)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

impl ProductRepository {
    /// Products created on the given UTC calendar day (reads the store).
    pub async fn find_by_date(&self, date: NaiveDate) -> DbResult<Vec<Product>> {
        self.store().find_by_date(date).await
    }

    /// Products owned by `username` (reads the store).
    pub async fn find_by_username(&self, username: &str) -> DbResult<Vec<Product>> {
        self.store().find_by_username(username).await
    }
}

/// Reads one product through any executor.
pub(crate) async fn fetch_product<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{} WHERE id = ?1", SELECT_PRODUCTS);
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Product::from))
}

/// Adds `delta` to a product's quantity. Returns rows affected.
pub(crate) async fn apply_stock_delta<'e, E>(executor: E, id: &str, delta: i64) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, delta = %delta, "Applying stock delta");

    let result = sqlx::query(
        "UPDATE products SET quantity = COALESCE(quantity, 0) + ?2 WHERE id = ?1",
    )
    .bind(id)
    .bind(delta)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;
    use chrono::TimeZone;

    async fn setup() -> (Database, ProductRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = ProductRepository::new(ProductStore::new(db.clone()))
            .await
            .unwrap();
        (db, repo)
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_add_update_delete_round_trip() {
        let (_db, repo) = setup().await;
        let bolt = Product::new("P1", "Bolt", 10, 5, 0.25)
            .with_username("alice")
            .with_date_added(at(2024, 3, 1, 9));

        repo.add(bolt.clone()).await.unwrap();
        assert_eq!(repo.get_all().await, vec![bolt.clone()]);
        assert_eq!(repo.get_all().await, repo.get_all().await);

        let mut restocked = bolt.clone();
        restocked.quantity = 40;
        repo.update(restocked.clone()).await.unwrap();
        assert_eq!(repo.find_by_id("P1").await, Some(restocked.clone()));

        // The store agrees with the cache.
        repo.load_all().await.unwrap();
        assert_eq!(repo.get_all().await, vec![restocked]);

        repo.delete("P1").await.unwrap();
        assert!(repo.is_empty().await);
        assert!(repo.find_by_id("P1").await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_unique_violation() {
        let (_db, repo) = setup().await;
        repo.add(Product::new("P1", "Bolt", 1, 1, 1.0)).await.unwrap();

        let err = repo.add(Product::new("P1", "Other", 2, 2, 2.0)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.len().await, 1);
        assert_eq!(repo.find_by_id("P1").await.unwrap().name, "Bolt");
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let (_db, repo) = setup().await;
        repo.add(Product::new("P2", "Nut", 1, 1, 1.0)).await.unwrap();
        let before = repo.get_all().await;

        let err = repo.delete("P1").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(repo.get_all().await, before);
    }

    #[tokio::test]
    async fn test_find_by_date_and_username() {
        let (_db, repo) = setup().await;
        repo.add(
            Product::new("P1", "Bolt", 1, 1, 1.0)
                .with_username("alice")
                .with_date_added(at(2024, 3, 1, 9)),
        )
        .await
        .unwrap();
        repo.add(
            Product::new("P2", "Nut", 1, 1, 1.0)
                .with_username("bob")
                .with_date_added(at(2024, 3, 1, 23)),
        )
        .await
        .unwrap();
        repo.add(
            Product::new("P3", "Gear", 1, 1, 1.0)
                .with_username("alice")
                .with_date_added(at(2024, 3, 2, 0)),
        )
        .await
        .unwrap();

        let march_first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let ids: Vec<_> = repo
            .find_by_date(march_first)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["P1", "P2"]);

        let ids: Vec<_> = repo
            .find_by_username("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["P1", "P3"]);

        assert!(repo.find_by_username("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_null_columns_load_with_defaults() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        sqlx::query("CREATE TABLE products (id VARCHAR(50) PRIMARY KEY, name VARCHAR(255), quantity INT, threshold INT)")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO products (id, name) VALUES ('P9', 'Legacy')")
            .execute(db.pool())
            .await
            .unwrap();
        db.run_migrations().await.unwrap();
        sqlx::query("UPDATE products SET created_at = NULL")
            .execute(db.pool())
            .await
            .unwrap();

        let repo = ProductRepository::new(ProductStore::new(db)).await.unwrap();
        let legacy = repo.find_by_id("P9").await.unwrap();
        assert_eq!(legacy.quantity, 0);
        assert_eq!(legacy.threshold, 0);
        assert_eq!(legacy.unit_price, 0.0);
        assert_eq!(legacy.username, None);
        assert_eq!(legacy.date_added.timestamp(), 0);
    }

    #[tokio::test]
    async fn test_apply_stock_delta() {
        let (db, repo) = setup().await;
        repo.add(Product::new("P1", "Bolt", 10, 5, 1.0)).await.unwrap();

        assert_eq!(apply_stock_delta(db.pool(), "P1", -3).await.unwrap(), 1);
        assert_eq!(apply_stock_delta(db.pool(), "missing", 1).await.unwrap(), 0);

        repo.load_all().await.unwrap();
        assert_eq!(repo.find_by_id("P1").await.unwrap().quantity, 7);
    }
}
