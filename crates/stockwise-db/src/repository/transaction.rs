//! # Transaction Repository
//!
//! Stock movements. The repository only records them; the stock effect is
//! applied by the caller through `ProductRepository::update`, or in one
//! step through `Inventory::record_movement`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use tracing::debug;

use super::{CachedRepository, EntityStore};
use crate::error::DbResult;
use crate::pool::Database;
use stockwise_core::{Transaction, TransactionType};

/// Cached transaction repository.
pub type TransactionRepository = CachedRepository<TransactionStore>;

const SELECT_TRANSACTIONS: &str = r#"
    SELECT id, product_id, type AS transaction_type, quantity, timestamp
    FROM transactions
"#;

/// Raw transaction row. An unknown `type` value fails decoding, which
/// fails the whole read.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    product_id: String,
    transaction_type: TransactionType,
    quantity: Option<i64>,
    timestamp: Option<DateTime<Utc>>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: row.id,
            product_id: row.product_id,
            transaction_type: row.transaction_type,
            quantity: row.quantity.unwrap_or(0),
            timestamp: row.timestamp.unwrap_or_default(),
        }
    }
}

/// SQLite-backed transaction storage.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    db: Database,
}

impl TransactionStore {
    pub fn new(db: Database) -> Self {
        TransactionStore { db }
    }

    /// Movements of one product, in insertion order.
    pub async fn find_by_product(&self, product_id: &str) -> DbResult<Vec<Transaction>> {
        debug!(product_id = %product_id, "Querying transactions by product");

        let sql = format!("{} WHERE product_id = ?1 ORDER BY rowid", SELECT_TRANSACTIONS);
        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(product_id)
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    /// Movements with `from <= timestamp < to`, oldest first.
    pub async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Transaction>> {
        debug!(from = %from, to = %to, "Querying transactions by time range");

        // julianday() normalizes the stored text formats before comparing.
        let sql = format!(
            "{} WHERE julianday(timestamp) >= julianday(?1) AND julianday(timestamp) < julianday(?2) \
             ORDER BY julianday(timestamp), rowid",
            SELECT_TRANSACTIONS
        );
        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }
}

/// Inserts one transaction row through any executor.
pub(crate) async fn insert_transaction<'e, E>(executor: E, transaction: &Transaction) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO transactions (id, product_id, type, quantity, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&transaction.id)
    .bind(&transaction.product_id)
    .bind(transaction.transaction_type)
    .bind(transaction.quantity)
    .bind(transaction.timestamp)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl EntityStore for TransactionStore {
    type Entity = Transaction;

    async fn fetch_all(&self) -> DbResult<Vec<Transaction>> {
        let sql = format!("{} ORDER BY rowid", SELECT_TRANSACTIONS);
        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn insert(&self, transaction: &Transaction) -> DbResult<()> {
        insert_transaction(self.db.pool(), transaction).await
    }

    async fn update(&self, transaction: &Transaction) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                product_id = ?2,
                type = ?3,
                quantity = ?4,
                timestamp = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.product_id)
        .bind(transaction.transaction_type)
        .bind(transaction.quantity)
        .bind(transaction.timestamp)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

impl TransactionRepository {
    /// Movements of one product (reads the store).
    pub async fn find_by_product(&self, product_id: &str) -> DbResult<Vec<Transaction>> {
        self.store().find_by_product(product_id).await
    }

    /// Movements in the half-open range `[from, to)` (reads the store).
    pub async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Transaction>> {
        self.store().find_between(from, to).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;
    use crate::repository::{ProductRepository, ProductStore};
    use chrono::TimeZone;
    use stockwise_core::Product;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
    }

    async fn setup() -> (Database, ProductRepository, TransactionRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = ProductRepository::new(ProductStore::new(db.clone()))
            .await
            .unwrap();
        products.add(Product::new("P1", "Bolt", 10, 5, 1.0)).await.unwrap();
        products.add(Product::new("P2", "Nut", 10, 5, 1.0)).await.unwrap();
        let transactions = TransactionRepository::new(TransactionStore::new(db.clone()))
            .await
            .unwrap();
        (db, products, transactions)
    }

    #[tokio::test]
    async fn test_round_trip_keeps_type() {
        let (_db, _products, transactions) = setup().await;
        let tx = Transaction::new("T1", "P1", TransactionType::Return, 2, at(1, 8));
        transactions.add(tx.clone()).await.unwrap();

        transactions.load_all().await.unwrap();
        assert_eq!(transactions.get_all().await, vec![tx]);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let (_db, _products, transactions) = setup().await;
        let tx = Transaction::new("T1", "P404", TransactionType::Sale, 1, at(1, 8));

        let err = transactions.add(tx).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(transactions.is_empty().await);
    }

    #[tokio::test]
    async fn test_find_by_product_and_range() {
        let (_db, _products, transactions) = setup().await;
        for (id, product, day) in [("T1", "P1", 3), ("T2", "P2", 1), ("T3", "P1", 2), ("T4", "P1", 5)] {
            transactions
                .add(Transaction::new(id, product, TransactionType::Restock, 1, at(day, 12)))
                .await
                .unwrap();
        }

        let ids: Vec<_> = transactions
            .find_by_product("P1")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, ["T1", "T3", "T4"]);

        // Half-open: the upper bound is excluded, results come oldest first.
        let ids: Vec<_> = transactions
            .find_between(at(1, 12), at(5, 12))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, ["T2", "T3", "T1"]);
    }

    #[tokio::test]
    async fn test_referenced_product_cannot_be_deleted() {
        let (_db, products, transactions) = setup().await;
        transactions
            .add(Transaction::new("T1", "P1", TransactionType::Sale, 1, at(1, 8)))
            .await
            .unwrap();

        let err = products.delete("P1").await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(products.find_by_id("P1").await.is_some());
    }

    #[tokio::test]
    async fn test_unknown_type_fails_load() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        // Tables from older releases carry no CHECK on `type`.
        sqlx::query(
            "CREATE TABLE transactions (id VARCHAR(50) PRIMARY KEY, product_id VARCHAR(50), \
             type VARCHAR(20), quantity INT, timestamp TIMESTAMP)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query("INSERT INTO transactions VALUES ('T1', 'P1', 'REFUND', 1, '2024-06-01 08:00:00')")
            .execute(db.pool())
            .await
            .unwrap();
        db.run_migrations().await.unwrap();

        let result = TransactionRepository::new(TransactionStore::new(db)).await;
        assert!(matches!(result, Err(DbError::QueryFailed(_))));
    }
}
