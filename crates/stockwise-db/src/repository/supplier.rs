//! # Supplier Repository
//!
//! Suppliers live in `suppliers`; the ordered list of supplied products
//! lives in `supplier_products` (one row per link, `position` keeps order).
//! Every write replaces a supplier's links inside the same store
//! transaction as the supplier row.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use super::{CachedRepository, EntityStore};
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use stockwise_core::Supplier;

/// Cached supplier repository.
pub type SupplierRepository = CachedRepository<SupplierStore>;

const SELECT_SUPPLIERS: &str = r#"
    SELECT id, name, email, phone, address, created_at
    FROM suppliers
"#;

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: String,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            address: row.address.unwrap_or_default(),
            date_added: row.created_at.unwrap_or_default(),
            supplied_product_ids: Vec::new(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    supplier_id: String,
    product_id: String,
}

/// SQLite-backed supplier storage.
#[derive(Debug, Clone)]
pub struct SupplierStore {
    db: Database,
}

impl SupplierStore {
    pub fn new(db: Database) -> Self {
        SupplierStore { db }
    }

    /// Suppliers created on the given UTC calendar day.
    pub async fn find_by_date(&self, date: NaiveDate) -> DbResult<Vec<Supplier>> {
        debug!(date = %date, "Querying suppliers by date");

        let sql = format!("{} WHERE date(created_at) = ?1 ORDER BY rowid", SELECT_SUPPLIERS);
        let rows = sqlx::query_as::<_, SupplierRow>(&sql)
            .bind(date.format("%Y-%m-%d").to_string())
            .fetch_all(self.db.pool())
            .await?;

        self.attach_links(rows).await
    }

    /// Converts rows into suppliers carrying their product links.
    async fn attach_links(&self, rows: Vec<SupplierRow>) -> DbResult<Vec<Supplier>> {
        let links = sqlx::query_as::<_, LinkRow>(
            "SELECT supplier_id, product_id FROM supplier_products ORDER BY supplier_id, position",
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut by_supplier: HashMap<String, Vec<String>> = HashMap::new();
        for link in links {
            by_supplier
                .entry(link.supplier_id)
                .or_default()
                .push(link.product_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut supplier = Supplier::from(row);
                if let Some(ids) = by_supplier.remove(&supplier.id) {
                    supplier.supplied_product_ids = ids;
                }
                supplier
            })
            .collect())
    }

    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

/// Rewrites the link rows of `supplier` within `tx`.
async fn replace_links(tx: &mut Transaction<'_, Sqlite>, supplier: &Supplier) -> DbResult<()> {
    sqlx::query("DELETE FROM supplier_products WHERE supplier_id = ?1")
        .bind(&supplier.id)
        .execute(&mut **tx)
        .await?;

    for (position, product_id) in supplier.supplied_product_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO supplier_products (supplier_id, product_id, position) VALUES (?1, ?2, ?3)",
        )
        .bind(&supplier.id)
        .bind(product_id)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn commit(tx: Transaction<'_, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

#[async_trait]
impl EntityStore for SupplierStore {
    type Entity = Supplier;

    async fn fetch_all(&self) -> DbResult<Vec<Supplier>> {
        let sql = format!("{} ORDER BY rowid", SELECT_SUPPLIERS);
        let rows = sqlx::query_as::<_, SupplierRow>(&sql)
            .fetch_all(self.db.pool())
            .await?;

        self.attach_links(rows).await
    }

    async fn insert(&self, supplier: &Supplier) -> DbResult<()> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, email, phone, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(supplier.date_added)
        .execute(&mut *tx)
        .await?;

        replace_links(&mut tx, supplier).await?;
        commit(tx).await
    }

    async fn update(&self, supplier: &Supplier) -> DbResult<u64> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2,
                email = ?3,
                phone = ?4,
                address = ?5,
                created_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(supplier.date_added)
        .execute(&mut *tx)
        .await?;

        // Dropping `tx` rolls back.
        if result.rows_affected() == 0 {
            return Ok(0);
        }

        replace_links(&mut tx, supplier).await?;
        commit(tx).await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &str) -> DbResult<u64> {
        // Links go with the supplier (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

impl SupplierRepository {
    /// Suppliers created on the given UTC calendar day (reads the store).
    pub async fn find_by_date(&self, date: NaiveDate) -> DbResult<Vec<Supplier>> {
        self.store().find_by_date(date).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
