//! # Database Migrations
//!
//! Embedded SQL migrations for StockWise, plus column reconciliation for
//! tables created by older releases.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  Startup                                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Check _sqlx_migrations table                                          │
//! │       │                                                                 │
//! │       ├── Table doesn't exist? Create it                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Run pending migrations in order                                       │
//! │       │   001_initial_schema.sql (CREATE TABLE IF NOT EXISTS ...)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Reconcile columns                                                     │
//! │       │   PRAGMA table_info(products)                                  │
//! │       │   missing username?   → ALTER TABLE ADD COLUMN                 │
//! │       │   missing unit_price? → ALTER TABLE ADD COLUMN ... DEFAULT 0.0 │
//! │       │   missing created_at? → ADD COLUMN, back-fill with now         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Check delete policy                                                   │
//! │       │   PRAGMA foreign_key_list(transactions, supplier_products)     │
//! │       │   product reference ON DELETE CASCADE? → warn                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Startup continues                                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/` with the next sequence number
//! 2. Name format: `NNN_description.sql` (e.g., `002_add_categories.sql`)
//! 3. Write idempotent SQL (use `IF NOT EXISTS` where possible)
//! 4. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbResult;

/// Embedded migrations from the crate's `migrations` directory.
///
/// The `sqlx::migrate!()` macro embeds all SQL files at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// A column that older releases did not create.
struct LegacyColumn {
    table: &'static str,
    column: &'static str,
    /// Declaration used by `ALTER TABLE ... ADD COLUMN`.
    definition: &'static str,
    /// Stamp existing rows with the current time after adding.
    backfill_now: bool,
}

// SQLite cannot ADD COLUMN with a non-constant default, so timestamps are
// added bare and back-filled.
const LEGACY_COLUMNS: &[LegacyColumn] = &[
    LegacyColumn {
        table: "products",
        column: "username",
        definition: "VARCHAR(255)",
        backfill_now: false,
    },
    LegacyColumn {
        table: "products",
        column: "unit_price",
        definition: "REAL DEFAULT 0.0",
        backfill_now: false,
    },
    LegacyColumn {
        table: "products",
        column: "created_at",
        definition: "TIMESTAMP",
        backfill_now: true,
    },
    LegacyColumn {
        table: "suppliers",
        column: "created_at",
        definition: "TIMESTAMP",
        backfill_now: true,
    },
];

/// Runs all pending database migrations.
///
/// ## Safety
/// - Idempotent: safe to run multiple times
/// - Transactional: each migration runs in a transaction
/// - Ordered: migrations run in filename order (001, 002, ...)
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Adds columns missing from tables created by older releases.
///
/// Returns the number of columns added. Running it on an up-to-date
/// schema is a no-op.
pub async fn reconcile_columns(pool: &SqlitePool) -> DbResult<usize> {
    let mut added = 0;

    for legacy in LEGACY_COLUMNS {
        let columns = table_columns(pool, legacy.table).await?;
        if columns.iter().any(|c| c.eq_ignore_ascii_case(legacy.column)) {
            continue;
        }

        warn!(
            table = legacy.table,
            column = legacy.column,
            "Adding missing column"
        );

        let alter = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            legacy.table, legacy.column, legacy.definition
        );
        sqlx::query(&alter).execute(pool).await?;

        if legacy.backfill_now {
            let backfill = format!(
                "UPDATE {} SET {} = CURRENT_TIMESTAMP WHERE {} IS NULL",
                legacy.table, legacy.column, legacy.column
            );
            sqlx::query(&backfill).execute(pool).await?;
        }

        added += 1;
    }

    if added > 0 {
        info!(added, "Column reconciliation complete");
    }
    Ok(added)
}

/// Tables holding a foreign key to `products`.
const PRODUCT_REFERENCES: &[&str] = &["transactions", "supplier_products"];

/// Tables whose reference to `products` cascades on delete.
///
/// Tables created by older releases declared `ON DELETE CASCADE`, which lets
/// a product delete silently drop its transactions from the store while the
/// transaction cache keeps them. SQLite cannot change a foreign key action
/// in place, so each such table is logged for a manual rebuild.
pub async fn cascading_product_references(pool: &SqlitePool) -> DbResult<Vec<&'static str>> {
    let mut cascading = Vec::new();

    for table in PRODUCT_REFERENCES {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_foreign_key_list(?1) \
             WHERE lower(\"table\") = 'products' AND upper(on_delete) = 'CASCADE'",
        )
        .bind(*table)
        .fetch_one(pool)
        .await?;

        if count > 0 {
            warn!(
                table = *table,
                "Product deletes cascade into this table; referenced products are not protected"
            );
            cascading.push(*table);
        }
    }

    Ok(cascading)
}

/// Column names of `table`, in declaration order.
pub async fn table_columns(pool: &SqlitePool, table: &str) -> DbResult<Vec<String>> {
    let columns = sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?1)")
        .bind(table)
        .fetch_all(pool)
        .await?;
    Ok(columns)
}

/// Returns information about migrations.
///
/// ## Returns
/// Tuple of (total_migrations, applied_migrations)
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_fresh_schema_needs_no_reconciliation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert_eq!(reconcile_columns(db.pool()).await.unwrap(), 0);

        let columns = table_columns(db.pool(), "products").await.unwrap();
        assert_eq!(
            columns,
            ["id", "name", "quantity", "threshold", "unit_price", "username", "created_at"]
        );
    }

    #[tokio::test]
    async fn test_legacy_products_table_gains_columns() {
        let config = DbConfig::in_memory().run_migrations(false);
        let db = Database::new(config).await.unwrap();

        sqlx::query(
            "CREATE TABLE products (id VARCHAR(50) PRIMARY KEY, name VARCHAR(255), \
             quantity INT, threshold INT)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query("INSERT INTO products (id, name, quantity, threshold) VALUES ('P1', 'Bolt', 3, 1)")
            .execute(db.pool())
            .await
            .unwrap();

        db.run_migrations().await.unwrap();

        let columns = table_columns(db.pool(), "products").await.unwrap();
        for expected in ["username", "unit_price", "created_at"] {
            assert!(columns.iter().any(|c| c == expected), "missing {}", expected);
        }

        let stamped: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE created_at IS NOT NULL")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(stamped, 1);

        // Second pass finds nothing to do.
        assert_eq!(reconcile_columns(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fresh_schema_restricts_product_deletes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(cascading_product_references(db.pool()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_cascading_transactions_are_reported() {
        let config = DbConfig::in_memory().run_migrations(false);
        let db = Database::new(config).await.unwrap();

        sqlx::query(
            "CREATE TABLE products (id VARCHAR(50) PRIMARY KEY, name VARCHAR(255), \
             quantity INT, threshold INT)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "CREATE TABLE transactions (id VARCHAR(50) PRIMARY KEY, product_id VARCHAR(50), \
             type VARCHAR(20), quantity INT, timestamp TIMESTAMP, \
             FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE ON UPDATE CASCADE)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        // Startup still succeeds; the table is only reported.
        db.run_migrations().await.unwrap();

        let cascading = cascading_product_references(db.pool()).await.unwrap();
        assert_eq!(cascading, ["transactions"]);
    }
}
