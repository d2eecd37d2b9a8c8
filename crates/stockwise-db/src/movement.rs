//! # Stock Movements
//!
//! Records a transaction and applies its stock effect in one commit.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_movement(RESTOCK 5 of P1)                                      │
//! │                                                                         │
//! │  1. lock products cache, then transactions cache (fixed order)         │
//! │  2. BEGIN                                                              │
//! │  3. UPDATE products SET quantity = quantity + 5 WHERE id = 'P1'        │
//! │        0 rows? → NotFound, ROLLBACK                                    │
//! │  4. INSERT INTO transactions ...                                       │
//! │  5. SELECT product row (new quantity)                                  │
//! │  6. COMMIT                                                             │
//! │  7. refresh P1 in the product cache, append the transaction            │
//! │                                                                         │
//! │  Any error before 7 → nothing stored, caches untouched.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};

use crate::context::Inventory;
use crate::error::{DbError, DbResult};
use crate::repository::product::{apply_stock_delta, fetch_product};
use crate::repository::transaction::insert_transaction;
use stockwise_core::{Product, Transaction};

impl Inventory {
    /// Stores `transaction` and applies its stock delta to the referenced
    /// product atomically.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the product with its new quantity
    /// * `Err(DbError::NotFound)` - product does not exist
    /// * `Err(DbError::UniqueViolation)` - transaction id already stored
    pub async fn record_movement(&self, transaction: Transaction) -> DbResult<Product> {
        let mut product_cache = self.products().lock_cache().await;
        let mut transaction_cache = self.transactions().lock_cache().await;

        let delta = transaction.stock_delta();
        debug!(
            id = %transaction.id,
            product_id = %transaction.product_id,
            kind = %transaction.transaction_type,
            delta,
            "Recording stock movement"
        );

        let updated = match self.commit_movement(&transaction, delta).await {
            Ok(product) => product,
            Err(e) => {
                warn!(id = %transaction.id, error = %e, "Stock movement failed");
                return Err(e);
            }
        };

        match product_cache.iter_mut().find(|p| p.id == updated.id) {
            Some(slot) => *slot = updated.clone(),
            None => product_cache.push(updated.clone()),
        }
        transaction_cache.push(transaction);

        info!(product_id = %updated.id, quantity = updated.quantity, "Stock movement recorded");
        Ok(updated)
    }

    async fn commit_movement(&self, transaction: &Transaction, delta: i64) -> DbResult<Product> {
        let mut tx = self
            .database()
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // Dropping `tx` on any early return rolls back.
        if apply_stock_delta(&mut *tx, &transaction.product_id, delta).await? == 0 {
            return Err(DbError::not_found("Product", &transaction.product_id));
        }

        insert_transaction(&mut *tx, transaction).await?;

        let product = fetch_product(&mut *tx, &transaction.product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &transaction.product_id))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(product)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
