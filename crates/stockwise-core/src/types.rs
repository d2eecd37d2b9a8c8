//! # Domain Types
//!
//! Core entities tracked by StockWise.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Supplier     │   │  Transaction    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  supplied_      │   │  id             │       │
//! │  │  name           │   │  product_ids    │   │  product_id ────┼──►    │
//! │  │  quantity       │   │  name, email    │   │  transaction_   │       │
//! │  │  threshold      │   │  phone, address │   │  type           │       │
//! │  │  unit_price     │   │  date_added     │   │  quantity       │       │
//! │  │  username       │   └─────────────────┘   │  timestamp      │       │
//! │  │  date_added     │                         └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  Suppliers and transactions only reference products by id.             │
//! │  Neither owns the product lifecycle.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities are plain records. A transaction's stock effect is computed
//! here ([`Transaction::stock_delta`]) but applying it is up to the caller.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Format used in every textual summary.
const SUMMARY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique key within the product repository.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Units currently on hand. Non-negative by convention only.
    pub quantity: i64,

    /// Reorder level. The product is low on stock below this value.
    pub threshold: i64,

    /// Price per unit.
    pub unit_price: f64,

    /// Owner tag (who manages this product).
    pub username: Option<String>,

    /// When the product was first recorded.
    pub date_added: DateTime<Utc>,
}

impl Product {
    /// Creates a product stamped with the current time and no owner.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        quantity: i64,
        threshold: i64,
        unit_price: f64,
    ) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            quantity,
            threshold,
            unit_price,
            username: None,
            date_added: Utc::now(),
        }
    }

    /// Sets the owner tag.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Overrides the creation timestamp.
    pub fn with_date_added(mut self, date_added: DateTime<Utc>) -> Self {
        self.date_added = date_added;
        self
    }

    /// True when quantity has fallen below the reorder threshold.
    ///
    /// `quantity == threshold` is not low stock.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.threshold
    }

    /// Stock value on hand: `quantity * unit_price`.
    #[inline]
    pub fn total_value(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product [id={}, name={}, quantity={}, threshold={}, unitPrice={:.2}, username={}]",
            self.id,
            self.name,
            self.quantity,
            self.threshold,
            self.unit_price,
            self.username.as_deref().unwrap_or("-")
        )
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier and the products it provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub date_added: DateTime<Utc>,

    /// Ids of supplied products, in the order they were attached.
    #[serde(default)]
    pub supplied_product_ids: Vec<String>,
}

impl Supplier {
    /// Creates a supplier stamped with the current time and no products.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Supplier {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            address: address.into(),
            date_added: Utc::now(),
            supplied_product_ids: Vec::new(),
        }
    }

    /// Overrides the creation timestamp.
    pub fn with_date_added(mut self, date_added: DateTime<Utc>) -> Self {
        self.date_added = date_added;
        self
    }

    /// Attaches a product. Attaching the same product twice is a no-op.
    pub fn add_product(&mut self, product_id: impl Into<String>) {
        let product_id = product_id.into();
        if !self.supplies(&product_id) {
            self.supplied_product_ids.push(product_id);
        }
    }

    /// Detaches a product. Returns whether it was attached.
    pub fn remove_product(&mut self, product_id: &str) -> bool {
        let before = self.supplied_product_ids.len();
        self.supplied_product_ids.retain(|id| id != product_id);
        before != self.supplied_product_ids.len()
    }

    /// Whether this supplier provides the given product.
    pub fn supplies(&self, product_id: &str) -> bool {
        self.supplied_product_ids.iter().any(|id| id == product_id)
    }
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Supplier [id={}, name={}, email={}, phone={}, address={}, dateAdded={}, suppliedProducts=[{}]]",
            self.id,
            self.name,
            self.email,
            self.phone,
            self.address,
            self.date_added.format(SUMMARY_TIME_FORMAT),
            self.supplied_product_ids.join(", ")
        )
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Sold to a customer. Stock decreases.
    Sale,
    /// Received from a supplier. Stock increases.
    Restock,
    /// Returned by a customer. Stock increases.
    Return,
}

impl TransactionType {
    /// All variants, in declaration order.
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Sale,
        TransactionType::Restock,
        TransactionType::Return,
    ];

    /// Stored/displayed name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sale => "SALE",
            TransactionType::Restock => "RESTOCK",
            TransactionType::Return => "RETURN",
        }
    }

    /// Signed effect of `quantity` units of this movement on stock.
    pub const fn signed(&self, quantity: i64) -> i64 {
        match self {
            TransactionType::Sale => -quantity,
            TransactionType::Restock | TransactionType::Return => quantity,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SALE" => Ok(TransactionType::Sale),
            "RESTOCK" => Ok(TransactionType::Restock),
            "RETURN" => Ok(TransactionType::Return),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: TransactionType::ALL
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A recorded stock movement for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,

    /// Product this movement applies to.
    pub product_id: String,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Units moved. Always positive; direction comes from the type.
    pub quantity: i64,

    /// When the movement happened (user-supplied, not necessarily ordered).
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<String>,
        transaction_type: TransactionType,
        quantity: i64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Transaction {
            id: id.into(),
            product_id: product_id.into(),
            transaction_type,
            quantity,
            timestamp,
        }
    }

    /// Change this movement makes to the product's quantity.
    #[inline]
    pub fn stock_delta(&self) -> i64 {
        self.transaction_type.signed(self.quantity)
    }

    /// Applies this movement to `product` in memory.
    ///
    /// The caller is responsible for persisting the updated product.
    pub fn apply_to(&self, product: &mut Product) {
        product.quantity += self.stock_delta();
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction [id={}, product={}, type={}, quantity={}, timestamp={}]",
            self.id,
            self.product_id,
            self.transaction_type,
            self.quantity,
            self.timestamp.format(SUMMARY_TIME_FORMAT)
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
