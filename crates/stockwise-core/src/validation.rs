//! # Validation Module
//!
//! Input validation for StockWise entities.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (forms, CLI)                                    │
//! │  ├── Parsing (numbers, dates)                                          │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Caller (Rust)                                                │
//! │  └── THIS MODULE: field and reference rules                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store (SQLite)                                               │
//! │  ├── PRIMARY KEY (duplicate ids)                                       │
//! │  └── Foreign keys (transaction → product)                              │
//! │                                                                         │
//! │  Repositories do not call this module. They persist what they get.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockwise_core::validation::{validate_entity_id, validate_transaction_quantity};
//!
//! validate_entity_id("P-100").unwrap();
//! assert!(validate_transaction_quantity(0).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, Supplier, Transaction};
use crate::{MAX_ID_LENGTH, MAX_TEXT_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity id.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - No whitespace
///
/// ## Example
/// ```rust
/// use stockwise_core::validation::validate_entity_id;
///
/// assert!(validate_entity_id("P1").is_ok());
/// assert!(validate_entity_id("").is_err());
/// assert!(validate_entity_id("P 1").is_err());
/// ```
pub fn validate_entity_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.chars().count() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    if id.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a required free-text field (names, addresses, phone numbers).
pub fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LENGTH,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Only the shape is checked: exactly one `@`, something on both sides,
/// and a dot in the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_text("email", email)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    let mut parts = email.trim().split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(invalid("must contain exactly one '@'")),
    };

    if local.is_empty() || domain.is_empty() {
        return Err(invalid("must have a name and a domain"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock level (quantity on hand or reorder threshold).
///
/// Zero is allowed; negatives are not.
pub fn validate_stock_level(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price: finite and not negative. Zero is allowed.
pub fn validate_unit_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "unit_price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::Negative {
            field: "unit_price".to_string(),
        });
    }

    Ok(())
}

/// Validates the quantity of a stock movement. Must be > 0.
pub fn validate_transaction_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates every field of a product.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_entity_id(&product.id)?;
    validate_text("name", &product.name)?;
    validate_stock_level("quantity", product.quantity)?;
    validate_stock_level("threshold", product.threshold)?;
    validate_unit_price(product.unit_price)?;

    if let Some(username) = &product.username {
        validate_text("username", username)?;
    }

    Ok(())
}

/// Validates every field of a supplier, including its product id list.
pub fn validate_supplier(supplier: &Supplier) -> ValidationResult<()> {
    validate_entity_id(&supplier.id)?;
    validate_text("name", &supplier.name)?;
    validate_email(&supplier.email)?;
    validate_text("phone", &supplier.phone)?;
    validate_text("address", &supplier.address)?;

    for product_id in &supplier.supplied_product_ids {
        validate_entity_id(product_id)?;
    }

    Ok(())
}

/// Validates every field of a transaction.
pub fn validate_transaction(transaction: &Transaction) -> ValidationResult<()> {
    validate_entity_id(&transaction.id)?;
    validate_entity_id(&transaction.product_id)?;
    validate_transaction_quantity(transaction.quantity)?;
    Ok(())
}

// =============================================================================
// Reference Checks
// =============================================================================

/// Checks that a transaction is well-formed and points at a known product.
///
/// `products` is typically a repository snapshot.
pub fn check_transaction_refs(transaction: &Transaction, products: &[Product]) -> CoreResult<()> {
    validate_transaction(transaction)?;

    if !products.iter().any(|p| p.id == transaction.product_id) {
        return Err(CoreError::ProductNotFound(transaction.product_id.clone()));
    }

    Ok(())
}

/// Checks that every product a supplier lists is known.
pub fn check_supplier_refs(supplier: &Supplier, products: &[Product]) -> CoreResult<()> {
    validate_supplier(supplier)?;

    if let Some(missing) = supplier
        .supplied_product_ids
        .iter()
        .find(|id| !products.iter().any(|p| &p.id == *id))
    {
        return Err(CoreError::ProductNotFound(missing.clone()));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use chrono::Utc;

    #[test]
    fn test_validate_entity_id() {
        assert!(validate_entity_id("P1").is_ok());
        assert!(validate_entity_id("supplier_42-a").is_ok());

        assert!(validate_entity_id("").is_err());
        assert!(validate_entity_id("   ").is_err());
        assert!(validate_entity_id("has space").is_err());
        assert!(validate_entity_id(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("orders@acme.test").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("acme.test").is_err());
        assert!(validate_email("a@b@acme.test").is_err());
        assert!(validate_email("@acme.test").is_err());
        assert!(validate_email("orders@localhost").is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_stock_level("quantity", 0).is_ok());
        assert_eq!(
            validate_stock_level("threshold", -1),
            Err(ValidationError::Negative {
                field: "threshold".to_string()
            })
        );

        assert!(validate_unit_price(0.0).is_ok());
        assert!(validate_unit_price(12.5).is_ok());
        assert!(validate_unit_price(-0.01).is_err());
        assert!(validate_unit_price(f64::NAN).is_err());

        assert!(validate_transaction_quantity(1).is_ok());
        assert!(validate_transaction_quantity(0).is_err());
        assert!(validate_transaction_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&Product::new("P1", "Bolt", 0, 5, 1.25)).is_ok());
        assert!(validate_product(&Product::new("P1", "", 0, 5, 1.25)).is_err());
        assert!(validate_product(&Product::new("P1", "Bolt", -2, 5, 1.25)).is_err());
    }

    #[test]
    fn test_check_transaction_refs() {
        let products = vec![Product::new("P1", "Bolt", 3, 5, 1.0)];

        let ok = Transaction::new("T1", "P1", TransactionType::Sale, 1, Utc::now());
        assert!(check_transaction_refs(&ok, &products).is_ok());

        let dangling = Transaction::new("T2", "P9", TransactionType::Sale, 1, Utc::now());
        assert!(matches!(
            check_transaction_refs(&dangling, &products),
            Err(CoreError::ProductNotFound(id)) if id == "P9"
        ));

        let zero = Transaction::new("T3", "P1", TransactionType::Restock, 0, Utc::now());
        assert!(matches!(
            check_transaction_refs(&zero, &products),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_check_supplier_refs() {
        let products = vec![Product::new("P1", "Bolt", 3, 5, 1.0)];
        let mut supplier = Supplier::new("S1", "Acme", "orders@acme.test", "555-0100", "1 Road");
        supplier.add_product("P1");
        assert!(check_supplier_refs(&supplier, &products).is_ok());

        supplier.add_product("P2");
        assert!(matches!(
            check_supplier_refs(&supplier, &products),
            Err(CoreError::ProductNotFound(id)) if id == "P2"
        ));
    }
}
