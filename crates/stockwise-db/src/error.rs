//! # Store Errors
//!
//! Every repository, movement and startup call returns [`DbResult`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error / MigrateError / ConfigError                               │
//! │       │ From                                                            │
//! │       ▼                                                                 │
//! │  DbError ── constraint messages sorted into UniqueViolation and        │
//! │       │     ForeignKeyViolation, zero-row writes into NotFound          │
//! │       ▼                                                                 │
//! │  Repository logs it, leaves its cache as it was, returns it            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::config::ConfigError;

/// Failure of a store call or of store startup.
#[derive(Debug, Error)]
pub enum DbError {
    /// No stored row has the given id.
    ///
    /// ## When This Occurs
    /// - `update` or `delete` touched zero rows
    /// - A stock movement names an unknown product
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    /// A primary key is already taken.
    ///
    /// ## When This Occurs
    /// - `add` with an id the store already holds
    /// - A supplier lists the same product twice
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation {
        field: String,
        value: String,
    },

    /// A product reference would dangle.
    ///
    /// ## When This Occurs
    /// - A transaction or supplier link names a product that is not stored
    /// - Deleting a product that transactions or suppliers still reference
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        message: String,
    },

    /// The store could not be opened or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// An embedded migration did not apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQL rejected at run time, or a stored value that does not decode
    /// (for example a transaction type outside SALE, RESTOCK, RETURN).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin or commit of a multi-statement write failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Startup configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True for `NotFound`, regardless of entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// ```text
/// RowNotFound                               → NotFound
/// Database "UNIQUE constraint failed: t.c"  → UniqueViolation { field: "t.c" }
/// Database "FOREIGN KEY constraint failed"  → ForeignKeyViolation
/// Database (anything else)                  → QueryFailed
/// ColumnDecode                              → QueryFailed
/// PoolTimedOut                              → PoolExhausted
/// PoolClosed                                → ConnectionFailed
/// other                                     → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::QueryFailed(format!("cannot decode column {}: {}", index, source))
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Product", "P1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Product not found: P1");
    }

    #[test]
    fn test_config_error_converts() {
        let err: DbError = ConfigError::MissingCredential("STOCKWISE_DB_PASSWORD").into();
        assert!(matches!(err, DbError::Config(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_pool_errors() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));

        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}
