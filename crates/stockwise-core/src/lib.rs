//! # stockwise-core: Pure Inventory Logic for StockWise
//!
//! Entities, validation rules and the analytics engine, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockWise Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation (outside this workspace)              │   │
//! │  │    Product form ──► Supplier table ──► Transaction form        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockwise-db (Store + Caches)                   │   │
//! │  │     Inventory context, repositories, report assembler          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockwise-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │ analytics  │  │ validation│  │  report  │  │   │
//! │  │   │  Product  │  │  visitors  │  │   rules   │  │  structs │  │   │
//! │  │   │  Supplier │  │            │  │           │  │          │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Product, Supplier, Transaction)
//! - [`analytics`] - Visitor-based report computations
//! - [`report`] - Report data returned to callers
//! - [`validation`] - Field and reference rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockwise_core::analytics::{visit_all, LowStockDetector, ValuationAccumulator};
//! use stockwise_core::Product;
//!
//! let products = vec![Product::new("P1", "Bolt", 2, 5, 10.0)];
//!
//! let mut low = LowStockDetector::new();
//! visit_all(&products, &mut low);
//! assert_eq!(low.low_stock_products().len(), 1);
//!
//! let mut value = ValuationAccumulator::new();
//! visit_all(&products, &mut value);
//! assert_eq!(value.total_value(), 20.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::{InventoryElement, InventoryVisitor};
pub use error::{CoreError, CoreResult, ValidationError};
pub use report::{InventoryReport, StockOverview};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of an entity id (matches the `VARCHAR(50)` key columns
/// of the legacy schema).
pub const MAX_ID_LENGTH: usize = 50;

/// Maximum length of names, addresses and other free text.
pub const MAX_TEXT_LENGTH: usize = 255;
