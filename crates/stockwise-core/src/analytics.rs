//! # Analytics Engine
//!
//! Report computations over heterogeneous inventory entities.
//!
//! ## Double Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Visitor Dispatch                                    │
//! │                                                                         │
//! │  product.accept(&mut detector)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  detector.visit_product(product)   ◄── handler picked by entity type   │
//! │                                                                         │
//! │                    │ visit_product │ visit_supplier │ visit_transaction │
//! │  ──────────────────┼───────────────┼────────────────┼────────────────── │
//! │  SummaryCollector  │ summary line  │ summary line   │ summary line      │
//! │  LowStockDetector  │ flag if low   │ no-op          │ no-op             │
//! │  ValuationAccum.   │ += q * price  │ no-op          │ no-op             │
//! │                                                                         │
//! │  New report     → new InventoryVisitor impl, entities untouched        │
//! │  New entity type → one new handler on each visitor                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Accumulation Contract
//! A visitor may be fed any number of entities of any type in any order.
//! Results do not depend on traversal order, except that list outputs keep
//! visitation order. Visitors carry state, so build a fresh one per report.

use crate::types::{Product, Supplier, Transaction};

// =============================================================================
// Traits
// =============================================================================

/// A report computation with one handler per entity type.
pub trait InventoryVisitor {
    fn visit_product(&mut self, product: &Product);
    fn visit_supplier(&mut self, supplier: &Supplier);
    fn visit_transaction(&mut self, transaction: &Transaction);
}

/// An entity that can hand itself to a visitor.
pub trait InventoryElement {
    /// Calls the visitor handler matching this entity's type.
    fn accept(&self, visitor: &mut dyn InventoryVisitor);
}

impl InventoryElement for Product {
    fn accept(&self, visitor: &mut dyn InventoryVisitor) {
        visitor.visit_product(self);
    }
}

impl InventoryElement for Supplier {
    fn accept(&self, visitor: &mut dyn InventoryVisitor) {
        visitor.visit_supplier(self);
    }
}

impl InventoryElement for Transaction {
    fn accept(&self, visitor: &mut dyn InventoryVisitor) {
        visitor.visit_transaction(self);
    }
}

/// Feeds every element to `visitor`, in slice order.
pub fn visit_all<E: InventoryElement>(elements: &[E], visitor: &mut dyn InventoryVisitor) {
    for element in elements {
        element.accept(visitor);
    }
}

// =============================================================================
// Summary Collector
// =============================================================================

/// Collects one textual summary per visited entity, grouped by type.
#[derive(Debug, Default, Clone)]
pub struct SummaryCollector {
    product_summaries: Vec<String>,
    supplier_summaries: Vec<String>,
    transaction_summaries: Vec<String>,
}

impl SummaryCollector {
    pub fn new() -> Self {
        SummaryCollector::default()
    }

    pub fn product_summaries(&self) -> &[String] {
        &self.product_summaries
    }

    pub fn supplier_summaries(&self) -> &[String] {
        &self.supplier_summaries
    }

    pub fn transaction_summaries(&self) -> &[String] {
        &self.transaction_summaries
    }

    /// Consumes the collector, returning (products, suppliers, transactions).
    pub fn into_parts(self) -> (Vec<String>, Vec<String>, Vec<String>) {
        (
            self.product_summaries,
            self.supplier_summaries,
            self.transaction_summaries,
        )
    }
}

impl InventoryVisitor for SummaryCollector {
    fn visit_product(&mut self, product: &Product) {
        self.product_summaries.push(product.to_string());
    }

    fn visit_supplier(&mut self, supplier: &Supplier) {
        self.supplier_summaries.push(supplier.to_string());
    }

    fn visit_transaction(&mut self, transaction: &Transaction) {
        self.transaction_summaries.push(transaction.to_string());
    }
}

// =============================================================================
// Low-Stock Detector
// =============================================================================

/// Collects products whose quantity is below their threshold.
///
/// Matches are kept in visitation order.
#[derive(Debug, Default, Clone)]
pub struct LowStockDetector {
    low_stock: Vec<Product>,
}

impl LowStockDetector {
    pub fn new() -> Self {
        LowStockDetector::default()
    }

    /// Products flagged so far.
    pub fn low_stock_products(&self) -> &[Product] {
        &self.low_stock
    }

    pub fn into_products(self) -> Vec<Product> {
        self.low_stock
    }
}

impl InventoryVisitor for LowStockDetector {
    fn visit_product(&mut self, product: &Product) {
        if product.is_low_stock() {
            self.low_stock.push(product.clone());
        }
    }

    fn visit_supplier(&mut self, _supplier: &Supplier) {}

    fn visit_transaction(&mut self, _transaction: &Transaction) {}
}

// =============================================================================
// Valuation Accumulator
// =============================================================================

/// Sums `quantity * unit_price` over visited products.
#[derive(Debug, Default, Clone)]
pub struct ValuationAccumulator {
    total: f64,
}

impl ValuationAccumulator {
    pub fn new() -> Self {
        ValuationAccumulator::default()
    }

    /// Running total; 0.0 before any product is visited.
    pub fn total_value(&self) -> f64 {
        self.total
    }
}

impl InventoryVisitor for ValuationAccumulator {
    fn visit_product(&mut self, product: &Product) {
        self.total += product.total_value();
    }

    fn visit_supplier(&mut self, _supplier: &Supplier) {}

    fn visit_transaction(&mut self, _transaction: &Transaction) {}
}

// =============================================================================
// Unit Tests
// =============================================================================
