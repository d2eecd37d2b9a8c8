//! # Report Assembler
//!
//! Runs the analytics visitors over repository snapshots.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repositories ── get_all() ──► snapshot Vec<E>                          │
//! │                                    │                                    │
//! │                                    ▼  visit_all(&snapshot, &mut v)     │
//! │                     fresh SummaryCollector / LowStockDetector /        │
//! │                           ValuationAccumulator                         │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │               InventoryReport / Vec<Product> / f64 / StockOverview     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each build takes its own snapshots, so a report never blocks writers
//! for longer than one clone.

use tracing::debug;

use crate::context::Inventory;
use stockwise_core::analytics::{visit_all, LowStockDetector, SummaryCollector, ValuationAccumulator};
use stockwise_core::{InventoryElement, InventoryReport, Product, StockOverview};

/// Builds reports from an [`Inventory`].
#[derive(Clone, Copy)]
pub struct ReportAssembler<'a> {
    inventory: &'a Inventory,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(inventory: &'a Inventory) -> Self {
        ReportAssembler { inventory }
    }

    /// One summary line per entity, grouped by type.
    pub async fn build_inventory_report(&self) -> InventoryReport {
        let products = self.inventory.products().get_all().await;
        let suppliers = self.inventory.suppliers().get_all().await;
        let transactions = self.inventory.transactions().get_all().await;

        let mut collector = SummaryCollector::new();
        visit_all(&products, &mut collector);
        visit_all(&suppliers, &mut collector);
        visit_all(&transactions, &mut collector);

        let report = InventoryReport::from(collector);
        debug!(
            products = report.product_summaries.len(),
            suppliers = report.supplier_summaries.len(),
            transactions = report.transaction_summaries.len(),
            "Built inventory report"
        );
        report
    }

    /// Products below their reorder threshold, in repository order.
    pub async fn build_low_stock_report(&self) -> Vec<Product> {
        let products = self.inventory.products().get_all().await;

        let mut detector = LowStockDetector::new();
        visit_all(&products, &mut detector);

        let low = detector.into_products();
        debug!(count = low.len(), "Built low-stock report");
        low
    }

    /// Total value of stock on hand.
    pub async fn build_valuation_report(&self) -> f64 {
        let products = self.inventory.products().get_all().await;

        let mut valuation = ValuationAccumulator::new();
        visit_all(&products, &mut valuation);

        debug!(total = valuation.total_value(), "Built valuation report");
        valuation.total_value()
    }

    /// Headline counts plus low-stock and valuation, from one product pass.
    pub async fn build_stock_overview(&self) -> StockOverview {
        let products = self.inventory.products().get_all().await;

        let mut detector = LowStockDetector::new();
        let mut valuation = ValuationAccumulator::new();
        for product in &products {
            product.accept(&mut detector);
            product.accept(&mut valuation);
        }

        StockOverview {
            product_count: products.len(),
            supplier_count: self.inventory.suppliers().len().await,
            transaction_count: self.inventory.transactions().len().await,
            low_stock_count: detector.low_stock_products().len(),
            total_value: valuation.total_value(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
