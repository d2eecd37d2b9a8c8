//! # Report Types
//!
//! Structured report data returned to the presentation layer.
//! Assembly (fetching from repositories) lives in `stockwise-db`.

use serde::{Deserialize, Serialize};

use crate::analytics::SummaryCollector;

/// Textual summaries of every entity, grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub product_summaries: Vec<String>,
    pub supplier_summaries: Vec<String>,
    pub transaction_summaries: Vec<String>,
}

impl InventoryReport {
    /// True when no entity of any type was summarized.
    pub fn is_empty(&self) -> bool {
        self.product_summaries.is_empty()
            && self.supplier_summaries.is_empty()
            && self.transaction_summaries.is_empty()
    }
}

impl From<SummaryCollector> for InventoryReport {
    fn from(collector: SummaryCollector) -> Self {
        let (product_summaries, supplier_summaries, transaction_summaries) =
            collector.into_parts();
        InventoryReport {
            product_summaries,
            supplier_summaries,
            transaction_summaries,
        }
    }
}

/// Headline numbers for a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockOverview {
    pub product_count: usize,
    pub supplier_count: usize,
    pub transaction_count: usize,
    pub low_stock_count: usize,
    pub total_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::InventoryElement;
    use crate::types::Product;

    #[test]
    fn test_report_from_collector() {
        let mut collector = SummaryCollector::new();
        Product::new("P1", "Bolt", 1, 2, 3.0).accept(&mut collector);

        let report = InventoryReport::from(collector);
        assert!(!report.is_empty());
        assert_eq!(report.product_summaries.len(), 1);
        assert!(report.supplier_summaries.is_empty());
        assert!(InventoryReport::default().is_empty());
    }
}
