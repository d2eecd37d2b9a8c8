//! End-to-end inventory scenarios against an in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use stockwise_core::analytics::{visit_all, LowStockDetector, ValuationAccumulator};
use stockwise_core::{Product, Supplier, Transaction, TransactionType};
use stockwise_db::{
    CachedRepository, ConfigError, Database, DbConfig, DbError, DbResult, EntityStore, Inventory,
    StoreConfig,
};

async fn inventory() -> Inventory {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Inventory::load(db).await.unwrap()
}

#[tokio::test]
async fn low_stock_product_is_flagged_and_valued() {
    let inventory = inventory().await;
    inventory
        .products()
        .add(Product::new("P1", "Widget", 2, 5, 10.0))
        .await
        .unwrap();

    let reports = inventory.reports();
    let low = reports.build_low_stock_report().await;
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id, "P1");
    assert!((reports.build_valuation_report().await - 20.0).abs() < 1e-9);

    // Same result straight through the visitors.
    let products = inventory.products().get_all().await;
    let mut detector = LowStockDetector::new();
    let mut valuation = ValuationAccumulator::new();
    visit_all(&products, &mut detector);
    visit_all(&products, &mut valuation);
    assert_eq!(detector.low_stock_products().len(), 1);
    assert!((valuation.total_value() - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn caller_applied_restock_updates_product() {
    let inventory = inventory().await;
    inventory
        .products()
        .add(Product::new("P1", "Widget", 10, 5, 1.0))
        .await
        .unwrap();

    let restock = Transaction::new(
        "T1",
        "P1",
        TransactionType::Restock,
        5,
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap(),
    );
    inventory.transactions().add(restock.clone()).await.unwrap();

    let mut product = inventory.products().find_by_id("P1").await.unwrap();
    restock.apply_to(&mut product);
    inventory.products().update(product).await.unwrap();

    assert_eq!(inventory.products().find_by_id("P1").await.unwrap().quantity, 15);
    assert_eq!(inventory.transactions().get_all().await, vec![restock]);

    // A fresh context sees the same state.
    let reopened = Inventory::load(inventory.database().clone()).await.unwrap();
    assert_eq!(reopened.products().find_by_id("P1").await.unwrap().quantity, 15);
    assert_eq!(reopened.transactions().len().await, 1);
}

#[tokio::test]
async fn deleting_unknown_product_fails_without_side_effects() {
    let inventory = inventory().await;
    inventory
        .products()
        .add(Product::new("P2", "Gear", 3, 1, 4.0))
        .await
        .unwrap();
    let before = inventory.products().get_all().await;

    let err = inventory.products().delete("P1").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
    assert_eq!(inventory.products().get_all().await, before);
}

#[tokio::test]
async fn reload_is_idempotent() {
    let inventory = inventory().await;
    for (id, qty) in [("P1", 1), ("P2", 2), ("P3", 3)] {
        inventory
            .products()
            .add(Product::new(id, "Part", qty, 2, 1.5))
            .await
            .unwrap();
    }

    inventory.products().load_all().await.unwrap();
    let first = inventory.products().get_all().await;
    inventory.products().load_all().await.unwrap();
    let second = inventory.products().get_all().await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn referenced_product_delete_is_rejected() {
    let inventory = inventory().await;
    inventory
        .products()
        .add(Product::new("P1", "Widget", 10, 5, 1.0))
        .await
        .unwrap();
    inventory
        .record_movement(Transaction::new("T1", "P1", TransactionType::Sale, 4, Utc::now()))
        .await
        .unwrap();

    let err = inventory.products().delete("P1").await.unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

    let product = inventory.products().find_by_id("P1").await.unwrap();
    assert_eq!(product.quantity, 6);
}

#[tokio::test]
async fn supplier_report_lists_linked_products() {
    let inventory = inventory().await;
    inventory
        .products()
        .add(Product::new("P1", "Widget", 10, 5, 1.0))
        .await
        .unwrap();

    let mut supplier = Supplier::new("S1", "Acme", "orders@acme.test", "555-0100", "1 Road")
        .with_date_added(Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap());
    supplier.add_product("P1");
    inventory.suppliers().add(supplier).await.unwrap();

    let report = inventory.reports().build_inventory_report().await;
    assert_eq!(
        report.supplier_summaries,
        ["Supplier [id=S1, name=Acme, email=orders@acme.test, phone=555-0100, address=1 Road, dateAdded=2024-01-02 08:00, suppliedProducts=[P1]]"]
    );
}

#[tokio::test]
async fn missing_credential_is_fatal() {
    let result = StoreConfig::from_lookup(|name| match name {
        "STOCKWISE_DB_URL" => Some("inventory.db".to_string()),
        _ => None,
    });
    assert!(matches!(result, Err(ConfigError::MissingCredential(_))));

    let empty = StoreConfig::from_lookup(|name| match name {
        "STOCKWISE_DB_PASSWORD" => Some(String::new()),
        _ => None,
    });
    assert!(matches!(empty, Err(ConfigError::MissingCredential(_))));

    // Surfaced through DbError at the connect boundary.
    let err: DbError = result.unwrap_err().into();
    assert!(matches!(err, DbError::Config(_)));
}

#[tokio::test]
async fn connect_with_file_store() {
    let path = std::env::temp_dir().join(format!("stockwise-{}.db", stockwise_db::generate_id()));
    let path_str = path.display().to_string();
    let config = StoreConfig::from_lookup(|name| match name {
        "STOCKWISE_DB_PASSWORD" => Some("test".to_string()),
        "STOCKWISE_DB_URL" => Some(path_str.clone()),
        _ => None,
    })
    .unwrap();

    let inventory = Inventory::connect(&config).await.unwrap();
    inventory
        .products()
        .add(Product::new("P1", "Widget", 1, 0, 2.0))
        .await
        .unwrap();
    inventory.database().close().await;

    let reopened = Inventory::connect(&config).await.unwrap();
    assert_eq!(reopened.products().len().await, 1);
    reopened.database().close().await;

    let _ = std::fs::remove_file(&path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_keep_cache_and_store_in_step() {
    let path = std::env::temp_dir().join(format!("stockwise-{}.db", stockwise_db::generate_id()));
    let db = Database::new(DbConfig::new(path.clone()).max_connections(8))
        .await
        .unwrap();
    let inventory = Arc::new(Inventory::load(db).await.unwrap());

    for i in 0..20 {
        inventory
            .products()
            .add(Product::new(format!("P{}", i), "Part", 100, 5, 1.0))
            .await
            .unwrap();
    }

    // Even workers rewrite whole records, odd workers record restocks.
    let mut workers = Vec::new();
    for worker in 0..16usize {
        let inventory = Arc::clone(&inventory);
        workers.push(tokio::spawn(async move {
            for round in 0..10usize {
                let id = format!("P{}", (worker + round) % 20);
                if worker % 2 == 0 {
                    let mut product = inventory.products().find_by_id(&id).await.unwrap();
                    product.threshold = round as i64;
                    inventory.products().update(product).await.unwrap();
                } else {
                    let restock = Transaction::new(
                        format!("T{}-{}", worker, round),
                        id,
                        TransactionType::Restock,
                        1,
                        Utc::now(),
                    );
                    inventory.record_movement(restock).await.unwrap();
                }
            }
        }));
    }
    for worker in workers {
        worker.await.unwrap();
    }

    let products = inventory.products().get_all().await;
    let transactions = inventory.transactions().get_all().await;
    assert_eq!(products.len(), 20);
    assert_eq!(transactions.len(), 80);

    inventory.reload().await.unwrap();
    assert_eq!(inventory.products().get_all().await, products);
    assert_eq!(inventory.transactions().get_all().await, transactions);

    inventory.database().close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

// =============================================================================
// Failing store
// =============================================================================

/// Store whose every operation fails.
struct OfflineStore;

#[async_trait]
impl EntityStore for OfflineStore {
    type Entity = Supplier;

    async fn fetch_all(&self) -> DbResult<Vec<Supplier>> {
        Err(DbError::ConnectionFailed("offline".to_string()))
    }

    async fn insert(&self, _entity: &Supplier) -> DbResult<()> {
        Err(DbError::ConnectionFailed("offline".to_string()))
    }

    async fn update(&self, _entity: &Supplier) -> DbResult<u64> {
        Err(DbError::ConnectionFailed("offline".to_string()))
    }

    async fn delete(&self, _id: &str) -> DbResult<u64> {
        Err(DbError::ConnectionFailed("offline".to_string()))
    }
}

#[tokio::test]
async fn unreachable_store_fails_construction() {
    let result = CachedRepository::new(OfflineStore).await;
    assert!(matches!(result, Err(DbError::ConnectionFailed(_))));
}
