//! # Seed Data Generator
//!
//! Populates the store with demo inventory and prints the reports.
//!
//! ## Usage
//! ```bash
//! # Store location and credential come from the environment
//! export STOCKWISE_DB_PASSWORD=dev
//! export STOCKWISE_DB_URL=./stockwise_dev.db
//!
//! # Seed 40 products (default) and print reports
//! cargo run -p stockwise-db --bin seed
//!
//! # Custom amount, reports as JSON
//! cargo run -p stockwise-db --bin seed -- --count 100 --json
//! ```
//!
//! ## Generated Data
//! - Products across a few categories, some below their reorder level
//! - One supplier per category, linked to that category's products
//! - A restock and a sale for every fifth product, recorded as movements

use std::env;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stockwise_core::validation::{check_supplier_refs, validate_product, validate_transaction};
use stockwise_core::{InventoryReport, Product, StockOverview, Supplier, Transaction, TransactionType};
use stockwise_db::{generate_id, Inventory, StoreConfig};

/// Product categories for realistic demo data
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "HW",
        "Hardware Direct",
        &["Hex Bolt", "Wing Nut", "Flat Washer", "Wood Screw", "Wall Anchor"],
    ),
    (
        "EL",
        "Volt Supply Co",
        &["Fuse 10A", "Cable Tie", "Wire Nut", "Junction Box", "Toggle Switch"],
    ),
    (
        "PL",
        "Pipeworks Ltd",
        &["Elbow Joint", "Pipe Clamp", "Ball Valve", "Teflon Tape", "Drain Plug"],
    ),
    (
        "PT",
        "Coat & Co",
        &["Paint Roller", "Masking Tape", "Brush 2in", "Drop Cloth", "Primer 1L"],
    ),
];

/// Pack sizes with a price multiplier
const SIZES: &[(&str, f64)] = &[("Single", 1.0), ("10-Pack", 8.5)];

/// Everything the seed run prints.
#[derive(Serialize)]
struct SeedSummary {
    overview: StockOverview,
    low_stock: Vec<Product>,
    inventory: InventoryReport,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stockwise=debug,sqlx=warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 40;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(40);
                    i += 1;
                }
            }
            "--json" | "-j" => json = true,
            "--help" | "-h" => {
                println!("StockWise Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 40)");
                println!("  -j, --json         Print reports as JSON");
                println!("  -h, --help         Show this help message");
                println!();
                println!("Environment:");
                println!("  STOCKWISE_DB_URL, STOCKWISE_DB_USER, STOCKWISE_DB_PASSWORD (required),");
                println!("  STOCKWISE_DB_MAX_CONNECTIONS, RUST_LOG");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = StoreConfig::from_env()?;
    let inventory = Inventory::connect(&config).await?;

    if !inventory.products().is_empty().await {
        warn!(
            existing = inventory.products().len().await,
            "Store already has products, skipping seed"
        );
    } else {
        seed(&inventory, count).await?;
    }

    let reports = inventory.reports();
    let summary = SeedSummary {
        overview: reports.build_stock_overview().await,
        low_stock: reports.build_low_stock_report().await,
        inventory: reports.build_inventory_report().await,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    inventory.database().close().await;
    Ok(())
}

/// Generates products, suppliers and movements.
async fn seed(inventory: &Inventory, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let start = std::time::Instant::now();
    let mut generated = 0;

    'categories: for (category_idx, (code, supplier_name, names)) in CATEGORIES.iter().enumerate() {
        let mut supplier = Supplier::new(
            format!("SUP-{}", code),
            *supplier_name,
            format!("orders@{}.example", code.to_lowercase()),
            format!("555-01{:02}", category_idx),
            format!("{} Industrial Park", category_idx + 1),
        );

        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, multiplier)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break;
                }

                let seed = category_idx * 100 + name_idx * 10 + size_idx;
                let product = generate_product(code, name, size, *multiplier, seed);

                if let Err(e) = validate_product(&product) {
                    warn!(id = %product.id, error = %e, "Skipping invalid product");
                    continue;
                }
                if let Err(e) = inventory.products().add(product.clone()).await {
                    warn!(id = %product.id, error = %e, "Failed to insert product");
                    continue;
                }
                supplier.add_product(product.id.clone());

                if generated % 5 == 0 {
                    record_movements(inventory, &product.id, seed).await;
                }

                generated += 1;
            }
        }

        if !supplier.supplied_product_ids.is_empty() {
            check_supplier_refs(&supplier, &inventory.products().get_all().await)?;
            inventory.suppliers().add(supplier).await?;
        }

        if generated >= count {
            break 'categories;
        }
    }

    info!(
        products = generated,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );
    Ok(())
}

/// Records a restock followed by a smaller sale.
async fn record_movements(inventory: &Inventory, product_id: &str, seed: usize) {
    let base = Utc::now() - Duration::days((seed % 30) as i64);
    let movements = [
        (TransactionType::Restock, 10 + (seed % 15) as i64, base),
        (TransactionType::Sale, 1 + (seed % 7) as i64, base + Duration::hours(4)),
    ];

    for (kind, quantity, when) in movements {
        let tx = Transaction::new(generate_id(), product_id, kind, quantity, when);
        if let Err(e) = validate_transaction(&tx) {
            warn!(error = %e, "Skipping invalid movement");
            continue;
        }
        if let Err(e) = inventory.record_movement(tx).await {
            warn!(product_id = %product_id, error = %e, "Failed to record movement");
        }
    }
}

/// Generates a single product with deterministic pseudo-random values.
fn generate_product(category: &str, name: &str, size: &str, multiplier: f64, seed: usize) -> Product {
    let id = format!("{}-{:04}", category, seed);

    // Base price $0.49 - $12.48, scaled by pack size
    let base_price = 0.49 + ((seed * 17) % 1200) as f64 / 100.0;
    let unit_price = (base_price * multiplier * 100.0).round() / 100.0;

    // Stock 0-60, reorder level 5-24: roughly a quarter start low
    let quantity = ((seed * 7) % 61) as i64;
    let threshold = 5 + (seed % 20) as i64;

    Product::new(id, format!("{} {}", name, size), quantity, threshold, unit_price)
        .with_username("seed")
}

fn print_summary(summary: &SeedSummary) {
    let overview = &summary.overview;
    println!("StockWise Inventory");
    println!("===================");
    println!("Products:     {}", overview.product_count);
    println!("Suppliers:    {}", overview.supplier_count);
    println!("Transactions: {}", overview.transaction_count);
    println!("Total value:  {:.2}", overview.total_value);
    println!();
    println!("Low stock ({}):", overview.low_stock_count);
    for product in &summary.low_stock {
        println!("  {} ({} of {})", product.name, product.quantity, product.threshold);
    }
    println!();
    for line in summary
        .inventory
        .supplier_summaries
        .iter()
        .chain(&summary.inventory.transaction_summaries)
        .take(10)
    {
        println!("  {}", line);
    }
}
