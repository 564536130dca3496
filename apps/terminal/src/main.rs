//! # Tally Terminal
//!
//! Demo binary: runs one full register session against an in-memory store
//! and prints the closure report.
//!
//! ## Session Walkthrough
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Demo Session                                     │
//! │                                                                         │
//! │  1. Seed a small catalog and the company settings                       │
//! │  2. Open the register with the configured float                         │
//! │  3. Ring three sales (cash / debit / cash) through the cart             │
//! │  4. Record a cash expense                                               │
//! │  5. Amend the first sale as an admin (quantity fix)                     │
//! │  6. Close the register; the report lands on stdout via the sink         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! - `RUST_LOG` - log filter (default `info,tally=debug`)
//! - `TALLY_STORE_NAME` - business name on the report
//! - `TALLY_OPENING_FLOAT_CENTS` - opening float in minor units (default 100000)

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tally_core::amend::SaleEditor;
use tally_core::cart::Cart;
use tally_core::money::Money;
use tally_core::types::{
    CompanySettings, Expense, ExpenseCategory, PaymentMethod, Product, Role,
};
use tally_register::{CollabError, Register, ReportSink, StockControl};
use tally_store::MemoryStore;

// =============================================================================
// Configuration
// =============================================================================

/// Env-var configuration with development defaults.
#[derive(Debug, Clone)]
struct TerminalConfig {
    store_name: String,
    opening_float: Money,
}

impl TerminalConfig {
    /// Reads `TALLY_*` variables, falling back to defaults.
    fn from_env() -> Self {
        let store_name = std::env::var("TALLY_STORE_NAME")
            .unwrap_or_else(|_| "Almacén Don Mario".to_string());
        let opening_float = std::env::var("TALLY_OPENING_FLOAT_CENTS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .map(Money::from_cents)
            .unwrap_or(Money::from_cents(100_000));

        TerminalConfig {
            store_name,
            opening_float,
        }
    }
}

// =============================================================================
// Collaborators
// =============================================================================

/// Report sink that prints to stdout.
struct StdoutSink;

#[async_trait]
impl ReportSink for StdoutSink {
    async fn deliver(&self, destination: &str, report: &str) -> Result<(), CollabError> {
        println!("--- report for {destination} ---");
        println!("{report}");
        Ok(())
    }
}

/// In-memory inventory, clamped at zero.
struct DemoInventory {
    stock: Mutex<HashMap<String, i64>>,
}

impl DemoInventory {
    fn new(products: &[Product]) -> Self {
        let stock = products.iter().map(|p| (p.id.clone(), p.stock)).collect();
        DemoInventory {
            stock: Mutex::new(stock),
        }
    }

    async fn on_hand(&self, product_id: &str) -> i64 {
        *self.stock.lock().await.get(product_id).unwrap_or(&0)
    }
}

#[async_trait]
impl StockControl for DemoInventory {
    async fn adjust_stock(&self, product_id: &str, delta: i64) -> Result<(), CollabError> {
        let mut stock = self.stock.lock().await;
        let units = stock
            .get_mut(product_id)
            .ok_or_else(|| format!("unknown product {product_id}"))?;
        *units = (*units + delta).max(0);
        Ok(())
    }
}

// =============================================================================
// Catalog Seed
// =============================================================================

/// A small corner-store catalog: (id, name, category, price cents, stock).
const CATALOG: &[(&str, &str, &str, i64, i64)] = &[
    ("p-yerba", "Yerba Mate 500g", "Almacén", 2500, 40),
    ("p-azucar", "Azúcar 1kg", "Almacén", 1200, 60),
    ("p-fideos", "Fideos Spaghetti", "Almacén", 900, 80),
    ("p-leche", "Leche Entera 1L", "Lácteos", 1100, 30),
    ("p-queso", "Queso Cremoso 300g", "Lácteos", 3400, 15),
    ("p-gaseosa", "Gaseosa Cola 2.25L", "Bebidas", 2800, 25),
    ("p-agua", "Agua Mineral 2L", "Bebidas", 1000, 50),
];

fn seed_catalog() -> Vec<Product> {
    CATALOG
        .iter()
        .map(|&(id, name, category, price, stock)| Product {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price: Money::from_cents(price),
            stock,
        })
        .collect()
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    init_tracing();
    let config = TerminalConfig::from_env();
    info!(store = %config.store_name, float = %config.opening_float, "Tally terminal starting");

    if let Err(e) = run_session(&config).await {
        warn!(error = %e, "Demo session failed");
        std::process::exit(1);
    }
}

async fn run_session(config: &TerminalConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = seed_catalog();
    let inventory = Arc::new(DemoInventory::new(&catalog));

    let store = Arc::new(MemoryStore::new());
    let register = Register::new(store)
        .with_report_sink(Arc::new(StdoutSink))
        .with_stock_control(inventory.clone());

    register
        .save_settings(
            Role::Admin,
            CompanySettings {
                name: config.store_name.clone(),
                address: "Av. Siempreviva 742".into(),
                phone: "11-5555-0000".into(),
                footer_message: "¡Gracias por su compra!".into(),
                admin_pin: None,
                report_contact: Some("owner@example.com".into()),
            },
        )
        .await?;

    // Live projection: log every derived-state change as it happens
    let (mut snapshot_rx, projector) = register.watch();
    let follower = tokio::spawn(async move {
        while snapshot_rx.changed().await.is_ok() {
            let snapshot = snapshot_rx.borrow_and_update().clone();
            info!(
                is_open = snapshot.is_open,
                net_cash = %snapshot.reconciliation.net_cash,
                transactions = snapshot.totals.transaction_count,
                "Register snapshot"
            );
        }
    });

    // 1. Open
    let opening = register
        .open_register(config.opening_float, Some("morning shift".into()))
        .await?;
    info!(id = %opening.id, "Session opened");

    // 2. Three sales through the cart
    let mut cart = Cart::new();
    cart.add_product(&catalog[0])?;
    cart.add_product(&catalog[1])?;
    let first = register
        .record_sale(cart.checkout(PaymentMethod::Cash, Utc::now())?)
        .await?;

    let mut cart = Cart::new();
    cart.add_product(&catalog[4])?;
    cart.set_discount_percent(10)?;
    register
        .record_sale(cart.checkout(PaymentMethod::Debit, Utc::now())?)
        .await?;

    let mut cart = Cart::new();
    cart.add_product(&catalog[5])?;
    cart.add_product(&catalog[6])?;
    register
        .record_sale(cart.checkout(PaymentMethod::Cash, Utc::now())?)
        .await?;

    // 3. A cash expense
    register
        .record_expense(Expense {
            id: String::new(),
            date: Utc::now(),
            description: "Reparto de mercadería".into(),
            amount: Money::from_cents(1500),
            category: ExpenseCategory::Merchandise,
            payment_method: PaymentMethod::Cash,
        })
        .await?;

    // 4. Admin fixes the first sale: one more yerba was actually taken
    let mut editor = SaleEditor::new(first);
    editor.add_product(&catalog[0])?;
    let (_, impact) = register.commit_sale(Role::Admin, editor).await?;
    for delta in &impact {
        let on_hand = inventory.on_hand(&delta.product_id).await;
        warn!(
            product = %delta.name,
            delta = delta.delta,
            on_hand,
            "Amendment stock advisory (not applied automatically)"
        );
    }

    // 5. Close: the report prints via the stdout sink
    let closure = register
        .close_register(Some("end of day".into()))
        .await?;
    info!(
        total_cash = %closure.total_cash,
        total_sales = %closure.total_sales,
        transactions = closure.transaction_count,
        "Session closed"
    );

    // Let the fire-and-forget report task reach stdout before exiting
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    projector.shutdown().await;
    follower.abort();

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - show debug messages
/// - `RUST_LOG=tally=trace` - trace for tally crates only
/// - Default: INFO overall, DEBUG for tally crates
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tally=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
