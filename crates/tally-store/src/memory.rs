//! # In-Memory Record Store
//!
//! A complete [`RecordStore`] implementation backed by in-process tables.
//! Used by tests, the demo terminal, and offline operation.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          MemoryStore                                    │
//! │                                                                         │
//! │   RwLock<Tables>                  watch senders                         │
//! │   ┌──────────────────────┐        ┌──────────────────────────────┐     │
//! │   │ sales:    Vec<Sale>  │──────▶ │ sales_tx:    Arc<[Sale]>     │     │
//! │   │ expenses: Vec<...>   │──────▶ │ expenses_tx: Arc<[Expense]>  │     │
//! │   │ openings: Vec<...>   │──────▶ │ openings_tx: Arc<[...]>      │     │
//! │   │ closures: Vec<...>   │──────▶ │ closures_tx: Arc<[...]>      │     │
//! │   │ settings: Option<..> │        └──────────────────────────────┘     │
//! │   │ session_version: u64 │                                             │
//! │   └──────────────────────┘        every mutation republishes the       │
//! │                                   COMPLETE collection                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Denial
//! [`MemoryStore::set_write_denied`] makes every mutating operation fail
//! with a write-side [`StoreError::PermissionDenied`], which is how tests
//! exercise the degraded read-only mode without a real permission system.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::types::{CashClosure, CashOpening, CompanySettings, Expense, Sale};

use crate::error::{StoreError, StoreResult};
use crate::store::RecordStore;

// =============================================================================
// Tables
// =============================================================================

/// The record tables, guarded together so a snapshot is always internally
/// consistent.
#[derive(Debug, Default)]
struct Tables {
    sales: Vec<Sale>,
    expenses: Vec<Expense>,
    openings: Vec<CashOpening>,
    closures: Vec<CashClosure>,
    settings: Option<CompanySettings>,

    /// Bumped on every openings/closures mutation. The CAS token for
    /// conditional appends.
    session_version: u64,
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process record store with live collection views.
pub struct MemoryStore {
    tables: RwLock<Tables>,

    sales_tx: watch::Sender<Arc<[Sale]>>,
    expenses_tx: watch::Sender<Arc<[Expense]>>,
    openings_tx: watch::Sender<Arc<[CashOpening]>>,
    closures_tx: watch::Sender<Arc<[CashClosure]>>,

    /// Test/demo toggle: when set, every write fails with a permission
    /// error while reads keep working.
    write_denied: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (sales_tx, _) = watch::channel(Arc::from(Vec::new()));
        let (expenses_tx, _) = watch::channel(Arc::from(Vec::new()));
        let (openings_tx, _) = watch::channel(Arc::from(Vec::new()));
        let (closures_tx, _) = watch::channel(Arc::from(Vec::new()));

        MemoryStore {
            tables: RwLock::new(Tables::default()),
            sales_tx,
            expenses_tx,
            openings_tx,
            closures_tx,
            write_denied: AtomicBool::new(false),
        }
    }

    /// Turns write denial on or off.
    pub fn set_write_denied(&self, denied: bool) {
        self.write_denied.store(denied, Ordering::SeqCst);
    }

    /// Fails the calling operation when writes are denied.
    fn check_writable(&self, operation: &str) -> StoreResult<()> {
        if self.write_denied.load(Ordering::SeqCst) {
            return Err(StoreError::write_denied(operation));
        }
        Ok(())
    }

    /// Assigns a fresh id, replacing whatever the caller put there.
    fn assign_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn publish_sales(&self, tables: &Tables) {
        self.sales_tx.send_replace(Arc::from(tables.sales.clone()));
    }

    fn publish_expenses(&self, tables: &Tables) {
        self.expenses_tx
            .send_replace(Arc::from(tables.expenses.clone()));
    }

    fn publish_openings(&self, tables: &Tables) {
        self.openings_tx
            .send_replace(Arc::from(tables.openings.clone()));
    }

    fn publish_closures(&self, tables: &Tables) {
        self.closures_tx
            .send_replace(Arc::from(tables.closures.clone()));
    }

    /// Verifies a conditional write's version token.
    fn check_version(tables: &Tables, expected: u64) -> StoreResult<()> {
        if tables.session_version != expected {
            return Err(StoreError::VersionConflict {
                expected,
                actual: tables.session_version,
            });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    async fn append_sale(&self, mut sale: Sale) -> StoreResult<Sale> {
        self.check_writable("append_sale")?;

        sale.id = Self::assign_id();
        debug!(id = %sale.id, total = %sale.total, "Appending sale");

        let mut tables = self.tables.write().await;
        tables.sales.push(sale.clone());
        self.publish_sales(&tables);
        Ok(sale)
    }

    async fn replace_sale(&self, sale: Sale) -> StoreResult<Sale> {
        self.check_writable("replace_sale")?;

        let mut tables = self.tables.write().await;
        let slot = tables
            .sales
            .iter_mut()
            .find(|s| s.id == sale.id)
            .ok_or_else(|| StoreError::not_found("sale", &sale.id))?;

        debug!(id = %sale.id, total = %sale.total, "Replacing sale");
        *slot = sale.clone();
        self.publish_sales(&tables);
        Ok(sale)
    }

    async fn delete_sale(&self, id: &str) -> StoreResult<()> {
        self.check_writable("delete_sale")?;

        let mut tables = self.tables.write().await;
        let before = tables.sales.len();
        tables.sales.retain(|s| s.id != id);
        if tables.sales.len() == before {
            return Err(StoreError::not_found("sale", id));
        }

        debug!(id = %id, "Deleted sale");
        self.publish_sales(&tables);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Expenses
    // -------------------------------------------------------------------------

    async fn append_expense(&self, mut expense: Expense) -> StoreResult<Expense> {
        self.check_writable("append_expense")?;

        expense.id = Self::assign_id();
        debug!(id = %expense.id, amount = %expense.amount, "Appending expense");

        let mut tables = self.tables.write().await;
        tables.expenses.push(expense.clone());
        self.publish_expenses(&tables);
        Ok(expense)
    }

    async fn delete_expense(&self, id: &str) -> StoreResult<()> {
        self.check_writable("delete_expense")?;

        let mut tables = self.tables.write().await;
        let before = tables.expenses.len();
        tables.expenses.retain(|e| e.id != id);
        if tables.expenses.len() == before {
            return Err(StoreError::not_found("expense", id));
        }

        debug!(id = %id, "Deleted expense");
        self.publish_expenses(&tables);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Session Logs
    // -------------------------------------------------------------------------

    async fn append_opening(
        &self,
        mut opening: CashOpening,
        expected_version: u64,
    ) -> StoreResult<CashOpening> {
        self.check_writable("append_opening")?;

        let mut tables = self.tables.write().await;
        Self::check_version(&tables, expected_version)?;

        opening.id = Self::assign_id();
        tables.session_version += 1;
        info!(
            id = %opening.id,
            amount = %opening.amount,
            version = tables.session_version,
            "Register opening recorded"
        );

        tables.openings.push(opening.clone());
        self.publish_openings(&tables);
        Ok(opening)
    }

    async fn append_closure(
        &self,
        mut closure: CashClosure,
        expected_version: u64,
    ) -> StoreResult<CashClosure> {
        self.check_writable("append_closure")?;

        let mut tables = self.tables.write().await;
        Self::check_version(&tables, expected_version)?;

        closure.id = Self::assign_id();
        tables.session_version += 1;
        info!(
            id = %closure.id,
            total_cash = %closure.total_cash,
            version = tables.session_version,
            "Register closure recorded"
        );

        tables.closures.push(closure.clone());
        self.publish_closures(&tables);
        Ok(closure)
    }

    async fn delete_opening(&self, id: &str) -> StoreResult<()> {
        self.check_writable("delete_opening")?;

        let mut tables = self.tables.write().await;
        let before = tables.openings.len();
        tables.openings.retain(|o| o.id != id);
        if tables.openings.len() == before {
            return Err(StoreError::not_found("opening", id));
        }

        tables.session_version += 1;
        info!(id = %id, version = tables.session_version, "Deleted opening");
        self.publish_openings(&tables);
        Ok(())
    }

    async fn delete_closure(&self, id: &str) -> StoreResult<()> {
        self.check_writable("delete_closure")?;

        let mut tables = self.tables.write().await;
        let before = tables.closures.len();
        tables.closures.retain(|c| c.id != id);
        if tables.closures.len() == before {
            return Err(StoreError::not_found("closure", id));
        }

        tables.session_version += 1;
        info!(id = %id, version = tables.session_version, "Deleted closure");
        self.publish_closures(&tables);
        Ok(())
    }

    async fn session_version(&self) -> StoreResult<u64> {
        Ok(self.tables.read().await.session_version)
    }

    // -------------------------------------------------------------------------
    // Settings Singleton
    // -------------------------------------------------------------------------

    async fn settings(&self) -> StoreResult<Option<CompanySettings>> {
        Ok(self.tables.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: CompanySettings) -> StoreResult<()> {
        self.check_writable("save_settings")?;

        let mut tables = self.tables.write().await;
        info!(name = %settings.name, "Settings saved");
        tables.settings = Some(settings);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Live Views
    // -------------------------------------------------------------------------

    fn watch_sales(&self) -> watch::Receiver<Arc<[Sale]>> {
        self.sales_tx.subscribe()
    }

    fn watch_expenses(&self) -> watch::Receiver<Arc<[Expense]>> {
        self.expenses_tx.subscribe()
    }

    fn watch_openings(&self) -> watch::Receiver<Arc<[CashOpening]>> {
        self.openings_tx.subscribe()
    }

    fn watch_closures(&self) -> watch::Receiver<Arc<[CashClosure]>> {
        self.closures_tx.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
