//! # Register Service
//!
//! The operations an operator performs against the register, orchestrating
//! the pure core over the record store.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Register Operations                             │
//! │                                                                         │
//! │  SESSION                      RECORDS                PRIVILEGED (Admin) │
//! │  ───────                      ───────                ────────────────── │
//! │  open_register ──┐            record_sale            commit_sale        │
//! │  close_register ─┤ CAS on     record_expense         delete_sale        │
//! │                  │ session                            delete_expense     │
//! │  suggested_float │ version    DERIVED                delete_closure     │
//! │  float_discrep.  │            snapshot               save_settings      │
//! │                  ▼            watch (projector)                          │
//! │           append_opening /                                              │
//! │           append_closure                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Discipline
//! The register holds no state of its own beyond the live views it reads.
//! Every precondition check resolves the session from the current opening
//! and closure snapshots; every write goes through the store and only
//! becomes visible when the store republishes. A failed write changes
//! nothing the register will ever report.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use tally_core::amend::{stock_impact, SaleEditor, StockDelta};
use tally_core::money::Money;
use tally_core::reconcile::{build_closure, float_discrepancy, reconcile};
use tally_core::session::{resolve_session, SessionState};
use tally_core::totals::accumulate_session;
use tally_core::types::{
    CashClosure, CashOpening, CompanySettings, Expense, Role, Sale,
};
use tally_core::validation::{
    validate_description, validate_expense_amount, validate_notes, validate_opening_float,
    validate_settings,
};
use tally_store::{RecordStore, StoreError};

use crate::collab::{ReportSink, StockControl};
use crate::error::{RegisterError, RegisterResult};
use crate::report::render_closure_report;
use crate::snapshot::{ProjectorHandle, RegisterSnapshot, SnapshotProjector};

// =============================================================================
// Register
// =============================================================================

/// The register engine.
///
/// Cheap to clone-by-wrapping: hosts typically hold one `Arc<Register>`
/// per terminal process.
pub struct Register {
    store: Arc<dyn RecordStore>,

    /// Where closure reports go. `None` disables dispatch entirely.
    report_sink: Option<Arc<dyn ReportSink>>,

    /// Inventory collaborator for checkout stock decrements. `None` means
    /// stock is managed elsewhere.
    stock: Option<Arc<dyn StockControl>>,

    sales_rx: watch::Receiver<Arc<[Sale]>>,
    expenses_rx: watch::Receiver<Arc<[Expense]>>,
    openings_rx: watch::Receiver<Arc<[CashOpening]>>,
    closures_rx: watch::Receiver<Arc<[CashClosure]>>,
}

impl Register {
    /// Creates a register over a store, with no collaborators attached.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Register {
            sales_rx: store.watch_sales(),
            expenses_rx: store.watch_expenses(),
            openings_rx: store.watch_openings(),
            closures_rx: store.watch_closures(),
            store,
            report_sink: None,
            stock: None,
        }
    }

    /// Attaches the closure-report collaborator.
    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.report_sink = Some(sink);
        self
    }

    /// Attaches the inventory collaborator.
    pub fn with_stock_control(mut self, stock: Arc<dyn StockControl>) -> Self {
        self.stock = Some(stock);
        self
    }

    // =========================================================================
    // Derived State
    // =========================================================================

    /// Resolves the session from the current log snapshots.
    pub fn state(&self) -> SessionState {
        let openings = self.openings_rx.borrow().clone();
        let closures = self.closures_rx.borrow().clone();
        resolve_session(&openings, &closures)
    }

    /// True when a session is in progress.
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// What the last closure left in the drawer, offered to the operator
    /// as the float for the next opening.
    pub fn suggested_float(&self) -> Option<Money> {
        self.state().suggested_float()
    }

    /// Compares a declared float against the last closure's drawer.
    ///
    /// `Some(diff)` means the drawer does not match what was counted out
    /// last time; the host should warn and ask the operator to confirm.
    /// The register itself never blocks on a mismatch.
    pub fn float_discrepancy(&self, declared: Money) -> Option<Money> {
        match self.state() {
            SessionState::Closed { last_closure } => {
                float_discrepancy(declared, Some(&last_closure))
            }
            _ => None,
        }
    }

    /// Computes the full derived snapshot on demand.
    pub async fn snapshot(&self) -> RegisterResult<RegisterSnapshot> {
        let sales = self.sales_rx.borrow().clone();
        let expenses = self.expenses_rx.borrow().clone();
        let openings = self.openings_rx.borrow().clone();
        let closures = self.closures_rx.borrow().clone();
        let version = self.store.session_version().await?;

        Ok(RegisterSnapshot::compute(
            &openings, &closures, &sales, &expenses, version,
        ))
    }

    /// Starts the reactive projection: a background task that republishes
    /// the snapshot on every collection change.
    pub fn watch(&self) -> (watch::Receiver<RegisterSnapshot>, ProjectorHandle) {
        let (projector, snapshot_rx, handle) = SnapshotProjector::new(self.store.clone());
        tokio::spawn(projector.run());
        (snapshot_rx, handle)
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Opens the register with a declared float.
    ///
    /// ## Preconditions
    /// - No session in progress ([`RegisterError::AlreadyOpen`])
    /// - Float is non-negative; notes within length limits
    ///
    /// The append is conditional on the session-log version read here, so
    /// a second terminal racing this call loses with a version conflict
    /// instead of producing a stray opening.
    pub async fn open_register(
        &self,
        declared_float: Money,
        notes: Option<String>,
    ) -> RegisterResult<CashOpening> {
        validate_opening_float(declared_float)?;
        if let Some(notes) = &notes {
            validate_notes(notes)?;
        }

        if self.state().is_open() {
            return Err(RegisterError::AlreadyOpen);
        }

        if let Some(diff) = self.float_discrepancy(declared_float) {
            // Informational: the host is expected to have confirmed this
            // with the operator already
            info!(discrepancy = %diff, "Opening float differs from last counted drawer");
        }

        let version = self.store.session_version().await?;
        let opening = CashOpening {
            id: String::new(),
            date: Utc::now(),
            amount: declared_float,
            notes,
        };

        let stored = self.store.append_opening(opening, version).await?;
        info!(id = %stored.id, float = %stored.amount, "Register opened");
        Ok(stored)
    }

    /// Closes the register, freezing the session's reconciliation into an
    /// immutable closure record.
    ///
    /// ## Preconditions
    /// - A session is in progress ([`RegisterError::NotOpen`])
    ///
    /// The closure's figures come from the same resolver → accumulator →
    /// reconcile pipeline every other reader uses; its timestamp becomes
    /// the next session's cutoff. Report dispatch is fire-and-forget and
    /// can never fail the close.
    pub async fn close_register(&self, notes: Option<String>) -> RegisterResult<CashClosure> {
        if let Some(notes) = &notes {
            validate_notes(notes)?;
        }

        let state = self.state();
        if !state.is_open() {
            return Err(RegisterError::NotOpen);
        }

        let sales = self.sales_rx.borrow().clone();
        let expenses = self.expenses_rx.borrow().clone();
        let totals = accumulate_session(&sales, &expenses, state.cutoff());
        let recon = reconcile(&state, &totals);
        let closure = build_closure(&recon, notes, Utc::now());

        let version = self.store.session_version().await?;
        let stored = self.store.append_closure(closure, version).await?;
        info!(
            id = %stored.id,
            total_cash = %stored.total_cash,
            total_sales = %stored.total_sales,
            transactions = stored.transaction_count,
            "Register closed"
        );

        self.dispatch_report(stored.clone()).await;
        Ok(stored)
    }

    /// Renders and sends the closure report without waiting for delivery.
    async fn dispatch_report(&self, closure: CashClosure) {
        let Some(sink) = self.report_sink.clone() else {
            return;
        };

        let settings = match self.store.settings().await {
            Ok(Some(settings)) => settings,
            Ok(None) => CompanySettings::default(),
            Err(e) => {
                warn!(error = %e, "Could not load settings, skipping closure report");
                return;
            }
        };

        let Some(contact) = settings.report_contact.clone() else {
            debug!("No report contact configured, skipping closure report");
            return;
        };

        let report = render_closure_report(&closure, &settings);
        tokio::spawn(async move {
            if let Err(e) = sink.deliver(&contact, &report).await {
                warn!(contact = %contact, error = %e, "Closure report delivery failed");
            } else {
                info!(contact = %contact, "Closure report delivered");
            }
        });
    }

    // =========================================================================
    // Record Traffic
    // =========================================================================

    /// Appends a checked-out sale and requests the matching stock
    /// decrements from the inventory collaborator.
    ///
    /// Stock adjustment is best-effort: a failed decrement is logged and
    /// the sale stands, matching drawer-first retail reality.
    pub async fn record_sale(&self, mut sale: Sale) -> RegisterResult<Sale> {
        // A sale never lands with totals that disagree with its lines
        sale.recompute_totals();

        let stored = self.store.append_sale(sale).await?;
        debug!(id = %stored.id, total = %stored.total, "Sale recorded");

        if let Some(stock) = &self.stock {
            for item in &stored.items {
                if let Err(e) = stock.adjust_stock(&item.id, -item.quantity).await {
                    warn!(
                        product_id = %item.id,
                        delta = -item.quantity,
                        error = %e,
                        "Stock decrement failed, inventory needs manual reconciliation"
                    );
                }
            }
        }

        Ok(stored)
    }

    /// Records an expense. Validated before any store call.
    pub async fn record_expense(&self, expense: Expense) -> RegisterResult<Expense> {
        validate_description(&expense.description)?;
        validate_expense_amount(expense.amount)?;

        let stored = self.store.append_expense(expense).await?;
        debug!(id = %stored.id, amount = %stored.amount, "Expense recorded");
        Ok(stored)
    }

    // =========================================================================
    // Privileged Operations
    // =========================================================================

    /// Persists an amended sale, replacing the stored version by identity.
    ///
    /// Returns the stored sale together with the stock impact of the
    /// amendment. Stock is NEVER adjusted here: the operator decides
    /// whether the reported deltas reflect goods that actually moved.
    pub async fn commit_sale(
        &self,
        role: Role,
        editor: SaleEditor,
    ) -> RegisterResult<(Sale, Vec<StockDelta>)> {
        require_admin(role, "commit_sale")?;

        let amended = editor.into_sale();
        let before = self
            .find_sale(&amended.id)
            .ok_or_else(|| StoreError::not_found("sale", &amended.id))?;

        let impact = stock_impact(&before.items, &amended.items);
        let stored = self.store.replace_sale(amended).await?;

        if !impact.is_empty() {
            warn!(
                id = %stored.id,
                deltas = impact.len(),
                "Sale amended; stock was NOT adjusted, review the reported deltas"
            );
        }
        info!(id = %stored.id, total = %stored.total, "Sale amendment committed");
        Ok((stored, impact))
    }

    /// Deletes a sale and reports the full restock advisory.
    pub async fn delete_sale(&self, role: Role, id: &str) -> RegisterResult<Vec<StockDelta>> {
        require_admin(role, "delete_sale")?;

        let before = self
            .find_sale(id)
            .ok_or_else(|| StoreError::not_found("sale", id))?;
        let impact = stock_impact(&before.items, &[]);

        self.store.delete_sale(id).await?;
        warn!(
            id = %id,
            deltas = impact.len(),
            "Sale deleted; stock was NOT adjusted, review the reported deltas"
        );
        Ok(impact)
    }

    /// Deletes an expense.
    pub async fn delete_expense(&self, role: Role, id: &str) -> RegisterResult<()> {
        require_admin(role, "delete_expense")?;
        self.store.delete_expense(id).await?;
        info!(id = %id, "Expense deleted");
        Ok(())
    }

    /// Deletes a closure.
    ///
    /// Session state is derived from the logs, so deleting the most recent
    /// closure makes the register report the session it ended as open
    /// again. That consequence is why this is admin-only.
    pub async fn delete_closure(&self, role: Role, id: &str) -> RegisterResult<()> {
        require_admin(role, "delete_closure")?;
        self.store.delete_closure(id).await?;
        warn!(id = %id, "Closure deleted; the prior session may now read as open");
        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// The settings record, readable by any role.
    pub async fn settings(&self) -> RegisterResult<Option<CompanySettings>> {
        Ok(self.store.settings().await?)
    }

    /// Saves the settings record. Admin-only, since it carries the PIN.
    pub async fn save_settings(
        &self,
        role: Role,
        settings: CompanySettings,
    ) -> RegisterResult<()> {
        require_admin(role, "save_settings")?;
        validate_settings(&settings)?;

        self.store.save_settings(settings).await?;
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// The stored sale with this id, from the current live view.
    fn find_sale(&self, id: &str) -> Option<Sale> {
        self.sales_rx.borrow().iter().find(|s| s.id == id).cloned()
    }
}

/// Rejects non-admin callers.
fn require_admin(role: Role, operation: &str) -> RegisterResult<()> {
    if !role.is_admin() {
        return Err(RegisterError::NotPermitted {
            role,
            operation: operation.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Mutex;
    use tally_core::cart::Cart;
    use tally_core::types::{ExpenseCategory, PaymentMethod, Product, SaleItem};
    use tally_store::MemoryStore;
    use tokio::sync::mpsc;

    use crate::collab::CollabError;

    fn product(id: &str, name: &str, cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: "Almacén".into(),
            price: Money::from_cents(cents),
            stock: 50,
        }
    }

    fn sale(cents: i64, method: PaymentMethod, date: DateTime<Utc>) -> Sale {
        // One line carries the whole amount, so the engine's defensive
        // recomputation reproduces `cents` instead of zeroing it
        let item = SaleItem::from_product(&product("p-fixture", "Artículo", cents), 1);
        let mut sale = Sale {
            id: String::new(),
            date,
            items: vec![item],
            subtotal: Money::zero(),
            discount: Money::zero(),
            surcharge: Money::zero(),
            total: Money::zero(),
            payment_method: method,
        };
        sale.recompute_totals();
        sale
    }

    fn expense(cents: i64, method: PaymentMethod, date: DateTime<Utc>) -> Expense {
        Expense {
            id: String::new(),
            date,
            description: "proveedor".into(),
            amount: Money::from_cents(cents),
            category: ExpenseCategory::Merchandise,
            payment_method: method,
        }
    }

    fn register() -> (Register, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Register::new(store.clone()), store)
    }

    /// Records every delivery so tests can assert on report dispatch.
    struct RecordingSink {
        deliveries: mpsc::UnboundedSender<(String, String)>,
    }

    #[async_trait]
    impl ReportSink for RecordingSink {
        async fn deliver(&self, destination: &str, report: &str) -> Result<(), CollabError> {
            self.deliveries
                .send((destination.to_string(), report.to_string()))
                .map_err(|e| Box::new(e) as CollabError)
        }
    }

    /// Always fails, to prove delivery failure never blocks a close.
    struct FailingSink;

    #[async_trait]
    impl ReportSink for FailingSink {
        async fn deliver(&self, _destination: &str, _report: &str) -> Result<(), CollabError> {
            Err("sink offline".into())
        }
    }

    /// Accumulates adjustments per product.
    #[derive(Default)]
    struct RecordingStock {
        adjustments: Mutex<Vec<(String, i64)>>,
    }

    #[async_trait]
    impl StockControl for RecordingStock {
        async fn adjust_stock(&self, product_id: &str, delta: i64) -> Result<(), CollabError> {
            self.adjustments
                .lock()
                .unwrap()
                .push((product_id.to_string(), delta));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_open_close_full_session() {
        // Scenario: float 1000; sales 500 cash, 300 debit, 200 cash; one
        // 100 cash expense; close with notes
        let (register, _store) = register();

        register
            .open_register(Money::from_cents(1000), None)
            .await
            .unwrap();
        assert!(register.is_open());

        register
            .record_sale(sale(500, PaymentMethod::Cash, Utc::now()))
            .await
            .unwrap();
        register
            .record_sale(sale(300, PaymentMethod::Debit, Utc::now()))
            .await
            .unwrap();
        register
            .record_sale(sale(200, PaymentMethod::Cash, Utc::now()))
            .await
            .unwrap();
        register
            .record_expense(expense(100, PaymentMethod::Cash, Utc::now()))
            .await
            .unwrap();

        let snapshot = register.snapshot().await.unwrap();
        assert_eq!(snapshot.totals.sales_cash.cents(), 700);
        assert_eq!(snapshot.totals.sales_digital_total.cents(), 300);
        assert_eq!(snapshot.reconciliation.net_cash.cents(), 1600);

        let closure = register
            .close_register(Some("end of day".into()))
            .await
            .unwrap();

        assert_eq!(closure.initial_amount.cents(), 1000);
        assert_eq!(closure.total_sales.cents(), 1000);
        assert_eq!(closure.total_expenses.cents(), 100);
        assert_eq!(closure.total_cash.cents(), 1600);
        assert_eq!(closure.total_digital.cents(), 300);
        assert_eq!(closure.transaction_count, 3);
        assert_eq!(closure.notes.as_deref(), Some("end of day"));

        // Closed, and the closed session's activity no longer accumulates
        assert!(!register.is_open());
        let after = register.snapshot().await.unwrap();
        assert_eq!(after.totals.transaction_count, 0);
        assert_eq!(after.reconciliation.net_cash, Money::zero());
        assert_eq!(after.suggested_float, Some(Money::from_cents(1600)));
    }

    #[tokio::test]
    async fn test_open_while_open_is_rejected() {
        let (register, _store) = register();

        register
            .open_register(Money::from_cents(1000), None)
            .await
            .unwrap();

        let err = register
            .open_register(Money::from_cents(2000), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::AlreadyOpen));
    }

    #[tokio::test]
    async fn test_close_while_closed_is_rejected() {
        let (register, _store) = register();
        let err = register.close_register(None).await.unwrap_err();
        assert!(matches!(err, RegisterError::NotOpen));
    }

    #[tokio::test]
    async fn test_negative_float_is_rejected_before_the_store() {
        let (register, store) = register();
        store.set_write_denied(true);

        // Validation fires first, so the denied store is never consulted
        let err = register
            .open_register(Money::from_cents(-1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::Validation(_)));
    }

    #[tokio::test]
    async fn test_float_discrepancy_against_last_closure() {
        let (register, _store) = register();

        register
            .open_register(Money::from_cents(1000), None)
            .await
            .unwrap();
        register
            .record_sale(sale(500, PaymentMethod::Cash, Utc::now()))
            .await
            .unwrap();
        register.close_register(None).await.unwrap();

        // Drawer holds 1500; declaring 1400 is 100 short
        assert_eq!(
            register.float_discrepancy(Money::from_cents(1400)),
            Some(Money::from_cents(-100))
        );
        assert_eq!(register.float_discrepancy(Money::from_cents(1500)), None);
    }

    #[tokio::test]
    async fn test_expense_validation_fires_before_the_store() {
        let (register, _store) = register();

        let mut bad = expense(100, PaymentMethod::Cash, Utc::now());
        bad.description = "  ".into();
        let err = register.record_expense(bad).await.unwrap_err();
        assert!(matches!(err, RegisterError::Validation(_)));

        let mut bad = expense(0, PaymentMethod::Cash, Utc::now());
        bad.amount = Money::zero();
        let err = register.record_expense(bad).await.unwrap_err();
        assert!(matches!(err, RegisterError::Validation(_)));
    }

    #[tokio::test]
    async fn test_record_sale_decrements_stock() {
        let store = Arc::new(MemoryStore::new());
        let stock = Arc::new(RecordingStock::default());
        let register = Register::new(store).with_stock_control(stock.clone());

        let mut cart = Cart::new();
        cart.add_product(&product("p1", "Yerba Mate", 500)).unwrap();
        cart.add_product(&product("p1", "Yerba Mate", 500)).unwrap();
        cart.add_product(&product("p2", "Azúcar", 300)).unwrap();
        let sale = cart.checkout(PaymentMethod::Cash, Utc::now()).unwrap();

        register.record_sale(sale).await.unwrap();

        let adjustments = stock.adjustments.lock().unwrap().clone();
        assert_eq!(
            adjustments,
            vec![("p1".to_string(), -2), ("p2".to_string(), -1)]
        );
    }

    #[tokio::test]
    async fn test_commit_sale_requires_admin_and_reports_impact() {
        let (register, _store) = register();

        let mut cart = Cart::new();
        cart.add_product(&product("p1", "Yerba Mate", 500)).unwrap();
        let sale = cart.checkout(PaymentMethod::Cash, Utc::now()).unwrap();
        let stored = register.record_sale(sale).await.unwrap();

        let mut editor = SaleEditor::new(stored.clone());
        editor.change_quantity(0, 2).unwrap();

        // A cashier cannot commit
        let err = register
            .commit_sale(Role::Cashier, editor.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::NotPermitted { .. }));

        // An admin can, and gets the advisory
        let (amended, impact) = register.commit_sale(Role::Admin, editor).await.unwrap();
        assert_eq!(amended.total.cents(), 1500);
        assert_eq!(impact.len(), 1);
        assert_eq!(impact[0].product_id, "p1");
        assert_eq!(impact[0].delta, 2);

        // The replacement is visible through derived state
        let snapshot = register.snapshot().await.unwrap();
        assert_eq!(snapshot.totals.sales_cash.cents(), 1500);
    }

    #[tokio::test]
    async fn test_delete_sale_reports_full_restock() {
        let (register, _store) = register();

        let mut cart = Cart::new();
        cart.add_product(&product("p1", "Yerba Mate", 500)).unwrap();
        cart.add_product(&product("p1", "Yerba Mate", 500)).unwrap();
        let sale = cart.checkout(PaymentMethod::Cash, Utc::now()).unwrap();
        let stored = register.record_sale(sale).await.unwrap();

        let impact = register.delete_sale(Role::Admin, &stored.id).await.unwrap();
        assert_eq!(impact.len(), 1);
        assert_eq!(impact[0].delta, -2);

        let snapshot = register.snapshot().await.unwrap();
        assert_eq!(snapshot.totals.transaction_count, 0);
    }

    #[tokio::test]
    async fn test_privileged_deletes_are_role_gated() {
        let (register, _store) = register();

        let stored = register
            .record_expense(expense(100, PaymentMethod::Cash, Utc::now()))
            .await
            .unwrap();

        let err = register
            .delete_expense(Role::Cashier, &stored.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::NotPermitted { .. }));

        register
            .delete_expense(Role::Admin, &stored.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deleting_the_closure_reopens_the_session() {
        let (register, _store) = register();

        register
            .open_register(Money::from_cents(1000), None)
            .await
            .unwrap();
        let closure = register.close_register(None).await.unwrap();
        assert!(!register.is_open());

        register
            .delete_closure(Role::Admin, &closure.id)
            .await
            .unwrap();

        // Derived-state consequence of the two-log design
        assert!(register.is_open());
    }

    #[tokio::test]
    async fn test_closure_report_is_dispatched() {
        let store = Arc::new(MemoryStore::new());
        let (deliveries_tx, mut deliveries_rx) = mpsc::unbounded_channel();
        let sink = Arc::new(RecordingSink {
            deliveries: deliveries_tx,
        });
        let register = Register::new(store).with_report_sink(sink);

        register
            .save_settings(
                Role::Admin,
                CompanySettings {
                    name: "Almacén Don Mario".into(),
                    address: String::new(),
                    phone: String::new(),
                    footer_message: String::new(),
                    admin_pin: None,
                    report_contact: Some("+54-11-5555-0000".into()),
                },
            )
            .await
            .unwrap();

        register
            .open_register(Money::from_cents(1000), None)
            .await
            .unwrap();
        register.close_register(None).await.unwrap();

        let (contact, report) = deliveries_rx.recv().await.unwrap();
        assert_eq!(contact, "+54-11-5555-0000");
        assert!(report.contains("Almacén Don Mario"));
        assert!(report.contains("EXPECTED DRAWER CASH"));
    }

    #[tokio::test]
    async fn test_failed_report_delivery_never_blocks_the_close() {
        let store = Arc::new(MemoryStore::new());
        let register = Register::new(store).with_report_sink(Arc::new(FailingSink));

        register
            .save_settings(
                Role::Admin,
                CompanySettings {
                    name: "Almacén Don Mario".into(),
                    report_contact: Some("nowhere".into()),
                    ..CompanySettings::default()
                },
            )
            .await
            .unwrap();

        register
            .open_register(Money::from_cents(500), None)
            .await
            .unwrap();

        // The close succeeds even though every delivery fails
        let closure = register.close_register(None).await.unwrap();
        assert_eq!(closure.initial_amount.cents(), 500);
        assert!(!register.is_open());
    }

    #[tokio::test]
    async fn test_settings_save_is_admin_only() {
        let (register, _store) = register();

        let settings = CompanySettings {
            name: "Almacén Don Mario".into(),
            ..CompanySettings::default()
        };

        let err = register
            .save_settings(Role::Cashier, settings.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::NotPermitted { .. }));

        register.save_settings(Role::Admin, settings.clone()).await.unwrap();
        assert_eq!(register.settings().await.unwrap(), Some(settings));
    }
}
