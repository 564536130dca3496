//! # Reactive Snapshot Projection
//!
//! Derives the display-ready register state from the live collection views
//! and republishes it whenever the underlying records change.
//!
//! ## Projection Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Snapshot Projection Flow                            │
//! │                                                                         │
//! │  watch_openings ──┐                                                     │
//! │  watch_closures ──┤   any change        ┌───────────────────────────┐  │
//! │  watch_sales ─────┼──────────────────▶  │  SnapshotProjector        │  │
//! │  watch_expenses ──┘                     │                           │  │
//! │                                         │  1. take fresh snapshots  │  │
//! │                                         │  2. fingerprint inputs    │  │
//! │                                         │  3. unchanged? skip       │  │
//! │                                         │  4. resolve + accumulate  │  │
//! │                                         │     + reconcile           │  │
//! │                                         │  5. publish               │  │
//! │                                         └─────────────┬─────────────┘  │
//! │                                                       ▼                 │
//! │                                     watch::Receiver<RegisterSnapshot>  │
//! │                                     (UI, other terminals, tests)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every recomputation starts from complete collection snapshots. There is
//! no delta handling and no cached open/closed flag anywhere; the
//! fingerprint only prevents republishing an identical result when, say, a
//! settings write wakes the loop without touching the collections.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use tally_core::money::Money;
use tally_core::reconcile::{reconcile, Reconciliation};
use tally_core::session::resolve_session;
use tally_core::totals::{accumulate_session, SessionTotals};
use tally_core::types::{CashClosure, CashOpening, Expense, Sale};
use tally_store::RecordStore;

// =============================================================================
// Register Snapshot
// =============================================================================

/// Everything a display layer needs about the register, in one value.
///
/// Serializes camelCase like the persisted records, so a UI can consume it
/// with the same conventions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSnapshot {
    /// Whether a session is currently in progress.
    pub is_open: bool,

    /// The current session boundary, if any session ever existed.
    pub cutoff: Option<DateTime<Utc>>,

    /// Float of the open session, or zero when closed.
    pub opening_float: Money,

    /// What the last closure left in the drawer, offered as the next float.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_float: Option<Money>,

    /// Per-method session totals.
    pub totals: SessionTotals,

    /// The expected-drawer figures for the session.
    pub reconciliation: Reconciliation,

    /// Session-log version the snapshot was derived at. The token callers
    /// hand to conditional open/close writes.
    pub session_version: u64,
}

impl RegisterSnapshot {
    /// Computes the snapshot from complete collection snapshots.
    ///
    /// Pure apart from its inputs: resolver → accumulator → reconciliation,
    /// exactly the data-flow the non-reactive paths use.
    pub fn compute(
        openings: &[CashOpening],
        closures: &[CashClosure],
        sales: &[Sale],
        expenses: &[Expense],
        session_version: u64,
    ) -> Self {
        let state = resolve_session(openings, closures);
        let totals = accumulate_session(sales, expenses, state.cutoff());
        let reconciliation = reconcile(&state, &totals);

        RegisterSnapshot {
            is_open: state.is_open(),
            cutoff: state.cutoff(),
            opening_float: state.opening_float(),
            suggested_float: state.suggested_float(),
            totals,
            reconciliation,
            session_version,
        }
    }
}

// =============================================================================
// Projector
// =============================================================================

/// Handle for the running projector task.
#[derive(Clone)]
pub struct ProjectorHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl ProjectorHandle {
    /// Stops the projector. The snapshot receiver keeps its last value.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Recomputes and republishes [`RegisterSnapshot`] on every collection
/// change.
pub struct SnapshotProjector {
    store: Arc<dyn RecordStore>,

    sales_rx: watch::Receiver<Arc<[Sale]>>,
    expenses_rx: watch::Receiver<Arc<[Expense]>>,
    openings_rx: watch::Receiver<Arc<[CashOpening]>>,
    closures_rx: watch::Receiver<Arc<[CashClosure]>>,

    snapshot_tx: watch::Sender<RegisterSnapshot>,
    shutdown_rx: mpsc::Receiver<()>,

    /// Fingerprint of the inputs behind the last published snapshot.
    last_fingerprint: Option<u64>,
}

impl SnapshotProjector {
    /// Creates a projector over a store, plus the receiver and handle the
    /// caller keeps.
    pub fn new(
        store: Arc<dyn RecordStore>,
    ) -> (Self, watch::Receiver<RegisterSnapshot>, ProjectorHandle) {
        let initial = RegisterSnapshot::compute(&[], &[], &[], &[], 0);
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let projector = SnapshotProjector {
            sales_rx: store.watch_sales(),
            expenses_rx: store.watch_expenses(),
            openings_rx: store.watch_openings(),
            closures_rx: store.watch_closures(),
            store,
            snapshot_tx,
            shutdown_rx,
            last_fingerprint: None,
        };
        let handle = ProjectorHandle { shutdown_tx };

        (projector, snapshot_rx, handle)
    }

    /// Runs the projection loop. Spawn this as a background task.
    pub async fn run(mut self) {
        info!("Snapshot projector starting");

        // Project whatever is already on file before waiting for changes
        self.project().await;

        loop {
            tokio::select! {
                changed = self.sales_rx.changed() => {
                    if changed.is_err() {
                        warn!(collection = "sales", "Live view lost, projector stopping");
                        break;
                    }
                }
                changed = self.expenses_rx.changed() => {
                    if changed.is_err() {
                        warn!(collection = "expenses", "Live view lost, projector stopping");
                        break;
                    }
                }
                changed = self.openings_rx.changed() => {
                    if changed.is_err() {
                        warn!(collection = "openings", "Live view lost, projector stopping");
                        break;
                    }
                }
                changed = self.closures_rx.changed() => {
                    if changed.is_err() {
                        warn!(collection = "closures", "Live view lost, projector stopping");
                        break;
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Snapshot projector shutting down");
                    break;
                }
            }

            self.project().await;
        }

        info!("Snapshot projector stopped");
    }

    /// One projection pass: fresh snapshots in, one snapshot out (unless
    /// the inputs are fingerprint-identical to the last pass).
    async fn project(&mut self) {
        let sales = self.sales_rx.borrow_and_update().clone();
        let expenses = self.expenses_rx.borrow_and_update().clone();
        let openings = self.openings_rx.borrow_and_update().clone();
        let closures = self.closures_rx.borrow_and_update().clone();

        let version = match self.store.session_version().await {
            Ok(version) => version,
            Err(e) => {
                warn!(error = %e, "Could not read session version, skipping projection");
                return;
            }
        };

        let fingerprint = fingerprint_inputs(&openings, &closures, &sales, &expenses, version);
        if self.last_fingerprint == Some(fingerprint) {
            debug!("Inputs unchanged, skipping projection");
            return;
        }

        let snapshot =
            RegisterSnapshot::compute(&openings, &closures, &sales, &expenses, version);
        debug!(
            is_open = snapshot.is_open,
            net_cash = %snapshot.reconciliation.net_cash,
            transactions = snapshot.totals.transaction_count,
            "Publishing register snapshot"
        );

        self.last_fingerprint = Some(fingerprint);
        self.snapshot_tx.send_replace(snapshot);
    }
}

/// Hashes the projection inputs so identical states are recognized without
/// comparing every record.
fn fingerprint_inputs(
    openings: &[CashOpening],
    closures: &[CashClosure],
    sales: &[Sale],
    expenses: &[Expense],
    session_version: u64,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    openings.hash(&mut hasher);
    closures.hash(&mut hasher);
    sales.hash(&mut hasher);
    expenses.hash(&mut hasher);
    session_version.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Unit Tests
// =============================================================================
