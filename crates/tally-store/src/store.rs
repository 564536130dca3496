//! # Record Store Trait
//!
//! The boundary between the register engine and wherever the records
//! actually live.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RecordStore Contract                               │
//! │                                                                         │
//! │  WRITES                          READS                                  │
//! │  ──────                          ─────                                  │
//! │  append_sale / replace / delete  watch_sales      ──┐                   │
//! │  append_expense / delete         watch_expenses   ──┤ one watch channel │
//! │  append_opening* / delete        watch_openings   ──┤ per collection,   │
//! │  append_closure* / delete        watch_closures   ──┘ complete snapshot │
//! │  save_settings                   settings             per delivery      │
//! │                                                                         │
//! │  * conditional on the session-log version (see below)                   │
//! │                                                                         │
//! │  The store assigns every record id. Whatever id a caller puts on a      │
//! │  record handed to append is replaced before the record is kept.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Delivery
//! Every watch delivery is the COMPLETE collection in insertion order,
//! wrapped in an `Arc` so a snapshot is cheap to hold. A reader that falls
//! behind skips straight to the newest state; it never sees a partial
//! collection or an individual delta. Consumers recompute derived state
//! from scratch on every delivery.
//!
//! ## Session-Log Version
//! The opening and closure logs share one monotonic version counter, bumped
//! on every mutation of either log. [`RecordStore::append_opening`] and
//! [`RecordStore::append_closure`] only land when the caller's
//! `expected_version` still matches; a stale append fails with
//! [`StoreError::VersionConflict`](crate::StoreError::VersionConflict).
//! Two terminals racing to open (or close) the register therefore cannot
//! both win.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use tally_core::types::{CashClosure, CashOpening, CompanySettings, Expense, Sale};

use crate::error::StoreResult;

// =============================================================================
// Record Store Trait
// =============================================================================

/// Append, replace, delete and live-view operations over the four record
/// collections plus the settings singleton.
///
/// Object-safe so engines can hold an `Arc<dyn RecordStore>` and swap the
/// in-memory implementation for a remote one without recompiling.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    /// Appends a sale and returns it with its store-assigned id.
    async fn append_sale(&self, sale: Sale) -> StoreResult<Sale>;

    /// Replaces a stored sale by id. The amendment commit path.
    async fn replace_sale(&self, sale: Sale) -> StoreResult<Sale>;

    /// Deletes a sale by id.
    async fn delete_sale(&self, id: &str) -> StoreResult<()>;

    // -------------------------------------------------------------------------
    // Expenses
    // -------------------------------------------------------------------------

    /// Appends an expense and returns it with its store-assigned id.
    async fn append_expense(&self, expense: Expense) -> StoreResult<Expense>;

    /// Deletes an expense by id.
    async fn delete_expense(&self, id: &str) -> StoreResult<()>;

    // -------------------------------------------------------------------------
    // Session Logs (conditional writes)
    // -------------------------------------------------------------------------

    /// Appends an opening, provided the session log is still at
    /// `expected_version`.
    async fn append_opening(
        &self,
        opening: CashOpening,
        expected_version: u64,
    ) -> StoreResult<CashOpening>;

    /// Appends a closure, provided the session log is still at
    /// `expected_version`.
    async fn append_closure(
        &self,
        closure: CashClosure,
        expected_version: u64,
    ) -> StoreResult<CashClosure>;

    /// Deletes an opening by id. Unconditional; bumps the session version.
    async fn delete_opening(&self, id: &str) -> StoreResult<()>;

    /// Deletes a closure by id. Unconditional; bumps the session version.
    ///
    /// Because register state is derived from the logs, deleting the most
    /// recent closure makes the resolver report the prior session open
    /// again. Callers gate this behind an admin role for exactly that
    /// reason.
    async fn delete_closure(&self, id: &str) -> StoreResult<()>;

    /// Current session-log version, the token for conditional appends.
    async fn session_version(&self) -> StoreResult<u64>;

    // -------------------------------------------------------------------------
    // Settings Singleton
    // -------------------------------------------------------------------------

    /// The settings record, if one has ever been saved.
    async fn settings(&self) -> StoreResult<Option<CompanySettings>>;

    /// Overwrites the settings record.
    async fn save_settings(&self, settings: CompanySettings) -> StoreResult<()>;

    // -------------------------------------------------------------------------
    // Live Views
    // -------------------------------------------------------------------------

    /// Live view of the sales collection.
    fn watch_sales(&self) -> watch::Receiver<Arc<[Sale]>>;

    /// Live view of the expenses collection.
    fn watch_expenses(&self) -> watch::Receiver<Arc<[Expense]>>;

    /// Live view of the openings log.
    fn watch_openings(&self) -> watch::Receiver<Arc<[CashOpening]>>;

    /// Live view of the closures log.
    fn watch_closures(&self) -> watch::Receiver<Arc<[CashClosure]>>;
}

// =============================================================================
// Callback Subscriptions
// =============================================================================

/// A running callback subscription. Dropping it unsubscribes.
///
/// The callback-with-unsubscribe shape some host applications expect,
/// built on top of the watch channels.
#[derive(Debug)]
pub struct Subscription {
    task: tokio::task::JoinHandle<()>,
}

impl Subscription {
    /// Stops the subscription now instead of at drop.
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Invokes `callback` with the current snapshot and again after every
/// subsequent change, until the returned [`Subscription`] is dropped.
///
/// ## Example
/// ```rust,ignore
/// let sub = subscribe(store.watch_sales(), |sales| {
///     println!("{} sales on file", sales.len());
/// });
/// // ... later
/// drop(sub);
/// ```
pub fn subscribe<T, F>(mut rx: watch::Receiver<Arc<[T]>>, mut callback: F) -> Subscription
where
    T: Send + Sync + 'static,
    F: FnMut(&[T]) + Send + 'static,
{
    let task = tokio::spawn(async move {
        // Initial delivery, then one per change. borrow_and_update marks
        // the value seen so changed() waits for genuinely new snapshots.
        loop {
            {
                let snapshot = rx.borrow_and_update().clone();
                callback(&snapshot);
            }
            if rx.changed().await.is_err() {
                // Store dropped: the live view is gone, nothing more to
                // deliver
                break;
            }
        }
    });

    Subscription { task }
}

// =============================================================================
// Unit Tests
// =============================================================================
