//! # Cash Reconciliation
//!
//! Computes what the drawer should hold and freezes that answer into a
//! closure record when the register closes.
//!
//! ## The Drawer Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   netCash = openingFloat + cashSales − cashExpenses                     │
//! │                                                                         │
//! │   Nothing else moves the drawer. Digital sales settle at the bank;      │
//! │   non-cash expenses never touch the till.                               │
//! │                                                                         │
//! │   openingFloat is zero unless a session is actually open: a closed      │
//! │   register reconciles any stray post-closure records against an        │
//! │   empty drawer.                                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A closure is a snapshot, not a view: once written it never changes, even
//! if the sales it summarized are amended afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::money::Money;
use crate::session::SessionState;
use crate::totals::SessionTotals;
use crate::types::CashClosure;

// =============================================================================
// Reconciliation
// =============================================================================

/// The expected state of the drawer for the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Opening float, or zero when no session is open.
    pub initial: Money,

    /// Expected drawer contents right now.
    pub net_cash: Money,

    /// All sales, cash and digital combined.
    pub total_sales: Money,

    /// Non-cash sales.
    pub total_digital: Money,

    /// All expenses, any payment method.
    pub total_expenses: Money,

    /// Number of sales in the session.
    pub transaction_count: u32,
}

/// Combines the resolved session state with the session totals.
///
/// ## Example
/// ```rust
/// use tally_core::reconcile::reconcile;
/// use tally_core::session::SessionState;
/// use tally_core::totals::SessionTotals;
///
/// let recon = reconcile(&SessionState::NeverOpened, &SessionTotals::default());
/// assert!(recon.net_cash.is_zero());
/// ```
pub fn reconcile(state: &SessionState, totals: &SessionTotals) -> Reconciliation {
    let initial = state.opening_float();

    Reconciliation {
        initial,
        net_cash: initial + totals.sales_cash - totals.expenses_cash,
        total_sales: totals.total_sales,
        total_digital: totals.sales_digital_total,
        total_expenses: totals.total_expenses,
        transaction_count: totals.transaction_count,
    }
}

// =============================================================================
// Closure Construction
// =============================================================================

/// Freezes a reconciliation into the closure record that ends the session.
///
/// The id is left empty for the store to assign.
pub fn build_closure(
    recon: &Reconciliation,
    notes: Option<String>,
    at: DateTime<Utc>,
) -> CashClosure {
    CashClosure {
        id: String::new(),
        date: at,
        initial_amount: recon.initial,
        total_sales: recon.total_sales,
        total_expenses: recon.total_expenses,
        total_cash: recon.net_cash,
        total_digital: recon.total_digital,
        transaction_count: recon.transaction_count,
        notes,
    }
}

/// Compares a declared opening float against what the last closure left in
/// the drawer.
///
/// Returns the signed difference (declared − expected), or `None` when they
/// agree or there is no closure to compare against. Informational only: an
/// operator is allowed to open with any float.
pub fn float_discrepancy(declared: Money, last_closure: Option<&CashClosure>) -> Option<Money> {
    let expected = last_closure?.total_cash;
    let diff = declared - expected;
    if diff.is_zero() {
        None
    } else {
        Some(diff)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::resolve_session;
    use crate::totals::accumulate_session;
    use crate::types::{CashOpening, Expense, ExpenseCategory, PaymentMethod, Sale};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn opening(date: DateTime<Utc>, cents: i64) -> CashOpening {
        CashOpening {
            id: "o1".into(),
            date,
            amount: Money::from_cents(cents),
            notes: None,
        }
    }

    fn sale(cents: i64, method: PaymentMethod, date: DateTime<Utc>) -> Sale {
        Sale {
            id: format!("sale-{cents}"),
            date,
            items: Vec::new(),
            subtotal: Money::from_cents(cents),
            discount: Money::zero(),
            surcharge: Money::zero(),
            total: Money::from_cents(cents),
            payment_method: method,
        }
    }

    fn expense(cents: i64, date: DateTime<Utc>) -> Expense {
        Expense {
            id: format!("exp-{cents}"),
            date,
            description: "proveedor".into(),
            amount: Money::from_cents(cents),
            category: ExpenseCategory::Merchandise,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_open_session_reconciliation() {
        // Float 1000, then 500 cash + 300 debit + 200 cash sales and a
        // 100 cash expense: the drawer should hold 1600
        let openings = vec![opening(at(9), 1000)];
        let sales = vec![
            sale(500, PaymentMethod::Cash, at(10)),
            sale(300, PaymentMethod::Debit, at(11)),
            sale(200, PaymentMethod::Cash, at(12)),
        ];
        let expenses = vec![expense(100, at(13))];

        let state = resolve_session(&openings, &[]);
        let totals = accumulate_session(&sales, &expenses, state.cutoff());
        let recon = reconcile(&state, &totals);

        assert_eq!(recon.initial.cents(), 1000);
        assert_eq!(recon.net_cash.cents(), 1600);
        assert_eq!(recon.total_sales.cents(), 1000);
        assert_eq!(recon.total_digital.cents(), 300);
        assert_eq!(recon.total_expenses.cents(), 100);
        assert_eq!(recon.transaction_count, 3);
    }

    #[test]
    fn test_closed_register_has_no_float() {
        let totals = SessionTotals {
            sales_cash: Money::from_cents(500),
            expenses_cash: Money::from_cents(200),
            ..SessionTotals::default()
        };

        let recon = reconcile(&SessionState::NeverOpened, &totals);

        assert_eq!(recon.initial, Money::zero());
        assert_eq!(recon.net_cash.cents(), 300);
    }

    #[test]
    fn test_build_closure_freezes_the_reconciliation() {
        let recon = Reconciliation {
            initial: Money::from_cents(1000),
            net_cash: Money::from_cents(1600),
            total_sales: Money::from_cents(1000),
            total_digital: Money::from_cents(300),
            total_expenses: Money::from_cents(100),
            transaction_count: 3,
        };

        let closure = build_closure(&recon, Some("end of day".into()), at(20));

        assert!(closure.id.is_empty());
        assert_eq!(closure.date, at(20));
        assert_eq!(closure.initial_amount.cents(), 1000);
        assert_eq!(closure.total_cash.cents(), 1600);
        assert_eq!(closure.total_sales.cents(), 1000);
        assert_eq!(closure.total_digital.cents(), 300);
        assert_eq!(closure.total_expenses.cents(), 100);
        assert_eq!(closure.transaction_count, 3);
        assert_eq!(closure.notes.as_deref(), Some("end of day"));
    }

    #[test]
    fn test_closing_resets_the_next_session_to_zero() {
        // Full loop at the pure level: open, trade, close, then verify the
        // records before the closure no longer count for anything
        let openings = vec![opening(at(9), 1000)];
        let sales = vec![sale(500, PaymentMethod::Cash, at(10))];

        let state = resolve_session(&openings, &[]);
        let totals = accumulate_session(&sales, &[], state.cutoff());
        let recon = reconcile(&state, &totals);
        let mut closure = build_closure(&recon, None, at(20));
        closure.id = "c1".into();

        let closures = vec![closure];
        let after = resolve_session(&openings, &closures);
        assert!(!after.is_open());

        let totals_after = accumulate_session(&sales, &[], after.cutoff());
        let recon_after = reconcile(&after, &totals_after);
        assert_eq!(recon_after.net_cash, Money::zero());
        assert_eq!(recon_after.transaction_count, 0);
    }

    #[test]
    fn test_float_discrepancy() {
        let recon = Reconciliation {
            initial: Money::from_cents(1000),
            net_cash: Money::from_cents(1600),
            total_sales: Money::zero(),
            total_digital: Money::zero(),
            total_expenses: Money::zero(),
            transaction_count: 0,
        };
        let closure = build_closure(&recon, None, at(20));

        // Matching count: nothing to flag
        assert_eq!(float_discrepancy(Money::from_cents(1600), Some(&closure)), None);

        // Short drawer
        assert_eq!(
            float_discrepancy(Money::from_cents(1500), Some(&closure)),
            Some(Money::from_cents(-100))
        );

        // Over-declared
        assert_eq!(
            float_discrepancy(Money::from_cents(1700), Some(&closure)),
            Some(Money::from_cents(100))
        );

        // First opening ever: nothing to compare against
        assert_eq!(float_discrepancy(Money::from_cents(1600), None), None);
    }
}
