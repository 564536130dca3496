//! # Session Accumulation
//!
//! Folds the sale and expense logs into per-method totals for one session.
//!
//! ## Scope Rule
//! A record belongs to the session when its timestamp is STRICTLY after the
//! cutoff. The opening itself sits exactly at the cutoff, so a sale stamped
//! at that same instant still belongs to the previous session. With no
//! cutoff (register never opened) every record on file is in scope.
//!
//! ```text
//!                cutoff
//!                  │
//!   ───s₁────s₂────┼─s₃────s₄──────►  time
//!                  │
//!   s₁ s₂ out      │      s₃ s₄ in   (s at the cutoff instant: out)
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::money::Money;
use crate::types::{Expense, PaymentMethod, Sale};

// =============================================================================
// Session Totals
// =============================================================================

/// Everything the current session has taken in and paid out, partitioned
/// by payment method.
///
/// ## Field Relationships
/// - `sales_digital_total` = debit + credit + transfer + digital wallet
/// - `total_sales` = `sales_cash` + `sales_digital_total`
/// - `expenses_cash` ≤ `total_expenses` (cash is the only drawer-affecting
///   subset)
/// - `transaction_count` counts sales only, not expenses
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTotals {
    /// Cash sales: the only sales that add to the drawer.
    pub sales_cash: Money,

    /// Debit card sales.
    pub sales_debit: Money,

    /// Credit card sales.
    pub sales_credit: Money,

    /// Bank transfer sales.
    pub sales_transfer: Money,

    /// QR / digital wallet sales.
    pub sales_digital_wallet: Money,

    /// All non-cash sales combined.
    pub sales_digital_total: Money,

    /// Every sale regardless of method.
    pub total_sales: Money,

    /// Expenses paid from the drawer.
    pub expenses_cash: Money,

    /// Every expense regardless of method.
    pub total_expenses: Money,

    /// Number of sales in the session.
    pub transaction_count: u32,
}

impl SessionTotals {
    /// The sales bucket for one payment method.
    pub fn sales_for(&self, method: PaymentMethod) -> Money {
        match method {
            PaymentMethod::Cash => self.sales_cash,
            PaymentMethod::Debit => self.sales_debit,
            PaymentMethod::Credit => self.sales_credit,
            PaymentMethod::Transfer => self.sales_transfer,
            PaymentMethod::DigitalWallet => self.sales_digital_wallet,
        }
    }
}

// =============================================================================
// Accumulation
// =============================================================================

/// Folds sales and expenses into the totals for the session that starts
/// strictly after `cutoff`.
///
/// Pure: no clock, no store, no ordering requirements on the inputs.
///
/// ## Example
/// ```rust
/// use tally_core::totals::accumulate_session;
///
/// let totals = accumulate_session(&[], &[], None);
/// assert_eq!(totals.transaction_count, 0);
/// assert!(totals.total_sales.is_zero());
/// ```
pub fn accumulate_session(
    sales: &[Sale],
    expenses: &[Expense],
    cutoff: Option<DateTime<Utc>>,
) -> SessionTotals {
    let in_session = |date: DateTime<Utc>| cutoff.map_or(true, |c| date > c);

    let mut totals = SessionTotals::default();

    for sale in sales.iter().filter(|s| in_session(s.date)) {
        match sale.payment_method {
            PaymentMethod::Cash => totals.sales_cash += sale.total,
            PaymentMethod::Debit => totals.sales_debit += sale.total,
            PaymentMethod::Credit => totals.sales_credit += sale.total,
            PaymentMethod::Transfer => totals.sales_transfer += sale.total,
            PaymentMethod::DigitalWallet => totals.sales_digital_wallet += sale.total,
        }
        totals.transaction_count += 1;
    }

    totals.sales_digital_total = totals.sales_debit
        + totals.sales_credit
        + totals.sales_transfer
        + totals.sales_digital_wallet;
    totals.total_sales = totals.sales_cash + totals.sales_digital_total;

    for expense in expenses.iter().filter(|e| in_session(e.date)) {
        totals.total_expenses += expense.amount;
        if expense.payment_method.is_cash() {
            totals.expenses_cash += expense.amount;
        }
    }

    totals
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExpenseCategory;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
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

    fn expense(cents: i64, method: PaymentMethod, date: DateTime<Utc>) -> Expense {
        Expense {
            id: format!("exp-{cents}"),
            date,
            description: "test expense".into(),
            amount: Money::from_cents(cents),
            category: ExpenseCategory::Other,
            payment_method: method,
        }
    }

    #[test]
    fn test_session_partition_by_method() {
        // Open at 10:00, then 500 cash + 300 debit + 200 cash in sales
        // and a 100 cash expense
        let cutoff = Some(at(10, 0));
        let sales = vec![
            sale(500, PaymentMethod::Cash, at(10, 30)),
            sale(300, PaymentMethod::Debit, at(11, 0)),
            sale(200, PaymentMethod::Cash, at(12, 0)),
        ];
        let expenses = vec![expense(100, PaymentMethod::Cash, at(13, 0))];

        let totals = accumulate_session(&sales, &expenses, cutoff);

        assert_eq!(totals.sales_cash.cents(), 700);
        assert_eq!(totals.sales_digital_total.cents(), 300);
        assert_eq!(totals.total_sales.cents(), 1000);
        assert_eq!(totals.expenses_cash.cents(), 100);
        assert_eq!(totals.total_expenses.cents(), 100);
        assert_eq!(totals.transaction_count, 3);
    }

    #[test]
    fn test_record_at_cutoff_belongs_to_previous_session() {
        let cutoff = at(10, 0);
        let sales = vec![
            sale(500, PaymentMethod::Cash, cutoff),
            sale(300, PaymentMethod::Cash, at(10, 1)),
        ];

        let totals = accumulate_session(&sales, &[], Some(cutoff));

        assert_eq!(totals.sales_cash.cents(), 300);
        assert_eq!(totals.transaction_count, 1);
    }

    #[test]
    fn test_no_cutoff_includes_everything() {
        let sales = vec![
            sale(500, PaymentMethod::Cash, at(8, 0)),
            sale(300, PaymentMethod::Debit, at(23, 59)),
        ];
        let expenses = vec![expense(50, PaymentMethod::Cash, at(7, 0))];

        let totals = accumulate_session(&sales, &expenses, None);

        assert_eq!(totals.total_sales.cents(), 800);
        assert_eq!(totals.total_expenses.cents(), 50);
        assert_eq!(totals.transaction_count, 2);
    }

    #[test]
    fn test_every_method_lands_in_its_own_bucket() {
        let date = at(12, 0);
        let sales: Vec<Sale> = PaymentMethod::ALL
            .iter()
            .enumerate()
            .map(|(i, &method)| sale(100 * (i as i64 + 1), method, date))
            .collect();

        let totals = accumulate_session(&sales, &[], None);

        for (i, method) in PaymentMethod::ALL.into_iter().enumerate() {
            assert_eq!(totals.sales_for(method).cents(), 100 * (i as i64 + 1));
        }
        // 200 + 300 + 400 + 500 from the four non-cash methods
        assert_eq!(totals.sales_digital_total.cents(), 1400);
        assert_eq!(totals.total_sales.cents(), 1500);
        assert_eq!(totals.transaction_count, 5);
    }

    #[test]
    fn test_non_cash_expense_spares_the_drawer() {
        let expenses = vec![
            expense(100, PaymentMethod::Cash, at(12, 0)),
            expense(400, PaymentMethod::Transfer, at(13, 0)),
        ];

        let totals = accumulate_session(&[], &expenses, None);

        assert_eq!(totals.expenses_cash.cents(), 100);
        assert_eq!(totals.total_expenses.cents(), 500);
    }

    #[test]
    fn test_empty_session_is_all_zeroes() {
        let totals = accumulate_session(&[], &[], Some(at(10, 0)));
        assert_eq!(totals, SessionTotals::default());
    }

    #[test]
    fn test_totals_wire_format() {
        let sales = vec![sale(500, PaymentMethod::Cash, at(12, 0))];
        let totals = accumulate_session(&sales, &[], None);

        let value = serde_json::to_value(&totals).unwrap();
        assert_eq!(value["salesCash"], 500);
        assert_eq!(value["salesDigitalTotal"], 0);
        assert_eq!(value["transactionCount"], 1);
    }
}
