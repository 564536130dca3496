//! # Sale Amendment
//!
//! Post-hoc editing of committed sales: fix a quantity typed wrong, swap a
//! payment method, drop a line rung up by mistake.
//!
//! ## Rules
//! - Every mutation either succeeds, or fails leaving the sale untouched
//! - `subtotal` and `total` are recomputed after every accepted change;
//!   an editor can never hand back a sale whose totals disagree with its
//!   lines
//! - Amending a sale does NOT adjust inventory. The editor reports the
//!   stock impact ([`stock_impact`]) and the caller decides what to do
//!   with it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, Product, Sale, SaleItem};
use crate::validation::validate_adjustment_amount;
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_ITEMS};

// =============================================================================
// Sale Editor
// =============================================================================

/// An in-progress amendment of one sale.
///
/// Wraps the sale, applies changes one at a time, and keeps the totals
/// consistent throughout. Call [`SaleEditor::into_sale`] to take the result
/// back out for persistence.
///
/// ## Example
/// ```rust,ignore
/// let mut editor = SaleEditor::new(sale);
/// editor.change_quantity(0, -1)?;
/// editor.set_payment_method(PaymentMethod::Debit);
/// let amended = editor.into_sale();
/// ```
#[derive(Debug, Clone)]
pub struct SaleEditor {
    sale: Sale,
}

impl SaleEditor {
    /// Starts editing a sale.
    ///
    /// Recomputes the totals on entry, so a record persisted by an older
    /// build with drifted totals is repaired the moment it is opened.
    pub fn new(mut sale: Sale) -> Self {
        sale.recompute_totals();
        SaleEditor { sale }
    }

    /// The sale as it currently stands.
    pub fn sale(&self) -> &Sale {
        &self.sale
    }

    /// Adjusts the quantity of one line by a signed delta.
    ///
    /// ## Rules
    /// - The resulting quantity must stay at least 1; taking a line to zero
    ///   is [`SaleEditor::remove_line`]'s job, not a side effect here
    /// - Rejected changes leave the line exactly as it was
    pub fn change_quantity(&mut self, line: usize, delta: i64) -> CoreResult<()> {
        let item = self
            .sale
            .items
            .get_mut(line)
            .ok_or(CoreError::LineItemNotFound { index: line })?;

        let requested = item.quantity + delta;
        if requested < 1 {
            return Err(CoreError::QuantityBelowMinimum { requested });
        }
        if requested > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            });
        }

        item.quantity = requested;
        self.sale.recompute_totals();
        Ok(())
    }

    /// Removes one line and returns it.
    ///
    /// A sale may end up with zero lines; it remains a valid record whose
    /// subtotal is zero.
    pub fn remove_line(&mut self, line: usize) -> CoreResult<SaleItem> {
        if line >= self.sale.items.len() {
            return Err(CoreError::LineItemNotFound { index: line });
        }

        let removed = self.sale.items.remove(line);
        self.sale.recompute_totals();
        Ok(removed)
    }

    /// Adds one unit of a product to the sale.
    ///
    /// If the product is already on the sale its existing line grows by one
    /// at its frozen price. Otherwise a new line is appended snapshotting
    /// the product's CURRENT catalog price: the amendment happens today, so
    /// it charges today's price.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(item) = self.sale.items.iter_mut().find(|i| i.id == product.id) {
            let requested = item.quantity + 1;
            if requested > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = requested;
        } else {
            if self.sale.items.len() >= MAX_SALE_ITEMS {
                return Err(CoreError::TooManyItems {
                    max: MAX_SALE_ITEMS,
                });
            }
            self.sale.items.push(SaleItem::from_product(product, 1));
        }

        self.sale.recompute_totals();
        Ok(())
    }

    /// Overrides the whole-sale discount with an absolute amount.
    pub fn set_discount(&mut self, amount: Money) -> CoreResult<()> {
        validate_adjustment_amount("discount", amount)?;
        self.sale.discount = amount;
        self.sale.recompute_totals();
        Ok(())
    }

    /// Overrides the whole-sale surcharge with an absolute amount.
    pub fn set_surcharge(&mut self, amount: Money) -> CoreResult<()> {
        validate_adjustment_amount("surcharge", amount)?;
        self.sale.surcharge = amount;
        self.sale.recompute_totals();
        Ok(())
    }

    /// Re-tenders the sale under a different payment method.
    ///
    /// Totals are unaffected; only which session bucket the sale lands in
    /// changes.
    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.sale.payment_method = method;
    }

    /// Moves the sale to a different instant.
    ///
    /// This can move it across a session cutoff, which is exactly what an
    /// operator fixing a wrongly-dated record intends.
    pub fn set_timestamp(&mut self, date: DateTime<Utc>) {
        self.sale.date = date;
    }

    /// Finishes the edit and hands the sale back, totals freshly computed.
    pub fn into_sale(mut self) -> Sale {
        self.sale.recompute_totals();
        self.sale
    }
}

// =============================================================================
// Stock Impact
// =============================================================================

/// One product's inventory consequence of an amendment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDelta {
    /// Product whose sold quantity changed.
    pub product_id: String,

    /// Product name, for operator-facing messages.
    pub name: String,

    /// Change in units sold: positive means the amended sale moved MORE
    /// units (stock should leave the shelf), negative means units came
    /// back.
    pub delta: i64,
}

/// Diffs the line items of a sale before and after an amendment.
///
/// Returned deltas are advisory. Amendments never adjust stock themselves;
/// whether 3 units "returned" by an edit actually went back on the shelf is
/// something only the operator knows.
pub fn stock_impact(before: &[SaleItem], after: &[SaleItem]) -> Vec<StockDelta> {
    let mut seen: Vec<&str> = Vec::new();
    let mut deltas = Vec::new();

    for item in before.iter().chain(after.iter()) {
        if seen.iter().any(|id| *id == item.id) {
            continue;
        }
        seen.push(&item.id);

        let sold_before: i64 = before
            .iter()
            .filter(|i| i.id == item.id)
            .map(|i| i.quantity)
            .sum();
        let sold_after: i64 = after
            .iter()
            .filter(|i| i.id == item.id)
            .map(|i| i.quantity)
            .sum();

        let delta = sold_after - sold_before;
        if delta != 0 {
            deltas.push(StockDelta {
                product_id: item.id.clone(),
                name: item.name.clone(),
                delta,
            });
        }
    }

    deltas
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(id: &str, name: &str, cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: "Almacén".into(),
            price: Money::from_cents(cents),
            stock: 50,
        }
    }

    fn sample_sale() -> Sale {
        let mut sale = Sale {
            id: "sale-1".into(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            items: vec![
                SaleItem::from_product(&product("p1", "Yerba Mate", 500), 2),
                SaleItem::from_product(&product("p2", "Azúcar", 300), 1),
            ],
            subtotal: Money::zero(),
            discount: Money::zero(),
            surcharge: Money::zero(),
            total: Money::zero(),
            payment_method: PaymentMethod::Cash,
        };
        sale.recompute_totals();
        sale
    }

    #[test]
    fn test_change_quantity_recomputes_totals() {
        let mut editor = SaleEditor::new(sample_sale());

        editor.change_quantity(0, 1).unwrap();

        let sale = editor.sale();
        assert_eq!(sale.items[0].quantity, 3);
        assert_eq!(sale.subtotal.cents(), 1800); // 3×500 + 1×300
        assert_eq!(sale.total.cents(), 1800);
    }

    #[test]
    fn test_quantity_cannot_drop_below_one() {
        // Line holds 2 units; a -3 delta would leave -1
        let mut editor = SaleEditor::new(sample_sale());
        let before = editor.sale().clone();

        let err = editor.change_quantity(0, -3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::QuantityBelowMinimum { requested: -1 }
        ));

        // Rejected edit left everything alone
        assert_eq!(editor.sale(), &before);
    }

    #[test]
    fn test_change_quantity_bad_index() {
        let mut editor = SaleEditor::new(sample_sale());
        let err = editor.change_quantity(7, 1).unwrap_err();
        assert!(matches!(err, CoreError::LineItemNotFound { index: 7 }));
    }

    #[test]
    fn test_remove_line_returns_the_item() {
        let mut editor = SaleEditor::new(sample_sale());

        let removed = editor.remove_line(1).unwrap();
        assert_eq!(removed.id, "p2");

        let sale = editor.sale();
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.subtotal.cents(), 1000);
    }

    #[test]
    fn test_sale_may_end_up_empty() {
        let mut editor = SaleEditor::new(sample_sale());
        editor.remove_line(1).unwrap();
        editor.remove_line(0).unwrap();

        let sale = editor.into_sale();
        assert!(sale.items.is_empty());
        assert_eq!(sale.subtotal, Money::zero());
        assert_eq!(sale.total, Money::zero());
    }

    #[test]
    fn test_add_product_grows_existing_line() {
        let mut editor = SaleEditor::new(sample_sale());

        // p1 is already on the sale at its frozen 500; today it costs 999
        editor.add_product(&product("p1", "Yerba Mate", 999)).unwrap();

        let sale = editor.sale();
        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.items[0].quantity, 3);
        assert_eq!(sale.items[0].price.cents(), 500); // frozen price kept
        assert_eq!(sale.subtotal.cents(), 1800);
    }

    #[test]
    fn test_add_product_appends_at_current_price() {
        let mut editor = SaleEditor::new(sample_sale());

        editor.add_product(&product("p3", "Fideos", 450)).unwrap();

        let sale = editor.sale();
        assert_eq!(sale.items.len(), 3);
        assert_eq!(sale.items[2].price.cents(), 450);
        assert_eq!(sale.subtotal.cents(), 1750);
    }

    #[test]
    fn test_adjustments_rewrite_the_total() {
        let mut editor = SaleEditor::new(sample_sale());

        editor.set_discount(Money::from_cents(100)).unwrap();
        editor.set_surcharge(Money::from_cents(50)).unwrap();

        let sale = editor.sale();
        assert_eq!(sale.subtotal.cents(), 1300);
        assert_eq!(sale.total.cents(), 1250); // 1300 - 100 + 50
    }

    #[test]
    fn test_negative_adjustment_is_rejected() {
        let mut editor = SaleEditor::new(sample_sale());
        let before = editor.sale().clone();

        assert!(editor.set_discount(Money::from_cents(-1)).is_err());
        assert_eq!(editor.sale(), &before);
    }

    #[test]
    fn test_total_identity_holds_through_a_whole_edit() {
        let mut editor = SaleEditor::new(sample_sale());

        editor.change_quantity(0, 2).unwrap();
        editor.set_discount(Money::from_cents(200)).unwrap();
        editor.remove_line(1).unwrap();
        editor.set_surcharge(Money::from_cents(75)).unwrap();
        editor.set_payment_method(PaymentMethod::Transfer);

        let sale = editor.into_sale();
        assert_eq!(sale.total, sale.subtotal - sale.discount + sale.surcharge);
        assert_eq!(sale.payment_method, PaymentMethod::Transfer);
    }

    #[test]
    fn test_new_repairs_drifted_totals() {
        let mut sale = sample_sale();
        // Simulate a record whose stored totals no longer match its lines
        sale.total = Money::from_cents(1);
        sale.subtotal = Money::from_cents(1);

        let editor = SaleEditor::new(sale);
        assert_eq!(editor.sale().subtotal.cents(), 1300);
        assert_eq!(editor.sale().total.cents(), 1300);
    }

    #[test]
    fn test_stock_impact_of_quantity_change() {
        let before = sample_sale();
        let mut editor = SaleEditor::new(before.clone());
        editor.change_quantity(0, 1).unwrap();
        let after = editor.into_sale();

        let deltas = stock_impact(&before.items, &after.items);
        assert_eq!(
            deltas,
            vec![StockDelta {
                product_id: "p1".into(),
                name: "Yerba Mate".into(),
                delta: 1,
            }]
        );
    }

    #[test]
    fn test_stock_impact_of_removal_is_negative() {
        let before = sample_sale();
        let mut editor = SaleEditor::new(before.clone());
        editor.remove_line(1).unwrap();
        let after = editor.into_sale();

        let deltas = stock_impact(&before.items, &after.items);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].product_id, "p2");
        assert_eq!(deltas[0].delta, -1);
    }

    #[test]
    fn test_stock_impact_of_deleting_a_sale() {
        let sale = sample_sale();

        // A deleted sale returns every unit it had sold
        let deltas = stock_impact(&sale.items, &[]);
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].delta, -2);
        assert_eq!(deltas[1].delta, -1);
    }

    #[test]
    fn test_stock_impact_unchanged_sale_is_empty() {
        let sale = sample_sale();
        assert!(stock_impact(&sale.items, &sale.items).is_empty());
    }
}
