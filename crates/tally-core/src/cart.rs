//! # Cart
//!
//! Builds a sale one product at a time, then checks it out into a [`Sale`]
//! record ready for the store.
//!
//! ## Price Freezing
//! A product is snapshotted into the cart at its price at ring-up time.
//! Catalog edits made while the cart is open do not move lines already in
//! it.
//!
//! ## Adjustments
//! - Discount: a whole-cart percentage (0-100), taken off the subtotal
//! - Surcharge: an optional flat-rate recovery fee, charged on the
//!   post-discount subtotal when the flag is set

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, Product, Sale, SaleItem};
use crate::validation::{validate_discount_percent, validate_quantity};
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_ITEMS, SURCHARGE_RATE_BPS};

// =============================================================================
// Cart
// =============================================================================

/// An in-progress sale.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<SaleItem>,
    discount_percent: u8,
    /// Charge the card-recovery surcharge at checkout.
    pub apply_surcharge: bool,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Lines currently in the cart, in ring-up order.
    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Adds one unit of a product.
    ///
    /// An existing line grows by one; otherwise a new line is appended with
    /// the product's price frozen in. Never rings up more units than the
    /// product has in stock.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        let already = self
            .items
            .iter()
            .find(|i| i.id == product.id)
            .map_or(0, |i| i.quantity);
        let requested = already + 1;

        if requested > product.stock {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested,
            });
        }
        if requested > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            });
        }

        match self.items.iter_mut().find(|i| i.id == product.id) {
            Some(item) => item.quantity = requested,
            None => {
                if self.items.len() >= MAX_SALE_ITEMS {
                    return Err(CoreError::TooManyItems {
                        max: MAX_SALE_ITEMS,
                    });
                }
                self.items.push(SaleItem::from_product(product, 1));
            }
        }

        Ok(())
    }

    /// Sets a product's quantity outright.
    ///
    /// ## Rules
    /// - Below 1 removes the line (absent lines are fine to "remove")
    /// - Capped at the product's available stock
    /// - Setting a quantity for a product not yet in the cart adds it
    pub fn update_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            self.items.retain(|i| i.id != product.id);
            return Ok(());
        }

        validate_quantity(quantity)?;

        let capped = quantity.min(product.stock);
        if capped < 1 {
            // Nothing in stock: the line cannot exist
            self.items.retain(|i| i.id != product.id);
            return Ok(());
        }

        match self.items.iter_mut().find(|i| i.id == product.id) {
            Some(item) => item.quantity = capped,
            None => {
                if self.items.len() >= MAX_SALE_ITEMS {
                    return Err(CoreError::TooManyItems {
                        max: MAX_SALE_ITEMS,
                    });
                }
                self.items.push(SaleItem::from_product(product, capped));
            }
        }

        Ok(())
    }

    /// Removes a product's line entirely.
    pub fn remove_product(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.id != product_id);

        if self.items.len() == before {
            return Err(CoreError::ProductNotInCart {
                product_id: product_id.to_string(),
            });
        }

        Ok(())
    }

    /// Empties the cart and resets the adjustments.
    pub fn clear(&mut self) {
        self.items.clear();
        self.discount_percent = 0;
        self.apply_surcharge = false;
    }

    /// Sets the whole-cart discount percentage (0-100).
    pub fn set_discount_percent(&mut self, pct: u8) -> CoreResult<()> {
        validate_discount_percent(pct)?;
        self.discount_percent = pct;
        Ok(())
    }

    pub fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Sum of line totals.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(SaleItem::line_total).sum()
    }

    /// The discount in money terms.
    pub fn discount_amount(&self) -> Money {
        self.subtotal().percentage(self.discount_percent as u32 * 100)
    }

    /// The surcharge in money terms: a percentage of the post-discount
    /// subtotal, or zero when the flag is off.
    pub fn surcharge_amount(&self) -> Money {
        if !self.apply_surcharge {
            return Money::zero();
        }
        (self.subtotal() - self.discount_amount()).percentage(SURCHARGE_RATE_BPS)
    }

    /// What the customer pays.
    pub fn total(&self) -> Money {
        self.subtotal() - self.discount_amount() + self.surcharge_amount()
    }

    /// All the numbers a checkout screen shows, in one struct.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Turns the cart into a [`Sale`] record, timestamped `at`, ready for
    /// the store to append.
    ///
    /// The cart itself is untouched: callers clear it only after the store
    /// accepts the sale.
    pub fn checkout(&self, method: PaymentMethod, at: DateTime<Utc>) -> CoreResult<Sale> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let mut sale = Sale {
            id: String::new(),
            date: at,
            items: self.items.clone(),
            subtotal: Money::zero(),
            discount: self.discount_amount(),
            surcharge: self.surcharge_amount(),
            total: Money::zero(),
            payment_method: method,
        };
        sale.recompute_totals();
        Ok(sale)
    }
}

// =============================================================================
// Cart Totals DTO
// =============================================================================

/// Totals snapshot for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub discount: Money,
    pub surcharge: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            discount: cart.discount_amount(),
            surcharge: cart.surcharge_amount(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_product(id: &str, cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category: "Almacén".into(),
            price: Money::from_cents(cents),
            stock,
        }
    }

    fn checkout_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_add_product_increments_existing_line() {
        let mut cart = Cart::new();
        let product = test_product("p1", 500, 10);

        cart.add_product(&product).unwrap();
        cart.add_product(&product).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().cents(), 1000);
    }

    #[test]
    fn test_add_product_respects_stock() {
        let mut cart = Cart::new();
        let product = test_product("p1", 500, 2);

        cart.add_product(&product).unwrap();
        cart.add_product(&product).unwrap();
        let err = cart.add_product(&product).unwrap_err();

        assert!(matches!(err, CoreError::InsufficientStock { requested: 3, .. }));
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_price_frozen_at_ring_up() {
        let mut cart = Cart::new();
        let mut product = test_product("p1", 500, 10);
        cart.add_product(&product).unwrap();

        // Catalog price changes while the cart is open
        product.price = Money::from_cents(999);
        cart.update_quantity(&product, 2).unwrap();

        assert_eq!(cart.items()[0].price.cents(), 500);
        assert_eq!(cart.subtotal().cents(), 1000);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        let product = test_product("p1", 500, 10);
        cart.add_product(&product).unwrap();

        cart.update_quantity(&product, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_caps_at_stock() {
        let mut cart = Cart::new();
        let product = test_product("p1", 500, 3);

        cart.update_quantity(&product, 10).unwrap();
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_update_quantity_adds_missing_product() {
        let mut cart = Cart::new();
        let product = test_product("p1", 500, 10);

        cart.update_quantity(&product, 4).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_remove_absent_product_fails() {
        let mut cart = Cart::new();
        let err = cart.remove_product("ghost").unwrap_err();
        assert!(matches!(err, CoreError::ProductNotInCart { .. }));
    }

    #[test]
    fn test_discount_and_surcharge_math() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("p1", 1000, 10)).unwrap();

        cart.set_discount_percent(10).unwrap();
        assert_eq!(cart.discount_amount().cents(), 100);
        assert_eq!(cart.total().cents(), 900);

        // Surcharge is 10% of the POST-discount subtotal
        cart.apply_surcharge = true;
        assert_eq!(cart.surcharge_amount().cents(), 90);
        assert_eq!(cart.total().cents(), 990);
    }

    #[test]
    fn test_invalid_discount_rejected() {
        let mut cart = Cart::new();
        assert!(cart.set_discount_percent(101).is_err());
        assert_eq!(cart.discount_percent(), 0);
    }

    #[test]
    fn test_checkout_builds_consistent_sale() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("p1", 500, 10)).unwrap();
        cart.add_product(&test_product("p2", 300, 10)).unwrap();
        cart.set_discount_percent(10).unwrap();

        let sale = cart.checkout(PaymentMethod::Debit, checkout_time()).unwrap();

        assert!(sale.id.is_empty()); // store assigns it
        assert_eq!(sale.date, checkout_time());
        assert_eq!(sale.subtotal.cents(), 800);
        assert_eq!(sale.discount.cents(), 80);
        assert_eq!(sale.total.cents(), 720);
        assert_eq!(sale.payment_method, PaymentMethod::Debit);

        // Checkout does not consume the cart
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_checkout_empty_cart_fails() {
        let cart = Cart::new();
        let err = cart.checkout(PaymentMethod::Cash, checkout_time()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_totals_dto() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("p1", 500, 10)).unwrap();
        cart.add_product(&test_product("p1", 500, 10)).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.subtotal.cents(), 1000);

        let value = serde_json::to_value(&totals).unwrap();
        assert_eq!(value["itemCount"], 1);
        assert_eq!(value["totalQuantity"], 2);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("p1", 500, 10)).unwrap();
        cart.set_discount_percent(15).unwrap();
        cart.apply_surcharge = true;

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.discount_percent(), 0);
        assert!(!cart.apply_surcharge);
        assert!(cart.total().is_zero());
    }
}
