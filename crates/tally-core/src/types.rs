//! # Domain Types
//!
//! Core record types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Persisted Records                                │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │     Expense     │   │   CashOpening   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  date           │   │  date           │   │  date           │       │
//! │  │  items[]        │   │  description    │   │  amount (float) │       │
//! │  │  subtotal       │   │  amount         │   │  notes          │       │
//! │  │  discount       │   │  category       │   └─────────────────┘       │
//! │  │  surcharge      │   │  paymentMethod  │   ┌─────────────────┐       │
//! │  │  total          │   └─────────────────┘   │   CashClosure   │       │
//! │  │  paymentMethod  │                         │  ─────────────  │       │
//! │  └─────────────────┘                         │  totals snapshot│       │
//! │                                              └─────────────────┘       │
//! │                                                                         │
//! │  Enums carry their wire spelling: PaymentMethod and ExpenseCategory    │
//! │  serialize to the Spanish labels the existing records already use.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Contract
//! - Every record serializes with camelCase field names
//! - Timestamps live in a field named `date` (RFC 3339 via chrono)
//! - Money fields are bare integers in minor units
//! - `SaleItem.id` is the id of the product it snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale or expense was paid.
///
/// ## Wire Spelling
/// The serialized values are the Spanish labels used by the existing
/// record data. The Rust identifiers stay English so call sites read
/// naturally; serde bridges the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Physical cash. The only method that moves the drawer.
    #[serde(rename = "Efectivo")]
    Cash,
    /// Debit card on an external terminal.
    #[serde(rename = "Débito")]
    Debit,
    /// Credit card on an external terminal.
    #[serde(rename = "Crédito")]
    Credit,
    /// Bank transfer.
    #[serde(rename = "Transferencia")]
    Transfer,
    /// QR code / digital wallet payment.
    #[serde(rename = "QR / Billetera Virtual")]
    DigitalWallet,
}

impl PaymentMethod {
    /// Every method, in display order. Useful for exhaustive breakdowns.
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Debit,
        PaymentMethod::Credit,
        PaymentMethod::Transfer,
        PaymentMethod::DigitalWallet,
    ];

    /// True only for physical cash.
    ///
    /// Everything else settles outside the drawer and never affects the
    /// expected cash count.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }

    /// The human-facing label (matches the wire spelling).
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Debit => "Débito",
            PaymentMethod::Credit => "Crédito",
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::DigitalWallet => "QR / Billetera Virtual",
        }
    }
}

// =============================================================================
// Expense Category
// =============================================================================

/// Bookkeeping category for an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    /// Rent, utilities, premises upkeep.
    #[serde(rename = "Local")]
    Premises,
    /// Wages and salary advances.
    #[serde(rename = "Sueldos")]
    Payroll,
    /// Stock purchases from suppliers.
    #[serde(rename = "Mercadería")]
    Merchandise,
    /// Third-party services.
    #[serde(rename = "Servicios")]
    Services,
    /// Anything that fits nowhere else.
    #[serde(rename = "Otros")]
    Other,
}

impl ExpenseCategory {
    /// The human-facing label (matches the wire spelling).
    pub const fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Premises => "Local",
            ExpenseCategory::Payroll => "Sueldos",
            ExpenseCategory::Merchandise => "Mercadería",
            ExpenseCategory::Services => "Servicios",
            ExpenseCategory::Other => "Otros",
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// Capability level of the operator performing an action.
///
/// Callers authenticate operators themselves (PIN entry lives in the host
/// application); the engine only cares which capability bucket the
/// already-verified operator falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access: can delete records, amend committed sales, edit settings.
    Admin,
    /// Day-to-day operation: ring sales, record expenses, open and close.
    Cashier,
}

impl Role {
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "administrator"),
            Role::Cashier => write!(f, "cashier"),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// Products are inputs to this engine, not records it owns: sales snapshot
/// the product fields they need at ring-up time (see [`SaleItem`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on reports.
    pub name: String,

    /// Catalog category (free-form).
    pub category: String,

    /// Current list price.
    pub price: Money,

    /// Units on hand.
    pub stock: i64,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// Uses the snapshot pattern: name, category and price are frozen copies of
/// the product at the moment it was rung up. Later catalog edits never
/// rewrite history.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    /// Id of the product this line snapshots.
    pub id: String,

    /// Product name at time of sale (frozen).
    pub name: String,

    /// Product category at time of sale (frozen).
    pub category: String,

    /// Unit list price at time of sale (frozen).
    pub price: Money,

    /// Per-line price override, when the cashier negotiated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_price: Option<Money>,

    /// Quantity sold.
    pub quantity: i64,
}

impl SaleItem {
    /// Snapshots a product into a line item.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        SaleItem {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            applied_price: None,
            quantity,
        }
    }

    /// The unit price this line actually charges (override wins).
    #[inline]
    pub fn effective_price(&self) -> Money {
        self.applied_price.unwrap_or(self.price)
    }

    /// Line total: effective unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.effective_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale transaction.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Unique identifier (UUID v4, assigned by the store).
    pub id: String,

    /// When the sale was rung up.
    pub date: DateTime<Utc>,

    /// Line items, in ring-up order.
    pub items: Vec<SaleItem>,

    /// Sum of line totals, before adjustments.
    pub subtotal: Money,

    /// Absolute discount applied to the whole sale.
    pub discount: Money,

    /// Absolute surcharge applied to the whole sale.
    pub surcharge: Money,

    /// What the customer paid: subtotal − discount + surcharge.
    pub total: Money,

    /// How the customer paid.
    pub payment_method: PaymentMethod,
}

impl Sale {
    /// Recomputes `subtotal` and `total` from the current line items and
    /// adjustments.
    ///
    /// ## Rules
    /// - `subtotal` is always the sum of line totals
    /// - `total = subtotal − discount + surcharge`, never anything else
    ///
    /// Every mutation path calls this before a sale is persisted, so a
    /// stored sale can never carry totals that disagree with its lines.
    pub fn recompute_totals(&mut self) {
        self.subtotal = self.items.iter().map(SaleItem::line_total).sum();
        self.total = self.subtotal - self.discount + self.surcharge;
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A cash-out or cost recorded against the business.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Unique identifier (UUID v4, assigned by the store).
    pub id: String,

    /// When the expense was recorded.
    pub date: DateTime<Utc>,

    /// What the money was spent on.
    pub description: String,

    /// Amount spent (always positive).
    pub amount: Money,

    /// Bookkeeping category.
    pub category: ExpenseCategory,

    /// How it was paid. Cash expenses come out of the drawer.
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Cash Opening
// =============================================================================

/// A register-opened event: the start of a session.
///
/// `amount` is the float counted into the drawer at opening time.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOpening {
    /// Unique identifier (UUID v4, assigned by the store).
    pub id: String,

    /// When the register was opened. Doubles as the session cutoff.
    pub date: DateTime<Utc>,

    /// Opening float counted into the drawer.
    pub amount: Money,

    /// Free-form note from the operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Cash Closure
// =============================================================================

/// A register-closed event: the end of a session, with its reconciliation
/// frozen in.
///
/// A closure is a historical document. Its totals are computed once at
/// closing time and never recalculated, even if the records they summarize
/// are later amended.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashClosure {
    /// Unique identifier (UUID v4, assigned by the store).
    pub id: String,

    /// When the register was closed.
    pub date: DateTime<Utc>,

    /// Opening float of the session being closed.
    pub initial_amount: Money,

    /// All sales in the session, cash and digital combined.
    pub total_sales: Money,

    /// All expenses in the session, any payment method.
    pub total_expenses: Money,

    /// Expected drawer at closing: float + cash sales − cash expenses.
    pub total_cash: Money,

    /// Non-cash sales in the session.
    pub total_digital: Money,

    /// Number of sales in the session.
    pub transaction_count: u32,

    /// Free-form note from the operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Company Settings
// =============================================================================

/// Store-wide configuration singleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    /// Business name, printed at the top of reports.
    pub name: String,

    /// Street address.
    pub address: String,

    /// Contact phone.
    pub phone: String,

    /// Closing line printed at the bottom of reports.
    pub footer_message: String,

    /// PIN the host application checks before granting [`Role::Admin`].
    /// The engine itself never reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_pin: Option<String>,

    /// Where closure reports are sent. `None` disables report delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_contact: Option<String>,
}

impl Default for CompanySettings {
    fn default() -> Self {
        CompanySettings {
            name: String::new(),
            address: String::new(),
            phone: String::new(),
            footer_message: String::new(),
            admin_pin: None,
            report_contact: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
