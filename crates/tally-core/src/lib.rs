//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate is the **heart** of Tally POS. It contains all register
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Terminal / Host Application                  │   │
//! │  │    open register ──► ring sales ──► amend ──► close & report   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               tally-register (Engine Layer)                      │   │
//! │  │    open/close operations, live snapshots, closure reports       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  session  │  │  totals   │  │ reconcile │  │   amend   │  │   │
//! │  │   │  resolve  │  │accumulate │  │  netCash  │  │SaleEditor │  │   │
//! │  │   │  cutoff   │  │ partition │  │  closure  │  │StockDelta │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-store (Record Store)                    │   │
//! │  │          append-mostly record logs, live collection views        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Sale, Expense, CashOpening, CashClosure, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`session`] - Resolve open/closed register state from the record logs
//! - [`totals`] - Accumulate per-session sales and expense totals
//! - [`reconcile`] - Expected-drawer math and closure construction
//! - [`amend`] - Post-hoc sale editing with stock impact analysis
//! - [`cart`] - In-progress sale building and checkout
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Session state is a fold over the record logs -
//!    same logs = same answer, on any machine, at any time
//! 2. **No I/O**: Database, network, clock access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in minor units (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::session::resolve_session;
//! use tally_core::totals::accumulate_session;
//! use tally_core::reconcile::reconcile;
//!
//! // An untouched register: no openings, no closures
//! let state = resolve_session(&[], &[]);
//! assert!(!state.is_open());
//!
//! // With no session cutoff the accumulator sees every record
//! let totals = accumulate_session(&[], &[], state.cutoff());
//! let recon = reconcile(&state, &totals);
//!
//! // Nothing rang up, nothing in the drawer
//! assert_eq!(recon.net_cash, Money::zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amend;
pub mod cart;
pub mod error;
pub mod money;
pub mod reconcile;
pub mod session;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Money` instead of
// `use tally_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use session::SessionState;
pub use totals::SessionTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Card surcharge rate in basis points (10.00%)
///
/// ## Why a constant?
/// The surcharge applied when a sale is flagged for card recovery is a
/// store-wide policy, not a per-sale input. It is charged on the
/// post-discount subtotal. Can be made configurable per-store in future
/// versions.
pub const SURCHARGE_RATE_BPS: u32 = 1000;

/// Maximum line items allowed in a single sale
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_SALE_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
