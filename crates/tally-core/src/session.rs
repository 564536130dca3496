//! # Session State Resolution
//!
//! Derives whether the register is open or closed, and since when, from
//! the two event logs that record every opening and closure.
//!
//! ## No Stored Flag
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE REGISTER HAS NO is_open COLUMN                                     │
//! │                                                                         │
//! │  Openings log:   ──O₁────────O₂──────────────O₃──────────►  time       │
//! │  Closures log:   ───────C₁──────────C₂─────────────────►               │
//! │                                                                         │
//! │  State = compare the LATEST entry of each log:                          │
//! │    latest opening O₃ after latest closure C₂  →  OPEN since O₃          │
//! │    latest closure at or after latest opening  →  CLOSED                 │
//! │    no openings at all                         →  NEVER OPENED           │
//! │                                                                         │
//! │  Any machine folding the same two logs gets the same answer. There is  │
//! │  no stored flag to drift out of sync or survive a crash stale.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ties
//! - Equal timestamps across the two logs: the closure wins, so the
//!   register reads closed. Reopening writes a strictly later opening.
//! - Equal timestamps within one log: the larger record id wins. Arbitrary,
//!   but every replica picks the same record.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{CashClosure, CashOpening};

// =============================================================================
// Session State
// =============================================================================

/// The resolved state of the register.
///
/// Carries the winning record so callers can reach the opening float or
/// the last counted drawer without a second lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No opening has ever been recorded.
    NeverOpened,

    /// The latest opening is strictly newer than every closure.
    Open {
        /// The opening that started the current session.
        opening: CashOpening,
    },

    /// The latest closure is at least as new as the latest opening.
    Closed {
        /// The closure that ended the most recent session.
        last_closure: CashClosure,
    },
}

impl SessionState {
    /// True when a session is currently in progress.
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, SessionState::Open { .. })
    }

    /// The session cutoff: records strictly after this instant belong to
    /// the current (or next) session.
    ///
    /// ## Rules
    /// - Open: the current opening's timestamp
    /// - Closed: the last closure's timestamp
    /// - Never opened: `None`, meaning every record on file is in scope
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        match self {
            SessionState::NeverOpened => None,
            SessionState::Open { opening } => Some(opening.date),
            SessionState::Closed { last_closure } => Some(last_closure.date),
        }
    }

    /// The float counted in at the start of the current session, or zero
    /// when no session is open.
    pub fn opening_float(&self) -> Money {
        match self {
            SessionState::Open { opening } => opening.amount,
            _ => Money::zero(),
        }
    }

    /// The drawer amount the last closure expected, offered to the operator
    /// as the float for the next opening.
    pub fn suggested_float(&self) -> Option<Money> {
        match self {
            SessionState::Closed { last_closure } => Some(last_closure.total_cash),
            _ => None,
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolves the register state from the full opening and closure logs.
///
/// Pure and total: any slice contents produce a state, and the same slices
/// always produce the same state.
///
/// ## Example
/// ```rust
/// use tally_core::session::{resolve_session, SessionState};
///
/// assert_eq!(resolve_session(&[], &[]), SessionState::NeverOpened);
/// ```
pub fn resolve_session(openings: &[CashOpening], closures: &[CashClosure]) -> SessionState {
    // A closure can only end a session, so without a single opening the
    // register was never opened, no matter what the closure log holds.
    let opening = match latest_opening(openings) {
        Some(opening) => opening,
        None => return SessionState::NeverOpened,
    };

    match latest_closure(closures) {
        // Strict comparison: on an exact tie the closure wins
        Some(closure) if opening.date > closure.date => SessionState::Open {
            opening: opening.clone(),
        },
        Some(closure) => SessionState::Closed {
            last_closure: closure.clone(),
        },
        None => SessionState::Open {
            opening: opening.clone(),
        },
    }
}

/// Newest opening, with the record id breaking timestamp ties.
fn latest_opening(openings: &[CashOpening]) -> Option<&CashOpening> {
    openings
        .iter()
        .max_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)))
}

/// Newest closure, with the record id breaking timestamp ties.
fn latest_closure(closures: &[CashClosure]) -> Option<&CashClosure> {
    closures
        .iter()
        .max_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)))
}

// =============================================================================
// Unit Tests
// =============================================================================
