//! # Register Error Type
//!
//! What callers of the engine see when an operation fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally POS                              │
//! │                                                                         │
//! │  Host application                                                       │
//! │       │ open_register / close_register / record_sale / ...             │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Register operation                                              │  │
//! │  │                                                                  │  │
//! │  │  Input invalid?  ── ValidationError ──┐   (nothing was written)  │  │
//! │  │  State wrong?    ── AlreadyOpen /     │                          │  │
//! │  │                     NotOpen /         ├──► RegisterError ──►     │  │
//! │  │                     NotPermitted      │        caller            │  │
//! │  │  Store failed?   ── StoreError ───────┘   (derived state only    │  │
//! │  │                                            moves on confirmed    │  │
//! │  │                                            snapshots)            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation and state errors are rejected before any store call, so a
//! failed operation never leaves a half-written record behind.

use thiserror::Error;

use tally_core::error::{CoreError, ValidationError};
use tally_core::types::Role;
use tally_store::StoreError;

// =============================================================================
// Register Error
// =============================================================================

/// Errors from register engine operations.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Opening was attempted while a session is already in progress.
    #[error("Register is already open")]
    AlreadyOpen,

    /// Closing (or any session-scoped operation) was attempted with no
    /// session in progress.
    #[error("Register is not open")]
    NotOpen,

    /// The operator's role does not cover the operation.
    #[error("{operation} requires administrator access ({role} given)")]
    NotPermitted {
        /// The role the caller presented.
        role: Role,
        /// The operation that was refused.
        operation: String,
    },

    /// Operator input failed validation. Nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A business rule in the pure core rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The record store refused or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegisterError {
    /// True when retrying the exact same call can succeed once the state
    /// observed by the loser catches up.
    ///
    /// Conditional-write conflicts are the normal outcome of two terminals
    /// racing; everything else needs operator attention first.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RegisterError::Store(StoreError::VersionConflict { .. }))
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with RegisterError.
pub type RegisterResult<T> = Result<T, RegisterError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(RegisterError::AlreadyOpen.to_string(), "Register is already open");
        assert_eq!(RegisterError::NotOpen.to_string(), "Register is not open");

        let err = RegisterError::NotPermitted {
            role: Role::Cashier,
            operation: "delete_expense".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "delete_expense requires administrator access (cashier given)"
        );
    }

    #[test]
    fn test_transparent_wrapping_keeps_the_message() {
        let err: RegisterError = ValidationError::MustBeNonNegative {
            field: "opening float".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "opening float must not be negative");
    }

    #[test]
    fn test_conflict_classification() {
        let conflict: RegisterError = StoreError::VersionConflict {
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(conflict.is_conflict());

        assert!(!RegisterError::AlreadyOpen.is_conflict());
        let denied: RegisterError = StoreError::write_denied("append_sale").into();
        assert!(!denied.is_conflict());
    }
}
