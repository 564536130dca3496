//! # Store Error Types
//!
//! Error types for record store operations.
//!
//! ## The Read/Write Distinction
//! A register that cannot WRITE is degraded: it keeps deriving and showing
//! session state from the live views it already holds. A register that
//! cannot READ is blind: with no collection snapshots there is no state to
//! derive at all. [`StoreError::is_read_starvation`] is how callers tell
//! the two apart.

use std::fmt;
use thiserror::Error;

// =============================================================================
// Access
// =============================================================================

/// Which side of the store an operation needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Errors from record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with that id in the collection.
    ///
    /// ## When This Occurs
    /// - Replace/delete aimed at a record another operator already removed
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The store rejected the operation outright.
    #[error("{access} access denied for {operation}")]
    PermissionDenied { operation: String, access: Access },

    /// A conditional append lost its race.
    ///
    /// ## When This Occurs
    /// - Two terminals try to open (or close) the register at once; the
    ///   slower one's `expected_version` is stale by the time it lands
    #[error("session log version conflict: expected {expected}, store is at {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    /// A live collection view stopped delivering snapshots.
    ///
    /// ## When This Occurs
    /// - The store that owned the watch channel was dropped or shut down
    #[error("live view of {collection} was lost")]
    SubscriptionLost { collection: String },

    /// The store could not service the operation at all.
    #[error("store unavailable during {operation}: {reason}")]
    Unavailable { operation: String, reason: String },
}

impl StoreError {
    /// Convenience constructor for NotFound.
    pub fn not_found(entity: &str, id: &str) -> Self {
        StoreError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for a rejected write.
    pub fn write_denied(operation: &str) -> Self {
        StoreError::PermissionDenied {
            operation: operation.to_string(),
            access: Access::Write,
        }
    }

    /// Convenience constructor for a rejected read.
    pub fn read_denied(operation: &str) -> Self {
        StoreError::PermissionDenied {
            operation: operation.to_string(),
            access: Access::Read,
        }
    }

    /// Convenience constructor for SubscriptionLost.
    pub fn subscription_lost(collection: &str) -> Self {
        StoreError::SubscriptionLost {
            collection: collection.to_string(),
        }
    }

    /// True when the error means the engine can no longer SEE the records.
    ///
    /// Read starvation is fatal for state derivation; a denied write merely
    /// degrades the register to read-only.
    pub fn is_read_starvation(&self) -> bool {
        matches!(
            self,
            StoreError::SubscriptionLost { .. }
                | StoreError::PermissionDenied {
                    access: Access::Read,
                    ..
                }
        )
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
