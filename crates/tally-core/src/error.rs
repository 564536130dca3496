//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  tally-store errors (separate crate)                                    │
//! │  └── StoreError       - Record store failures                           │
//! │                                                                         │
//! │  tally-register errors (separate crate)                                 │
//! │  └── RegisterError    - What callers of the engine see                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → RegisterError → Caller            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, index, etc.)
//! 3. Errors are enum variants, never String
//! 4. A rejected mutation leaves its target untouched

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. When a mutation returns
/// one of these, the sale or cart it targeted is guaranteed unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line index pointed past the end of the sale.
    ///
    /// ## When This Occurs
    /// - Amending a sale with a stale line index
    /// - The line was removed by an earlier edit in the same session
    #[error("Sale has no line item at index {index}")]
    LineItemNotFound { index: usize },

    /// A quantity change would take a line below one unit.
    ///
    /// ## When This Occurs
    /// - Editing quantity with a negative delta larger than the current count
    ///
    /// ## User Workflow
    /// ```text
    /// Line: 2 × Yerba Mate
    ///      │
    ///      ▼
    /// change_quantity(delta: -3) → would be -1
    ///      │
    ///      ▼
    /// QuantityBelowMinimum { requested: -1 }
    ///      │
    ///      ▼
    /// UI shows: "remove the line instead"
    /// ```
    #[error("Quantity must be at least 1, change would make it {requested}")]
    QuantityBelowMinimum { requested: i64 },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Sale has exceeded maximum allowed line items.
    #[error("Sale cannot have more than {max} line items")]
    TooManyItems { max: usize },

    /// Insufficient stock to ring up the requested quantity.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The product is not in the cart.
    #[error("Product {product_id} is not in the cart")]
    ProductNotInCart { product_id: String },

    /// Checkout was attempted on an empty cart.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// Used for early validation before any record is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityBelowMinimum { requested: -1 };
        assert_eq!(
            err.to_string(),
            "Quantity must be at least 1, change would make it -1"
        );

        let err = CoreError::InsufficientStock {
            product: "Yerba Mate 500g".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Yerba Mate 500g: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "description".to_string(),
        };
        assert_eq!(err.to_string(), "description is required");

        let err = ValidationError::MustBeNonNegative {
            field: "opening float".to_string(),
        };
        assert_eq!(err.to_string(), "opening float must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
