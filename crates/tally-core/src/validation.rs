//! # Validation Module
//!
//! Input validation utilities for Tally POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host Application                                              │
//! │  ├── Basic format checks (empty, length)                                │
//! │  └── Immediate operator feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Register Engine Entry Points                                  │
//! │  └── THIS MODULE: rejected input never reaches the record store         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pure Logic Invariants                                         │
//! │  └── Recomputed totals, cutoff comparisons, capability checks           │
//! │                                                                         │
//! │  Defense in depth: a bad amount fails here, not in a stored record     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::validation::{validate_opening_float, validate_quantity};
//!
//! assert!(validate_opening_float(Money::from_cents(1000)).is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Money Validators
// =============================================================================

/// Validates an opening float.
///
/// ## Rules
/// - Must be zero or more (an empty drawer is a legal way to open)
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::validation::validate_opening_float;
///
/// assert!(validate_opening_float(Money::zero()).is_ok());
/// assert!(validate_opening_float(Money::from_cents(-1)).is_err());
/// ```
pub fn validate_opening_float(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "opening float".to_string(),
        });
    }

    Ok(())
}

/// Validates an expense amount.
///
/// ## Rules
/// - Must be strictly positive; a zero expense records nothing
pub fn validate_expense_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "expense amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a whole-sale discount or surcharge override.
///
/// ## Rules
/// - Must be zero or more; the sign lives in the totals formula, not here
pub fn validate_adjustment_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates an expense description.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 200 characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates free-form notes on openings and closures.
///
/// ## Rules
/// - May be empty
/// - Maximum 500 characters
pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates a business name for settings.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 100 characters
pub fn validate_business_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "business name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "business name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a whole-cart discount percentage.
///
/// ## Rules
/// - Must be between 0 and 100
pub fn validate_discount_percent(pct: u8) -> ValidationResult<()> {
    if pct > 100 {
        return Err(ValidationError::OutOfRange {
            field: "discount percent".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a record id before a targeted store operation.
///
/// ## Rules
/// - Must not be empty
/// - Must parse as a UUID (the store only ever assigns UUID v4 ids)
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_record_id;
///
/// assert!(validate_record_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_record_id("not-a-uuid").is_err());
/// ```
pub fn validate_record_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a full settings document before it is saved.
pub fn validate_settings(settings: &crate::types::CompanySettings) -> ValidationResult<()> {
    validate_business_name(&settings.name)?;

    if settings.address.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "address".to_string(),
            max: 200,
        });
    }

    if settings.phone.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 50,
        });
    }

    if settings.footer_message.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "footer message".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompanySettings;

    #[test]
    fn test_validate_opening_float() {
        assert!(validate_opening_float(Money::zero()).is_ok());
        assert!(validate_opening_float(Money::from_cents(100_000)).is_ok());
        assert!(validate_opening_float(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_expense_amount() {
        assert!(validate_expense_amount(Money::from_cents(100)).is_ok());
        assert!(validate_expense_amount(Money::zero()).is_err());
        assert!(validate_expense_amount(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_adjustment_amount() {
        assert!(validate_adjustment_amount("discount", Money::zero()).is_ok());
        assert!(validate_adjustment_amount("discount", Money::from_cents(500)).is_ok());
        assert!(validate_adjustment_amount("surcharge", Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Proveedor de lácteos").is_ok());
        assert!(validate_description("").is_err());
        assert!(validate_description("   ").is_err());
        assert!(validate_description(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert!(validate_notes("").is_ok());
        assert!(validate_notes("fin de turno").is_ok());
        assert!(validate_notes(&"A".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_discount_percent() {
        assert!(validate_discount_percent(0).is_ok());
        assert!(validate_discount_percent(100).is_ok());
        assert!(validate_discount_percent(101).is_err());
    }

    #[test]
    fn test_validate_record_id() {
        assert!(validate_record_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_record_id("").is_err());
        assert!(validate_record_id("not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_settings() {
        let mut settings = CompanySettings {
            name: "Almacén Don Mario".into(),
            ..CompanySettings::default()
        };
        assert!(validate_settings(&settings).is_ok());

        settings.name = String::new();
        assert!(validate_settings(&settings).is_err());
    }
}
