//! # Error Types
//!
//! Domain-specific error types for medpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  medpos-core (this file)                                               │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  medpos-db                                                             │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  medpos-engine                                                         │
//! │  └── EngineError      - CoreError | DbError                            │
//! │                                                                         │
//! │  apps/api                                                              │
//! │  └── ApiError         - {success:false, error} + HTTP status           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → ApiError → Client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while building or reversing a sale.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Inventory item referenced by a sale line does not exist.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Not enough base-unit stock to cover a line.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale line: Paracetamol 500mg, 3 boxes (x10 tablets)
    ///      │
    ///      ▼
    /// needed = 30 base units, available = 12
    ///      │
    ///      ▼
    /// InsufficientStock { item_name: "Paracetamol 500mg", available: 12, needed: 30 }
    ///      │
    ///      ▼
    /// Cashier sees: "Insufficient stock for Paracetamol 500mg: available 12, needed 30"
    /// ```
    #[error("Insufficient stock for {item_name}: available {available}, needed {needed}")]
    InsufficientStock {
        item_name: String,
        available: i64,
        needed: i64,
    },

    /// The idempotency key is already registered (in flight or recently done).
    #[error("Duplicate request: a sale with this idempotency key is already being processed")]
    DuplicateRequest { key: String },

    /// CREDIT sale without the customer identity needed to collect later.
    #[error("Customer name and phone are required for credit sales")]
    MissingCreditCustomer,

    /// Sale does not exist (or was already voided).
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Receivable does not exist.
    #[error("Receivable not found: {0}")]
    ReceivableNotFound(String),

    /// Payment would push a receivable past its total.
    #[error("Payment of {amount} exceeds remaining balance {balance}")]
    Overpayment { amount: i64, balance: i64 },

    /// Receivable is already settled.
    #[error("Receivable {0} is already paid")]
    ReceivableSettled(String),

    /// A stock movement would break `new = previous ± quantity`.
    #[error("Ledger invariant violated for item {item_id}: {reason}")]
    LedgerInvariant { item_id: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any I/O; nothing needs rolling back.
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

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Sale has no lines.
    #[error("Sale must contain at least one item")]
    EmptySale,

    /// Discount larger than the gross subtotal.
    #[error("Discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: i64, subtotal: i64 },

    /// A computed amount does not fit in an `i64` of cents.
    #[error("{field} is too large")]
    AmountOverflow { field: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            item_name: "Amoxicillin 500mg".to_string(),
            available: 3,
            needed: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Amoxicillin 500mg: available 3, needed 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("items").to_string(), "items is required");
        assert_eq!(
            ValidationError::EmptySale.to_string(),
            "Sale must contain at least one item"
        );
    }

    #[test]
    fn test_validation_message_is_surfaced_verbatim() {
        let core_err: CoreError = ValidationError::EmptySale.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Sale must contain at least one item");
    }
}
