//! # Validation Module
//!
//! Normalizes and checks an incoming sale request before the engine opens a
//! transaction.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (apps/api)                                     │
//! │  ├── JSON deserialization into CreateSaleRequest                       │
//! │  └── Actor headers present                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (no I/O)                                         │
//! │  ├── Empty sale, quantities, prices, discount                          │
//! │  ├── Payment method parsing (case-insensitive, default CASH)           │
//! │  └── Credit gating: customer name AND phone                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine inside the transaction                                │
//! │  ├── Item exists                                                       │
//! │  └── Stock sufficient (cumulative per item)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite                                                       │
//! │  └── CHECK (stock_quantity >= 0), foreign keys                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use medpos_core::types::{CreateSaleRequest, SaleLineRequest, PaymentMethod};
//! use medpos_core::validation::validate_sale_request;
//!
//! let request = CreateSaleRequest {
//!     items: vec![SaleLineRequest {
//!         item_id: "amox-500".to_string(),
//!         quantity: 2,
//!         unit_type: None,
//!         unit_label: None,
//!         unit_price_cents: None,
//!     }],
//!     payment_method: Some("cash".to_string()),
//!     ..Default::default()
//! };
//!
//! let sale = validate_sale_request(&request).unwrap();
//! assert_eq!(sale.payment_method, PaymentMethod::Cash);
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CreateSaleRequest, PaymentMethod, SaleLineRequest};
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_LINES, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of the free-text sale note.
pub const MAX_NOTES_LEN: usize = 500;

/// Maximum length of a customer name or phone.
pub const MAX_CUSTOMER_FIELD_LEN: usize = 100;

/// Maximum length of a client-supplied idempotency key.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 128;

// =============================================================================
// Validated Sale
// =============================================================================

/// A sale request after normalization. The engine only ever sees this shape.
#[derive(Debug, Clone)]
pub struct ValidatedSale {
    pub lines: Vec<SaleLineRequest>,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub discount: Money,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Validates and normalizes a sale request.
///
/// ## Rules
/// - At least one line, at most [`MAX_SALE_LINES`]
/// - Every line has a non-blank `item_id` and a quantity in `1..=MAX_ITEM_QUANTITY`
/// - Price overrides and the discount are not negative
/// - CREDIT requires both customer name and phone
///
/// Blank optional strings are normalized to `None`.
pub fn validate_sale_request(request: &CreateSaleRequest) -> CoreResult<ValidatedSale> {
    if request.items.is_empty() {
        return Err(ValidationError::EmptySale.into());
    }

    if request.items.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        }
        .into());
    }

    let lines = request
        .items
        .iter()
        .map(validate_line)
        .collect::<ValidationResult<Vec<_>>>()?;

    let payment_method = parse_payment_method(request.payment_method.as_deref())?;

    let customer_name = non_blank(request.customer_name.as_deref());
    let customer_phone = non_blank(request.customer_phone.as_deref());
    check_len("customer_name", customer_name.as_deref(), MAX_CUSTOMER_FIELD_LEN)?;
    check_len("customer_phone", customer_phone.as_deref(), MAX_CUSTOMER_FIELD_LEN)?;

    if payment_method.is_credit() && (customer_name.is_none() || customer_phone.is_none()) {
        return Err(CoreError::MissingCreditCustomer);
    }

    let discount_cents = request.discount_cents.unwrap_or(0);
    if discount_cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        }
        .into());
    }

    let notes = non_blank(request.notes.as_deref());
    check_len("notes", notes.as_deref(), MAX_NOTES_LEN)?;

    let idempotency_key = match non_blank(request.idempotency_key.as_deref()) {
        Some(key) => Some(validate_idempotency_key(&key)?),
        None => None,
    };

    Ok(ValidatedSale {
        lines,
        payment_method,
        customer_name,
        customer_phone,
        discount: Money::from_cents(discount_cents),
        notes,
        idempotency_key,
        due_date: request.due_date,
    })
}

fn validate_line(line: &SaleLineRequest) -> ValidationResult<SaleLineRequest> {
    let item_id = line.item_id.trim();
    if item_id.is_empty() {
        return Err(ValidationError::required("item_id"));
    }

    validate_quantity(line.quantity)?;

    if let Some(price) = line.unit_price_cents {
        validate_price_cents(price)?;
    }

    Ok(SaleLineRequest {
        item_id: item_id.to_string(),
        quantity: line.quantity,
        unit_type: non_blank(line.unit_type.as_deref()),
        unit_label: non_blank(line.unit_label.as_deref()),
        unit_price_cents: line.unit_price_cents,
    })
}

// =============================================================================
// Field Validators
// =============================================================================

/// Parses a payment method; absent or blank means CASH.
///
/// ## Example
/// ```rust
/// use medpos_core::types::PaymentMethod;
/// use medpos_core::validation::parse_payment_method;
///
/// assert_eq!(parse_payment_method(None).unwrap(), PaymentMethod::Cash);
/// assert_eq!(parse_payment_method(Some("credit")).unwrap(), PaymentMethod::Credit);
/// assert!(parse_payment_method(Some("barter")).is_err());
/// ```
pub fn parse_payment_method(raw: Option<&str>) -> ValidationResult<PaymentMethod> {
    match raw.map(str::trim) {
        None | Some("") => Ok(PaymentMethod::default()),
        Some(value) => value.parse(),
    }
}

/// Validates a client-supplied idempotency key and returns it trimmed.
///
/// ## Rules
/// - 1 to 128 characters
/// - Printable ASCII only (it travels in an HTTP header)
pub fn validate_idempotency_key(key: &str) -> ValidationResult<String> {
    let key = key.trim();

    if key.is_empty() {
        return Err(ValidationError::required("idempotency_key"));
    }

    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(ValidationError::TooLong {
            field: "idempotency_key".to_string(),
            max: MAX_IDEMPOTENCY_KEY_LEN,
        });
    }

    if !key.chars().all(|c| c.is_ascii_graphic()) {
        return Err(ValidationError::InvalidFormat {
            field: "idempotency_key".to_string(),
            reason: "must contain only printable ASCII characters".to_string(),
        });
    }

    Ok(key.to_string())
}

/// Validates a requested line quantity.
///
/// ## User Workflow
/// ```text
/// Cashier enters quantity: 3 (boxes)
///      │
///      ▼
/// validate_quantity(3) ← THIS FUNCTION
///      │
///      ├── qty <= 0?    → "quantity must be positive"
///      ├── qty > 9999?  → "quantity must be between 1 and 9999"
///      └── OK → unit conversion happens later, inside the engine
/// ```
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

/// Validates a price in cents. Zero is allowed (free samples).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "unit_price".to_string(),
        });
    }
    if cents > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a receivable payment amount.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
