//! # Domain Types
//!
//! Records the sale engine reads and writes, plus the canonical request and
//! receipt schema exchanged with POS clients.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │   SaleHeader    │   │ SaleLineItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  stock_quantity │◄──│  totals, profit │──►│  base_quantity  │       │
//! │  │  unit table     │   │  payment_method │   │  unit cost snap │       │
//! │  └────────┬────────┘   └────────┬────────┘   └─────────────────┘       │
//! │           │                     │                                       │
//! │           ▼                     ▼                                       │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ StockMovement   │   │CreditReceivable │  (CREDIT sales only)        │
//! │  │ append-only     │   │ total/paid/bal  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer settles the sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Mobile,
    Transfer,
    /// Deferred payment; the engine issues a receivable.
    Credit,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Mobile,
        PaymentMethod::Transfer,
        PaymentMethod::Credit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Mobile => "MOBILE",
            PaymentMethod::Transfer => "TRANSFER",
            PaymentMethod::Credit => "CREDIT",
        }
    }

    #[inline]
    pub fn is_credit(&self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: "cash", "Cash" and "CASH" are the same method.
impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Movement Type
// =============================================================================

/// Kind of inventory change recorded in the stock movement ledger.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Sale,
    Addition,
    Purchase,
    Loss,
    /// Explicit previous/new pair; quantity carries its own sign.
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sale => "SALE",
            MovementType::Addition => "ADDITION",
            MovementType::Purchase => "PURCHASE",
            MovementType::Loss => "LOSS",
            MovementType::Adjustment => "ADJUSTMENT",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Credit Status
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    #[default]
    Pending,
    Partial,
    Paid,
}

impl CreditStatus {
    /// Status implied by how much of `total` has been paid.
    ///
    /// A zero total is settled from the start.
    pub fn from_amounts(total: Money, paid: Money) -> Self {
        if paid >= total {
            CreditStatus::Paid
        } else if paid.cents() <= 0 {
            CreditStatus::Pending
        } else {
            CreditStatus::Partial
        }
    }
}

// =============================================================================
// Actor
// =============================================================================

/// Authenticated user performing the operation (supplied by upstream auth).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: String,
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A sellable item with its current base-unit stock level.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Price of one base unit.
    pub unit_price_cents: i64,
    /// Cost of one base unit.
    pub cost_price_cents: i64,
    /// Current stock in base units. Never negative as an effect of a sale.
    pub stock_quantity: i64,
    /// Raw JSON unit table, e.g. `[{"type":"box","quantity":10,"price_cents":4500}]`.
    /// Kept unparsed so malformed data is detected (and tolerated) at resolve time.
    pub unit_conversions: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }
}

/// One entry of an item's unit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitConversion {
    #[serde(rename = "type", alias = "label")]
    pub unit_type: String,
    /// Base units per one of this unit.
    pub quantity: i64,
    /// Selling price of one of this unit, if it differs from base price × quantity.
    #[serde(default)]
    pub price_cents: Option<i64>,
}

// =============================================================================
// Sale Header / Line Item
// =============================================================================

/// Top-level record of one committed sale. Immutable until voided.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleHeader {
    pub id: String,
    /// Human-readable code printed on the receipt: `TRX-YYYYMMDD-XXXXXX`.
    pub transaction_code: String,
    pub cashier_id: String,
    pub cashier_name: String,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub final_amount_cents: i64,
    /// Profit after discount.
    pub profit_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line in a sale. Uses the snapshot pattern: name, price and cost are
/// frozen at sale time.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    /// Position in the request (0-based); lines are processed in this order.
    pub line_no: i64,
    pub item_id: String,
    pub item_name: String,
    /// Quantity in the requested unit.
    pub quantity: i64,
    pub unit_type: Option<String>,
    pub unit_label: Option<String>,
    /// Quantity deducted from stock, in base units.
    pub base_quantity: i64,
    /// Price per requested unit.
    pub unit_price_cents: i64,
    /// Cost per base unit at sale time.
    pub unit_cost_cents: i64,
    pub subtotal_cents: i64,
    pub profit_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Append-only ledger row.
///
/// ## Quantity Sign
/// For SALE, LOSS, ADDITION and PURCHASE the quantity is a magnitude and the
/// type implies the sign. For ADJUSTMENT the quantity is the signed delta.
/// See [`crate::ledger::signed_delta`].
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub item_id: String,
    pub movement_type: MovementType,
    pub quantity: i64,
    /// Originating sale (or other transaction) id.
    pub reference_id: Option<String>,
    pub actor_id: String,
    pub actor_name: String,
    pub actor_role: String,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Credit Receivable
// =============================================================================

/// Amount owed for a CREDIT sale. One-to-one with its sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditReceivable {
    pub id: String,
    pub sale_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub balance_cents: i64,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub status: CreditStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A payment collected against a receivable.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceivablePayment {
    pub id: String,
    pub receivable_id: String,
    pub amount_cents: i64,
    pub received_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Request / Receipt Schema
// =============================================================================

/// Canonical sale creation request. Normalized once at the boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleRequest {
    #[serde(default)]
    pub items: Vec<SaleLineRequest>,
    /// Case-insensitive; defaults to CASH.
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Flat sale-level discount; defaults to 0.
    #[serde(default)]
    pub discount_cents: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
    /// CREDIT only; defaults to today + 30 days.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
}

/// One requested line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineRequest {
    pub item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit_type: Option<String>,
    #[serde(default)]
    pub unit_label: Option<String>,
    /// Price per requested unit, overriding the catalogue price.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

/// Who rang up the sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cashier {
    pub id: String,
    pub name: String,
}

/// What the client receives after a committed sale (or when re-reading one).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReceipt {
    pub sale_id: String,
    pub transaction_code: String,
    pub cashier: Cashier,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub final_amount_cents: i64,
    /// Σ line profit, before discount.
    pub total_profit_cents: i64,
    pub final_profit_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<SaleLineItem>,
    pub receivable_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleReceipt {
    /// Assembles a receipt from persisted rows.
    pub fn from_parts(
        header: SaleHeader,
        items: Vec<SaleLineItem>,
        receivable_id: Option<String>,
    ) -> Self {
        let total_profit: i64 = items.iter().map(|i| i.profit_cents).sum();
        SaleReceipt {
            sale_id: header.id,
            transaction_code: header.transaction_code,
            cashier: Cashier {
                id: header.cashier_id,
                name: header.cashier_name,
            },
            subtotal_cents: header.subtotal_cents,
            discount_cents: header.discount_cents,
            final_amount_cents: header.final_amount_cents,
            total_profit_cents: total_profit,
            final_profit_cents: header.profit_cents,
            payment_method: header.payment_method,
            customer_name: header.customer_name,
            customer_phone: header.customer_phone,
            notes: header.notes,
            items,
            receivable_id,
            created_at: header.created_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
