//! # medpos-core: Pure Business Logic for MedPOS
//!
//! Everything the sale transaction engine decides without touching storage:
//! how a requested unit maps to base stock, what a line costs and earns,
//! which sign a stock movement carries, and whether a request is a duplicate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MedPOS Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   apps/api (axum routes)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              medpos-engine (create_sale / void_sale)            │   │
//! │  └───────────────┬─────────────────────────────────┬───────────────┘   │
//! │                  │                                 │                    │
//! │  ┌───────────────▼─────────────────┐   ┌───────────▼───────────────┐   │
//! │  │  ★ medpos-core (THIS CRATE) ★   │   │  medpos-db (SQLite, UoW)  │   │
//! │  │  units • pricing • ledger       │   │  repositories, migrations │   │
//! │  │  validation • idempotency       │   └───────────────────────────┘   │
//! │  └─────────────────────────────────┘                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records and request/receipt schema
//! - [`money`] - Integer cents arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation (runs before any I/O)
//! - [`units`] - Unit Conversion Resolver
//! - [`pricing`] - Line pricing and sale totals
//! - [`ledger`] - Stock movement delta rules
//! - [`idempotency`] - Duplicate-submission guard
//!
//! ## Example Usage
//!
//! ```rust
//! use medpos_core::money::Money;
//! use medpos_core::pricing::SaleTotals;
//!
//! let mut totals = SaleTotals::default();
//! totals.add_line(Money::from_cents(200), Money::from_cents(80));
//! let totals = totals.apply_discount(Money::from_cents(20)).unwrap();
//!
//! assert_eq!(totals.final_amount.cents(), 180);
//! assert_eq!(totals.final_profit.cents(), 60);
//! ```

pub mod error;
pub mod idempotency;
pub mod ledger;
pub mod money;
pub mod pricing;
pub mod types;
pub mod units;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

/// Maximum number of lines in a single sale.
pub const MAX_SALE_LINES: usize = 200;

/// Maximum requested quantity on one line (in requested units).
///
/// Guards against typing 10000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Largest per-unit price a line may override to, in cents ($1,000,000).
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;

/// Time-to-live for idempotency keys, in seconds.
pub const DEFAULT_IDEMPOTENCY_TTL_SECS: u64 = 60;

/// Days until a credit receivable falls due when the request names no date.
pub const DEFAULT_CREDIT_TERM_DAYS: i64 = 30;
