//! # Pricing
//!
//! Line pricing and sale totals.
//!
//! ```text
//! line_subtotal = unit_price × requested_qty
//! line_cost     = cost_price × base_qty
//! line_profit   = line_subtotal − line_cost
//!
//! final_amount  = Σ line_subtotal − discount
//! final_profit  = Σ line_profit   − discount
//! ```
//!
//! The discount is flat and sale-level, and it reduces profit one-for-one.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::InventoryItem;
use crate::units::UnitResolution;

/// Priced figures for one sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePricing {
    /// Price per requested unit.
    pub unit_price: Money,
    /// Cost per base unit.
    pub unit_cost: Money,
    pub subtotal: Money,
    pub cost: Money,
    pub profit: Money,
}

/// Prices one line.
///
/// Unit price precedence: explicit override, then the matched unit entry's
/// price, then the item's base price times the unit multiplier. Every
/// product is checked; an amount past `i64` cents is a validation error.
pub fn price_line(
    item: &InventoryItem,
    resolution: &UnitResolution,
    requested_qty: i64,
    price_override: Option<Money>,
) -> Result<LinePricing, ValidationError> {
    let unit_price = match price_override.or_else(|| resolution.unit_price_cents.map(Money::from_cents)) {
        Some(price) => price,
        None => item
            .unit_price()
            .checked_mul(resolution.multiplier)
            .ok_or_else(|| overflow("unit_price"))?,
    };

    let unit_cost = item.cost_price();
    let subtotal = unit_price
        .checked_mul(requested_qty)
        .ok_or_else(|| overflow("line_subtotal"))?;
    let cost = unit_cost
        .checked_mul(resolution.base_quantity)
        .ok_or_else(|| overflow("line_cost"))?;
    let profit = subtotal.checked_sub(cost).ok_or_else(|| overflow("line_profit"))?;

    Ok(LinePricing {
        unit_price,
        unit_cost,
        subtotal,
        cost,
        profit,
    })
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::AmountOverflow {
        field: field.to_string(),
    }
}

/// Running and final totals for a sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub total_profit: Money,
    pub discount: Money,
    pub final_amount: Money,
    pub final_profit: Money,
}

impl SaleTotals {
    /// Adds one line's subtotal and profit.
    pub fn add_line(&mut self, subtotal: Money, profit: Money) {
        self.subtotal += subtotal;
        self.total_profit += profit;
        self.final_amount = self.subtotal - self.discount;
        self.final_profit = self.total_profit - self.discount;
    }

    /// Applies a flat discount.
    ///
    /// Fails if the discount would make the final amount negative.
    pub fn apply_discount(self, discount: Money) -> Result<SaleTotals, ValidationError> {
        if discount.is_negative() {
            return Err(ValidationError::MustNotBeNegative {
                field: "discount".to_string(),
            });
        }
        if discount > self.subtotal {
            return Err(ValidationError::DiscountExceedsSubtotal {
                discount: discount.cents(),
                subtotal: self.subtotal.cents(),
            });
        }

        let final_profit = self
            .total_profit
            .checked_sub(discount)
            .ok_or_else(|| overflow("final_profit"))?;

        Ok(SaleTotals {
            discount,
            final_amount: self.subtotal - discount,
            final_profit,
            ..self
        })
    }

    /// Totals for a priced sale.
    pub fn accumulate<'a, I>(lines: I, discount: Money) -> Result<SaleTotals, ValidationError>
    where
        I: IntoIterator<Item = &'a LinePricing>,
    {
        let mut totals = SaleTotals::default();
        for line in lines {
            totals.subtotal = totals
                .subtotal
                .checked_add(line.subtotal)
                .ok_or_else(|| overflow("subtotal"))?;
            totals.total_profit = totals
                .total_profit
                .checked_add(line.profit)
                .ok_or_else(|| overflow("total_profit"))?;
        }
        totals.apply_discount(discount)
    }
}
