//! # Unit Conversion Resolver
//!
//! Translates a requested sale unit ("box", "strip") into base stock units
//! using the item's unit table.
//!
//! ## Resolution Flow
//! ```text
//! resolve_base_quantity(table, qty=3, unit_type="box")
//!      │
//!      ├── unit_type absent?        → BaseUnit      (qty)
//!      ├── table absent/empty?      → NoUnitTable   (qty)
//!      ├── table unparseable?       → Malformed     (qty, warn!)
//!      ├── no matching entry?       → UnitNotFound  (qty, warn!)
//!      ├── multiplier <= 0?         → Malformed     (qty, warn!)
//!      └── match {box, quantity:10} → Converted     (30)
//! ```
//!
//! Unit data problems never abort a sale. Every fallback is a typed outcome
//! so callers and tests can see which branch was taken.

use tracing::warn;

use crate::types::UnitConversion;

/// Which branch the resolver took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Matched a unit table entry and applied its multiplier.
    Converted,
    /// No unit type requested; the quantity is already in base units.
    BaseUnit,
    /// Unit type requested but the item has no unit table.
    NoUnitTable,
    /// The table has no entry for the requested unit type.
    UnitNotFound,
    /// The table could not be used.
    Malformed(String),
}

impl UnitOutcome {
    /// True for the fail-soft branches that fell back to the requested quantity.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            UnitOutcome::NoUnitTable | UnitOutcome::UnitNotFound | UnitOutcome::Malformed(_)
        )
    }
}

/// Result of resolving one sale line's unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitResolution {
    /// Quantity to deduct from stock.
    pub base_quantity: i64,
    /// Base units per requested unit (1 on every fallback branch).
    pub multiplier: i64,
    /// Price per requested unit from the matched entry, if it has one.
    pub unit_price_cents: Option<i64>,
    pub outcome: UnitOutcome,
}

impl UnitResolution {
    fn identity(requested_qty: i64, outcome: UnitOutcome) -> Self {
        UnitResolution {
            base_quantity: requested_qty,
            multiplier: 1,
            unit_price_cents: None,
            outcome,
        }
    }
}

/// Parses an item's raw unit table.
pub fn parse_unit_table(raw: &str) -> Result<Vec<UnitConversion>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Resolves a requested quantity into base units.
///
/// ## Example
/// ```rust
/// use medpos_core::units::{resolve_base_quantity, UnitOutcome};
///
/// let table = r#"[{"type":"box","quantity":10}]"#;
/// let r = resolve_base_quantity(Some(table), 3, Some("Box"));
/// assert_eq!(r.base_quantity, 30);
/// assert_eq!(r.outcome, UnitOutcome::Converted);
///
/// let r = resolve_base_quantity(Some("not json"), 3, Some("box"));
/// assert_eq!(r.base_quantity, 3);
/// assert!(r.outcome.is_fallback());
/// ```
pub fn resolve_base_quantity(
    unit_table: Option<&str>,
    requested_qty: i64,
    unit_type: Option<&str>,
) -> UnitResolution {
    let Some(wanted) = unit_type.map(str::trim).filter(|u| !u.is_empty()) else {
        return UnitResolution::identity(requested_qty, UnitOutcome::BaseUnit);
    };

    let raw = match unit_table.map(str::trim) {
        None | Some("") | Some("null") | Some("[]") => {
            return UnitResolution::identity(requested_qty, UnitOutcome::NoUnitTable);
        }
        Some(raw) => raw,
    };

    let table = match parse_unit_table(raw) {
        Ok(table) => table,
        Err(e) => {
            warn!(unit_type = %wanted, error = %e, "Unparseable unit table, using requested quantity");
            return UnitResolution::identity(requested_qty, UnitOutcome::Malformed(e.to_string()));
        }
    };

    let Some(entry) = table
        .iter()
        .find(|u| u.unit_type.trim().eq_ignore_ascii_case(wanted))
    else {
        warn!(unit_type = %wanted, "Unit type not in unit table, using requested quantity");
        return UnitResolution::identity(requested_qty, UnitOutcome::UnitNotFound);
    };

    if entry.quantity <= 0 {
        let reason = format!("non-positive multiplier {} for unit {}", entry.quantity, wanted);
        warn!(unit_type = %wanted, multiplier = entry.quantity, "Invalid unit multiplier, using requested quantity");
        return UnitResolution::identity(requested_qty, UnitOutcome::Malformed(reason));
    }

    let Some(base_quantity) = requested_qty.checked_mul(entry.quantity) else {
        warn!(unit_type = %wanted, multiplier = entry.quantity, "Unit conversion overflow, using requested quantity");
        return UnitResolution::identity(
            requested_qty,
            UnitOutcome::Malformed("conversion overflow".to_string()),
        );
    };

    UnitResolution {
        base_quantity,
        multiplier: entry.quantity,
        unit_price_cents: entry.price_cents.filter(|p| *p >= 0),
        outcome: UnitOutcome::Converted,
    }
}
