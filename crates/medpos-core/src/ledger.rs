//! # Ledger Rules
//!
//! Sign conventions for stock movements. Every writer checks a movement with
//! [`check_movement`] before appending it.
//!
//! | Type       | Stored quantity | Delta      |
//! |------------|-----------------|------------|
//! | SALE       | magnitude       | −quantity  |
//! | LOSS       | magnitude       | −quantity  |
//! | ADDITION   | magnitude       | +quantity  |
//! | PURCHASE   | magnitude       | +quantity  |
//! | ADJUSTMENT | signed          | quantity   |

use crate::error::{CoreError, CoreResult};
use crate::types::MovementType;

/// Stock change implied by a movement.
pub fn signed_delta(movement_type: MovementType, quantity: i64) -> i64 {
    match movement_type {
        MovementType::Sale | MovementType::Loss => -quantity,
        MovementType::Addition | MovementType::Purchase => quantity,
        MovementType::Adjustment => quantity,
    }
}

/// Verifies `new_stock == previous_stock + signed_delta(type, quantity)`.
pub fn check_movement(
    item_id: &str,
    movement_type: MovementType,
    quantity: i64,
    previous_stock: i64,
    new_stock: i64,
) -> CoreResult<()> {
    if movement_type != MovementType::Adjustment && quantity < 0 {
        return Err(CoreError::LedgerInvariant {
            item_id: item_id.to_string(),
            reason: format!("{movement_type} quantity must not be negative, got {quantity}"),
        });
    }

    let expected = previous_stock + signed_delta(movement_type, quantity);
    if expected != new_stock {
        return Err(CoreError::LedgerInvariant {
            item_id: item_id.to_string(),
            reason: format!(
                "{movement_type} of {quantity} from {previous_stock} should give {expected}, got {new_stock}"
            ),
        });
    }

    Ok(())
}
