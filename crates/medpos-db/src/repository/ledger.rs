//! # Stock Movement Ledger
//!
//! Append-only audit trail of every stock change.
//!
//! There is no update function. A correction is a new row, normally an
//! ADJUSTMENT. The only delete removes the SALE rows of a voided sale, and
//! it runs in the same unit of work that appends the compensating
//! ADJUSTMENT rows.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use medpos_core::{MovementType, StockMovement};

const MOVEMENT_COLUMNS: &str = "id, item_id, movement_type, quantity, reference_id, actor_id, \
     actor_name, actor_role, previous_stock, new_stock, reason, created_at";

/// Appends a movement.
pub async fn append(conn: &mut SqliteConnection, movement: &StockMovement) -> DbResult<()> {
    debug!(
        item_id = %movement.item_id,
        movement_type = %movement.movement_type,
        quantity = movement.quantity,
        previous_stock = movement.previous_stock,
        new_stock = movement.new_stock,
        "Appending stock movement"
    );

    sqlx::query(&format!(
        "INSERT INTO stock_movements ({MOVEMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&movement.id)
    .bind(&movement.item_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(&movement.reference_id)
    .bind(&movement.actor_id)
    .bind(&movement.actor_name)
    .bind(&movement.actor_role)
    .bind(movement.previous_stock)
    .bind(movement.new_stock)
    .bind(&movement.reason)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Movements for one item, oldest first.
pub async fn list_by_item(conn: &mut SqliteConnection, item_id: &str) -> DbResult<Vec<StockMovement>> {
    let rows = sqlx::query_as::<_, StockMovement>(&format!(
        "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE item_id = ? ORDER BY created_at, rowid"
    ))
    .bind(item_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Movements linked to a sale (or other transaction), oldest first.
pub async fn list_by_reference(
    conn: &mut SqliteConnection,
    reference_id: &str,
) -> DbResult<Vec<StockMovement>> {
    let rows = sqlx::query_as::<_, StockMovement>(&format!(
        "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE reference_id = ? ORDER BY created_at, rowid"
    ))
    .bind(reference_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Removes the SALE movements of a sale being voided. Other types are kept.
pub async fn delete_sale_movements_for_reference(
    conn: &mut SqliteConnection,
    reference_id: &str,
) -> DbResult<u64> {
    debug!(reference_id = %reference_id, "Deleting SALE movements");

    let result = sqlx::query("DELETE FROM stock_movements WHERE reference_id = ? AND movement_type = ?")
        .bind(reference_id)
        .bind(MovementType::Sale)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================
