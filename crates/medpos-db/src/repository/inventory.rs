//! # Inventory Repository
//!
//! Item lookup and the two stock mutations the engine performs.
//!
//! ## Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  UPDATE inventory_items                                             │
//! │     SET stock_quantity = stock_quantity - :qty                      │
//! │   WHERE id = :id AND stock_quantity >= :qty                         │
//! │  RETURNING stock_quantity                                           │
//! │                                                                     │
//! │  Terminal A: sells 30 of 40 → row updated, returns 10               │
//! │  Terminal B: sells 20 of 10 → no row matched, returns None          │
//! │                                                                     │
//! │  The check and the write are one statement, so two sales can never  │
//! │  both pass the check against the same stock.                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use medpos_core::InventoryItem;

/// Gets an item by ID.
pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<InventoryItem>> {
    let item = sqlx::query_as::<_, InventoryItem>(
        r#"
        SELECT id, name, unit_price_cents, cost_price_cents, stock_quantity,
               unit_conversions, created_at, updated_at
        FROM inventory_items
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(item)
}

/// Reads the current stock level.
pub async fn current_stock(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<i64>> {
    let stock: Option<i64> =
        sqlx::query_scalar("SELECT stock_quantity FROM inventory_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(stock)
}

/// Decrements stock only if enough is available.
///
/// ## Returns
/// * `Some(new_stock)` - Stock was decremented
/// * `None` - Item missing or stock below `quantity`; nothing changed
pub async fn decrement_stock_if_available(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
) -> DbResult<Option<i64>> {
    debug!(id = %id, quantity = quantity, "Decrementing stock");

    let new_stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE inventory_items
        SET stock_quantity = stock_quantity - ?2,
            updated_at = ?3
        WHERE id = ?1 AND stock_quantity >= ?2
        RETURNING stock_quantity
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(new_stock)
}

/// Adds stock back and returns the new level.
pub async fn increment_stock(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<i64> {
    debug!(id = %id, quantity = quantity, "Incrementing stock");

    let new_stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE inventory_items
        SET stock_quantity = stock_quantity + ?2,
            updated_at = ?3
        WHERE id = ?1
        RETURNING stock_quantity
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    new_stock.ok_or_else(|| DbError::not_found("Inventory item", id))
}

/// Inserts a new item.
///
/// ## Returns
/// * `Err(DbError::UniqueViolation)` - ID already exists
pub async fn insert(conn: &mut SqliteConnection, item: &InventoryItem) -> DbResult<()> {
    debug!(id = %item.id, name = %item.name, "Inserting inventory item");

    sqlx::query(
        r#"
        INSERT INTO inventory_items (
            id, name, unit_price_cents, cost_price_cents, stock_quantity,
            unit_conversions, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.name)
    .bind(item.unit_price_cents)
    .bind(item.cost_price_cents)
    .bind(item.stock_quantity)
    .bind(&item.unit_conversions)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Number of items in the catalogue.
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{item, test_db};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let mut conn = db.connection().await.unwrap();

        let mut it = item("amox", 50);
        it.unit_conversions = Some(r#"[{"type":"box","quantity":10}]"#.to_string());
        insert(&mut conn, &it).await.unwrap();

        let loaded = get_by_id(&mut conn, "amox").await.unwrap().unwrap();
        assert_eq!(loaded.stock_quantity, 50);
        assert_eq!(loaded.unit_conversions, it.unit_conversions);
        assert!(get_by_id(&mut conn, "missing").await.unwrap().is_none());
        assert_eq!(count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_unique_violation() {
        let db = test_db().await;
        let mut conn = db.connection().await.unwrap();
        insert(&mut conn, &item("a", 1)).await.unwrap();
        let err = insert(&mut conn, &item("a", 1)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_conditional_decrement() {
        let db = test_db().await;
        let mut conn = db.connection().await.unwrap();
        insert(&mut conn, &item("a", 10)).await.unwrap();

        assert_eq!(decrement_stock_if_available(&mut conn, "a", 7).await.unwrap(), Some(3));
        assert_eq!(decrement_stock_if_available(&mut conn, "a", 4).await.unwrap(), None);
        assert_eq!(current_stock(&mut conn, "a").await.unwrap(), Some(3));
        assert_eq!(decrement_stock_if_available(&mut conn, "a", 3).await.unwrap(), Some(0));
        assert_eq!(decrement_stock_if_available(&mut conn, "nope", 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_negative_stock_is_check_violation() {
        let db = test_db().await;
        let mut conn = db.connection().await.unwrap();
        insert(&mut conn, &item("a", 2)).await.unwrap();

        let err: DbError = sqlx::query("UPDATE inventory_items SET stock_quantity = stock_quantity - 3 WHERE id = 'a'")
            .execute(&mut *conn)
            .await
            .unwrap_err()
            .into();

        assert!(matches!(err, DbError::CheckViolation(ref c) if c.contains("stock_quantity")));
        assert_eq!(current_stock(&mut conn, "a").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_trigger_abort_is_distinct() {
        let db = test_db().await;
        let mut conn = db.connection().await.unwrap();
        insert(&mut conn, &item("a", 2)).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER freeze_stock BEFORE UPDATE ON inventory_items \
             BEGIN SELECT RAISE(ABORT, 'stock frozen'); END;",
        )
        .execute(&mut *conn)
        .await
        .unwrap();

        let err = increment_stock(&mut conn, "a", 1).await.unwrap_err();
        assert!(matches!(err, DbError::TriggerAbort(ref m) if m == "stock frozen"));
    }

    #[tokio::test]
    async fn test_increment() {
        let db = test_db().await;
        let mut conn = db.connection().await.unwrap();
        insert(&mut conn, &item("a", 10)).await.unwrap();

        assert_eq!(increment_stock(&mut conn, "a", 5).await.unwrap(), 15);
        assert!(matches!(
            increment_stock(&mut conn, "nope", 5).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
