//! # Sale Repository
//!
//! Database operations for sale headers and line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. COMMIT (one unit of work)                                          │
//! │     └── insert_header() → SaleHeader                                   │
//! │     └── insert_line()   → SaleLineItem (per line, in request order)    │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── get_header() / get_lines() / list_recent()                     │
//! │                                                                         │
//! │  3. (OPTIONAL) VOID (one unit of work)                                 │
//! │     └── delete_lines()  → lines first (foreign key)                    │
//! │     └── delete_header()                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use medpos_core::{SaleHeader, SaleLineItem};

const HEADER_COLUMNS: &str = "id, transaction_code, cashier_id, cashier_name, subtotal_cents, \
     discount_cents, final_amount_cents, profit_cents, payment_method, customer_name, \
     customer_phone, notes, created_at";

const LINE_COLUMNS: &str = "id, sale_id, line_no, item_id, item_name, quantity, unit_type, \
     unit_label, base_quantity, unit_price_cents, unit_cost_cents, subtotal_cents, \
     profit_cents, created_at";

/// Inserts a sale header.
pub async fn insert_header(conn: &mut SqliteConnection, sale: &SaleHeader) -> DbResult<()> {
    debug!(id = %sale.id, transaction_code = %sale.transaction_code, "Inserting sale");

    sqlx::query(&format!(
        "INSERT INTO sales ({HEADER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&sale.id)
    .bind(&sale.transaction_code)
    .bind(&sale.cashier_id)
    .bind(&sale.cashier_name)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_cents)
    .bind(sale.final_amount_cents)
    .bind(sale.profit_cents)
    .bind(sale.payment_method)
    .bind(&sale.customer_name)
    .bind(&sale.customer_phone)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts a line item.
pub async fn insert_line(conn: &mut SqliteConnection, line: &SaleLineItem) -> DbResult<()> {
    debug!(sale_id = %line.sale_id, item_id = %line.item_id, line_no = line.line_no, "Adding sale item");

    sqlx::query(&format!(
        "INSERT INTO sale_items ({LINE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&line.id)
    .bind(&line.sale_id)
    .bind(line.line_no)
    .bind(&line.item_id)
    .bind(&line.item_name)
    .bind(line.quantity)
    .bind(&line.unit_type)
    .bind(&line.unit_label)
    .bind(line.base_quantity)
    .bind(line.unit_price_cents)
    .bind(line.unit_cost_cents)
    .bind(line.subtotal_cents)
    .bind(line.profit_cents)
    .bind(line.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a sale header by ID.
pub async fn get_header(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<SaleHeader>> {
    let sale = sqlx::query_as::<_, SaleHeader>(&format!(
        "SELECT {HEADER_COLUMNS} FROM sales WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

/// Gets a sale's lines in request order.
pub async fn get_lines(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
    let lines = sqlx::query_as::<_, SaleLineItem>(&format!(
        "SELECT {LINE_COLUMNS} FROM sale_items WHERE sale_id = ? ORDER BY line_no"
    ))
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(lines)
}

/// Most recent sales first.
pub async fn list_recent(conn: &mut SqliteConnection, limit: u32) -> DbResult<Vec<SaleHeader>> {
    let sales = sqlx::query_as::<_, SaleHeader>(&format!(
        "SELECT {HEADER_COLUMNS} FROM sales ORDER BY created_at DESC, id DESC LIMIT ?"
    ))
    .bind(i64::from(limit))
    .fetch_all(&mut *conn)
    .await?;

    Ok(sales)
}

/// Deletes a sale's lines. Returns how many were removed.
pub async fn delete_lines(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<u64> {
    debug!(sale_id = %sale_id, "Deleting sale items");

    let result = sqlx::query("DELETE FROM sale_items WHERE sale_id = ?")
        .bind(sale_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes a sale header. Lines, receivable and payments must be gone first.
pub async fn delete_header(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting sale");

    let result = sqlx::query("DELETE FROM sales WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
