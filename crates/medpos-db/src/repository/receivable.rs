//! # Receivable Repository
//!
//! Credit receivables (one per CREDIT sale) and the payments collected
//! against them.
//!
//! ```text
//! total = paid + balance      (CHECK constraint)
//!
//! PENDING ──pay part──► PARTIAL ──pay rest──► PAID
//!    └────────────pay all────────────────────►
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use medpos_core::{CreditReceivable, CreditStatus, ReceivablePayment};

const RECEIVABLE_COLUMNS: &str = "id, sale_id, customer_name, customer_phone, total_cents, \
     paid_cents, balance_cents, due_date, status, created_at, updated_at";

/// Inserts a receivable.
///
/// ## Returns
/// * `Err(DbError::UniqueViolation)` - The sale already has one
pub async fn insert(conn: &mut SqliteConnection, receivable: &CreditReceivable) -> DbResult<()> {
    debug!(id = %receivable.id, sale_id = %receivable.sale_id, "Inserting credit receivable");

    sqlx::query(&format!(
        "INSERT INTO credit_receivables ({RECEIVABLE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&receivable.id)
    .bind(&receivable.sale_id)
    .bind(&receivable.customer_name)
    .bind(&receivable.customer_phone)
    .bind(receivable.total_cents)
    .bind(receivable.paid_cents)
    .bind(receivable.balance_cents)
    .bind(receivable.due_date)
    .bind(receivable.status)
    .bind(receivable.created_at)
    .bind(receivable.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<CreditReceivable>> {
    let row = sqlx::query_as::<_, CreditReceivable>(&format!(
        "SELECT {RECEIVABLE_COLUMNS} FROM credit_receivables WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

pub async fn get_by_sale(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Option<CreditReceivable>> {
    let row = sqlx::query_as::<_, CreditReceivable>(&format!(
        "SELECT {RECEIVABLE_COLUMNS} FROM credit_receivables WHERE sale_id = ?"
    ))
    .bind(sale_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Stores new paid/balance/status figures computed by the caller.
pub async fn apply_payment(
    conn: &mut SqliteConnection,
    id: &str,
    paid_cents: i64,
    balance_cents: i64,
    status: CreditStatus,
) -> DbResult<()> {
    debug!(id = %id, paid_cents, balance_cents, status = ?status, "Updating receivable balance");

    let result = sqlx::query(
        r#"
        UPDATE credit_receivables
        SET paid_cents = ?2, balance_cents = ?3, status = ?4, updated_at = ?5
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(paid_cents)
    .bind(balance_cents)
    .bind(status)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Receivable", id));
    }

    Ok(())
}

pub async fn insert_payment(conn: &mut SqliteConnection, payment: &ReceivablePayment) -> DbResult<()> {
    debug!(receivable_id = %payment.receivable_id, amount = payment.amount_cents, "Recording receivable payment");

    sqlx::query(
        r#"
        INSERT INTO receivable_payments (id, receivable_id, amount_cents, received_by, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.receivable_id)
    .bind(payment.amount_cents)
    .bind(&payment.received_by)
    .bind(payment.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn list_payments(
    conn: &mut SqliteConnection,
    receivable_id: &str,
) -> DbResult<Vec<ReceivablePayment>> {
    let rows = sqlx::query_as::<_, ReceivablePayment>(
        r#"
        SELECT id, receivable_id, amount_cents, received_by, created_at
        FROM receivable_payments
        WHERE receivable_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(receivable_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Deletes a sale's receivable and its payments. Returns whether one existed.
pub async fn delete_by_sale(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<bool> {
    debug!(sale_id = %sale_id, "Deleting credit receivable");

    sqlx::query(
        r#"
        DELETE FROM receivable_payments
        WHERE receivable_id IN (SELECT id FROM credit_receivables WHERE sale_id = ?)
        "#,
    )
    .bind(sale_id)
    .execute(&mut *conn)
    .await?;

    let result = sqlx::query("DELETE FROM credit_receivables WHERE sale_id = ?")
        .bind(sale_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================
