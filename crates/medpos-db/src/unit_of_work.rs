//! # Unit of Work
//!
//! One database transaction with an explicit commit/rollback boundary.
//!
//! ```text
//! db.begin() ──► UnitOfWork ──► repository calls on uow.conn()
//!                    │
//!                    ├── commit()   → everything becomes visible at once
//!                    ├── rollback() → nothing happened
//!                    └── drop       → rollback (sqlx Transaction semantics)
//! ```

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::{debug, error};

use crate::error::{DbError, DbResult};

/// Owns an open transaction. Consumed by `commit` or `rollback`.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        UnitOfWork { tx }
    }

    /// Connection bound to this transaction, for repository calls.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await.map_err(|e| {
            error!(error = %e, "Transaction commit failed");
            DbError::TransactionFailed(e.to_string())
        })?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Rolls back. A failure here is logged and swallowed so it never
    /// replaces the error that caused the rollback.
    pub async fn rollback(self) {
        match self.tx.rollback().await {
            Ok(()) => debug!("Transaction rolled back"),
            Err(e) => error!(error = %e, "Transaction rollback failed"),
        }
    }
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    async fn count_items(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn insert_raw(uow: &mut super::UnitOfWork, id: &str) {
        sqlx::query(
            "INSERT INTO inventory_items (id, name, unit_price_cents, cost_price_cents, \
             stock_quantity, created_at, updated_at) VALUES (?, 'x', 1, 1, 1, 'now', 'now')",
        )
        .bind(id)
        .execute(uow.conn())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut uow = db.begin().await.unwrap();
        insert_raw(&mut uow, "a").await;
        uow.commit().await.unwrap();
        assert_eq!(count_items(&db).await, 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut uow = db.begin().await.unwrap();
        insert_raw(&mut uow, "a").await;
        uow.rollback().await;
        assert_eq!(count_items(&db).await, 0);
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        {
            let mut uow = db.begin().await.unwrap();
            insert_raw(&mut uow, "a").await;
        }
        assert_eq!(count_items(&db).await, 0);
    }
}
