//! # Sale Engine
//!
//! Owns the database handle and the idempotency store. Every write runs in one
//! [`UnitOfWork`](medpos_db::UnitOfWork); reads use a pooled connection.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_sale(actor, request)        sale.rs                            │
//! │  void_sale(actor, sale_id)          void.rs                            │
//! │  record_receivable_payment(...)     receivable.rs                      │
//! │  get_sale / list_recent_sales       (below)                            │
//! │  movements_for_item / _reference    (below)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod receivable;
mod sale;
mod void;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use medpos_core::idempotency::IdempotencyStore;
use medpos_core::{CoreError, SaleHeader, SaleReceipt, StockMovement};
use medpos_db::repository::{ledger, receivable as receivable_repo, sale as sale_repo};
use medpos_db::Database;

use crate::error::EngineResult;

pub use void::VoidReceipt;

/// Default page size for [`SaleEngine::list_recent_sales`].
pub const DEFAULT_RECENT_LIMIT: u32 = 50;

/// Largest page [`SaleEngine::list_recent_sales`] will return.
pub const MAX_RECENT_LIMIT: u32 = 200;

/// The sale transaction engine. Cheap to clone; clones share the pool and
/// the idempotency store.
#[derive(Clone)]
pub struct SaleEngine {
    db: Database,
    idempotency: Arc<dyn IdempotencyStore>,
}

impl SaleEngine {
    pub fn new(db: Database, idempotency: Arc<dyn IdempotencyStore>) -> Self {
        SaleEngine { db, idempotency }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn idempotency_store(&self) -> Arc<dyn IdempotencyStore> {
        Arc::clone(&self.idempotency)
    }

    // =========================================================================
    // Read Queries
    // =========================================================================

    /// Re-reads a committed sale as a receipt.
    pub async fn get_sale(&self, sale_id: &str) -> EngineResult<SaleReceipt> {
        let mut conn = self.db.connection().await?;

        let header = sale_repo::get_header(&mut conn, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
        let lines = sale_repo::get_lines(&mut conn, sale_id).await?;
        let receivable_id = receivable_repo::get_by_sale(&mut conn, sale_id)
            .await?
            .map(|r| r.id);

        Ok(SaleReceipt::from_parts(header, lines, receivable_id))
    }

    /// Newest sales first. `limit` is clamped to `1..=MAX_RECENT_LIMIT`.
    pub async fn list_recent_sales(&self, limit: Option<u32>) -> EngineResult<Vec<SaleHeader>> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .clamp(1, MAX_RECENT_LIMIT);
        let mut conn = self.db.connection().await?;
        Ok(sale_repo::list_recent(&mut conn, limit).await?)
    }

    pub async fn movements_for_item(&self, item_id: &str) -> EngineResult<Vec<StockMovement>> {
        let mut conn = self.db.connection().await?;
        Ok(ledger::list_by_item(&mut conn, item_id).await?)
    }

    pub async fn movements_for_reference(&self, reference_id: &str) -> EngineResult<Vec<StockMovement>> {
        let mut conn = self.db.connection().await?;
        Ok(ledger::list_by_reference(&mut conn, reference_id).await?)
    }
}

impl std::fmt::Debug for SaleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaleEngine")
            .field("db", &self.db)
            .field("idempotency_keys", &self.idempotency.len())
            .finish()
    }
}
