//! # Void Sale
//!
//! Reverses a committed sale in one unit of work.
//!
//! ```text
//! BEGIN
//!   header = get_header              → SaleNotFound
//!   for each line:
//!     prev = current_stock           (fresh: other sales may have run since)
//!     new  = increment_stock(base_quantity)
//!     append ADJUSTMENT +base_quantity, reason "Sale voided"
//!   delete SALE movements for the sale
//!   delete receivable + payments
//!   delete lines, then header
//! COMMIT
//! ```
//!
//! The ADJUSTMENT rows keep the sale id as their reference, so the reversal
//! stays traceable after the sale itself is gone.

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use medpos_core::ledger::check_movement;
use medpos_core::{Actor, CoreError, MovementType, SaleLineItem, StockMovement};
use medpos_db::repository::{inventory, ledger, receivable, sale as sale_repo};
use medpos_db::UnitOfWork;

use super::SaleEngine;
use crate::error::EngineResult;

/// Reason recorded on every reversal movement.
pub const VOID_REASON: &str = "Sale voided";

/// What a void did.
#[derive(Debug, Clone, Serialize)]
pub struct VoidReceipt {
    pub sale_id: String,
    pub transaction_code: String,
    /// The ADJUSTMENT movements appended, one per line.
    pub adjustments: Vec<StockMovement>,
    pub removed_sale_movements: u64,
    pub receivable_removed: bool,
}

impl SaleEngine {
    pub async fn void_sale(&self, actor: &Actor, sale_id: &str) -> EngineResult<VoidReceipt> {
        let mut uow = self.db.begin().await?;
        match reverse_sale(&mut uow, actor, sale_id).await {
            Ok(receipt) => {
                uow.commit().await?;
                info!(
                    sale_id = %receipt.sale_id,
                    transaction_code = %receipt.transaction_code,
                    actor_id = %actor.id,
                    lines = receipt.adjustments.len(),
                    "Sale voided"
                );
                Ok(receipt)
            }
            Err(e) => {
                uow.rollback().await;
                Err(e)
            }
        }
    }
}

async fn reverse_sale(
    uow: &mut UnitOfWork,
    actor: &Actor,
    sale_id: &str,
) -> EngineResult<VoidReceipt> {
    let header = sale_repo::get_header(uow.conn(), sale_id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
    let lines = sale_repo::get_lines(uow.conn(), sale_id).await?;

    let mut adjustments = Vec::with_capacity(lines.len());
    for line in &lines {
        adjustments.push(restore_line(uow, actor, line).await?);
    }

    let removed_sale_movements = ledger::delete_sale_movements_for_reference(uow.conn(), sale_id).await?;
    let receivable_removed = receivable::delete_by_sale(uow.conn(), sale_id).await?;
    sale_repo::delete_lines(uow.conn(), sale_id).await?;
    sale_repo::delete_header(uow.conn(), sale_id).await?;

    Ok(VoidReceipt {
        sale_id: header.id,
        transaction_code: header.transaction_code,
        adjustments,
        removed_sale_movements,
        receivable_removed,
    })
}

async fn restore_line(
    uow: &mut UnitOfWork,
    actor: &Actor,
    line: &SaleLineItem,
) -> EngineResult<StockMovement> {
    let previous = inventory::current_stock(uow.conn(), &line.item_id)
        .await?
        .ok_or_else(|| CoreError::ItemNotFound(line.item_id.clone()))?;
    let new_stock = inventory::increment_stock(uow.conn(), &line.item_id, line.base_quantity).await?;

    check_movement(
        &line.item_id,
        MovementType::Adjustment,
        line.base_quantity,
        previous,
        new_stock,
    )?;

    let movement = StockMovement {
        id: Uuid::new_v4().to_string(),
        item_id: line.item_id.clone(),
        movement_type: MovementType::Adjustment,
        quantity: line.base_quantity,
        reference_id: Some(line.sale_id.clone()),
        actor_id: actor.id.clone(),
        actor_name: actor.name.clone(),
        actor_role: actor.role.clone(),
        previous_stock: previous,
        new_stock,
        reason: Some(VOID_REASON.to_string()),
        created_at: Utc::now(),
    };
    ledger::append(uow.conn(), &movement).await?;

    Ok(movement)
}
