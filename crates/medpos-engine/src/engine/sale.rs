//! # Create Sale
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_sale_request        (no I/O; CREDIT needs name + phone)      │
//! │  idempotency try_acquire      (before BEGIN; never released)           │
//! │  BEGIN                                                                  │
//! │  ┌─ plan (request order) ─────────────────────────────────────────┐    │
//! │  │  item = get_by_id             → ItemNotFound                    │    │
//! │  │  base = resolve_base_quantity                                   │    │
//! │  │  Σ base per item ≤ stock      → InsufficientStock               │    │
//! │  │  price_line                                                     │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │  totals = Σ lines − discount                                           │
//! │  insert_header                                                         │
//! │  ┌─ per line ─────────────────────────────────────────────────────┐    │
//! │  │  insert_line                                                    │    │
//! │  │  prev = current_stock         (fresh read inside the tx)        │    │
//! │  │  new  = decrement_stock_if_available → None: InsufficientStock  │    │
//! │  │  append SALE movement (prev → new)                              │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │  CREDIT? insert receivable (paid 0, balance = final amount)            │
//! │  COMMIT                       (any error above: ROLLBACK)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use medpos_core::idempotency::fallback_key;
use medpos_core::ledger::check_movement;
use medpos_core::pricing::{price_line, LinePricing, SaleTotals};
use medpos_core::units::{resolve_base_quantity, UnitResolution};
use medpos_core::validation::{validate_sale_request, ValidatedSale};
use medpos_core::{
    Actor, CoreError, CreateSaleRequest, CreditReceivable, CreditStatus, InventoryItem, Money,
    MovementType, SaleHeader, SaleLineItem, SaleLineRequest, SaleReceipt, StockMovement,
    DEFAULT_CREDIT_TERM_DAYS,
};
use medpos_db::repository::{inventory, ledger, receivable, sale as sale_repo};
use medpos_db::UnitOfWork;

use super::SaleEngine;
use crate::error::EngineResult;

/// One line after lookup, unit resolution and pricing.
struct PlannedLine<'a> {
    request: &'a SaleLineRequest,
    item: InventoryItem,
    resolution: UnitResolution,
    pricing: LinePricing,
}

impl SaleEngine {
    /// Records a sale atomically.
    ///
    /// Fails with `DuplicateRequest` if the idempotency key (supplied or
    /// derived) is still registered. The key stays registered after a
    /// failure until its TTL passes.
    pub async fn create_sale(
        &self,
        actor: &Actor,
        request: &CreateSaleRequest,
    ) -> EngineResult<SaleReceipt> {
        let sale = validate_sale_request(request)?;

        let key = sale
            .idempotency_key
            .clone()
            .unwrap_or_else(|| fallback_key(&actor.id, &sale.lines, Utc::now()));

        if !self.idempotency.try_acquire(&key) {
            warn!(key = %key, actor_id = %actor.id, "Rejected duplicate sale submission");
            return Err(CoreError::DuplicateRequest { key }.into());
        }

        let mut uow = self.db.begin().await?;
        match write_sale(&mut uow, actor, &sale).await {
            Ok(receipt) => {
                uow.commit().await?;
                info!(
                    sale_id = %receipt.sale_id,
                    transaction_code = %receipt.transaction_code,
                    cashier_id = %actor.id,
                    lines = receipt.items.len(),
                    final_amount = %Money::from_cents(receipt.final_amount_cents),
                    payment_method = %receipt.payment_method,
                    "Sale committed"
                );
                Ok(receipt)
            }
            Err(e) => {
                uow.rollback().await;
                warn!(error = %e, key = %key, "Sale rolled back");
                Err(e)
            }
        }
    }
}

async fn write_sale(
    uow: &mut UnitOfWork,
    actor: &Actor,
    sale: &ValidatedSale,
) -> EngineResult<SaleReceipt> {
    let planned = plan_lines(uow, &sale.lines).await?;

    let totals = SaleTotals::accumulate(planned.iter().map(|p| &p.pricing), sale.discount)?;

    let now = Utc::now();
    let header = SaleHeader {
        id: Uuid::new_v4().to_string(),
        transaction_code: transaction_code(now),
        cashier_id: actor.id.clone(),
        cashier_name: actor.name.clone(),
        subtotal_cents: totals.subtotal.cents(),
        discount_cents: totals.discount.cents(),
        final_amount_cents: totals.final_amount.cents(),
        profit_cents: totals.final_profit.cents(),
        payment_method: sale.payment_method,
        customer_name: sale.customer_name.clone(),
        customer_phone: sale.customer_phone.clone(),
        notes: sale.notes.clone(),
        created_at: now,
    };
    sale_repo::insert_header(uow.conn(), &header).await?;

    let mut items = Vec::with_capacity(planned.len());
    for (line_no, plan) in planned.into_iter().enumerate() {
        let line = SaleLineItem {
            id: Uuid::new_v4().to_string(),
            sale_id: header.id.clone(),
            line_no: line_no as i64,
            item_id: plan.item.id.clone(),
            item_name: plan.item.name.clone(),
            quantity: plan.request.quantity,
            unit_type: plan.request.unit_type.clone(),
            unit_label: plan.request.unit_label.clone(),
            base_quantity: plan.resolution.base_quantity,
            unit_price_cents: plan.pricing.unit_price.cents(),
            unit_cost_cents: plan.pricing.unit_cost.cents(),
            subtotal_cents: plan.pricing.subtotal.cents(),
            profit_cents: plan.pricing.profit.cents(),
            created_at: now,
        };
        sale_repo::insert_line(uow.conn(), &line).await?;

        deduct_stock(uow, actor, &plan.item, line.base_quantity, &header.id).await?;
        items.push(line);
    }

    let receivable_id = if sale.payment_method.is_credit() {
        Some(issue_receivable(uow, sale, &header).await?)
    } else {
        None
    };

    Ok(SaleReceipt::from_parts(header, items, receivable_id))
}

/// Looks up, resolves and prices every line before anything is written.
async fn plan_lines<'a>(
    uow: &mut UnitOfWork,
    lines: &'a [SaleLineRequest],
) -> EngineResult<Vec<PlannedLine<'a>>> {
    let mut planned = Vec::with_capacity(lines.len());
    let mut demand: HashMap<String, i64> = HashMap::new();

    for request in lines {
        let item = inventory::get_by_id(uow.conn(), &request.item_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(request.item_id.clone()))?;

        let unit = request.unit_type.as_deref().or(request.unit_label.as_deref());
        let resolution = resolve_base_quantity(item.unit_conversions.as_deref(), request.quantity, unit);

        // Two lines for the same item draw on the same stock
        let needed = demand.entry(item.id.clone()).or_insert(0);
        *needed += resolution.base_quantity;
        if *needed > item.stock_quantity {
            return Err(CoreError::InsufficientStock {
                item_name: item.name.clone(),
                available: item.stock_quantity,
                needed: *needed,
            }
            .into());
        }

        let pricing = price_line(
            &item,
            &resolution,
            request.quantity,
            request.unit_price_cents.map(Money::from_cents),
        )?;

        debug!(
            item_id = %item.id,
            requested = request.quantity,
            base_quantity = resolution.base_quantity,
            outcome = ?resolution.outcome,
            subtotal = %pricing.subtotal,
            "Line planned"
        );

        planned.push(PlannedLine {
            request,
            item,
            resolution,
            pricing,
        });
    }

    Ok(planned)
}

/// Re-reads stock, decrements it conditionally and records the SALE movement.
async fn deduct_stock(
    uow: &mut UnitOfWork,
    actor: &Actor,
    item: &InventoryItem,
    base_quantity: i64,
    sale_id: &str,
) -> EngineResult<()> {
    let previous = inventory::current_stock(uow.conn(), &item.id)
        .await?
        .ok_or_else(|| CoreError::ItemNotFound(item.id.clone()))?;

    let new_stock = inventory::decrement_stock_if_available(uow.conn(), &item.id, base_quantity)
        .await?
        .ok_or_else(|| CoreError::InsufficientStock {
            item_name: item.name.clone(),
            available: previous,
            needed: base_quantity,
        })?;

    check_movement(&item.id, MovementType::Sale, base_quantity, previous, new_stock)?;

    ledger::append(
        uow.conn(),
        &StockMovement {
            id: Uuid::new_v4().to_string(),
            item_id: item.id.clone(),
            movement_type: MovementType::Sale,
            quantity: base_quantity,
            reference_id: Some(sale_id.to_string()),
            actor_id: actor.id.clone(),
            actor_name: actor.name.clone(),
            actor_role: actor.role.clone(),
            previous_stock: previous,
            new_stock,
            reason: None,
            created_at: Utc::now(),
        },
    )
    .await?;

    Ok(())
}

async fn issue_receivable(
    uow: &mut UnitOfWork,
    sale: &ValidatedSale,
    header: &SaleHeader,
) -> EngineResult<String> {
    let (Some(customer_name), Some(customer_phone)) =
        (sale.customer_name.clone(), sale.customer_phone.clone())
    else {
        return Err(CoreError::MissingCreditCustomer.into());
    };

    let due_date = sale
        .due_date
        .unwrap_or_else(|| (header.created_at + Duration::days(DEFAULT_CREDIT_TERM_DAYS)).date_naive());

    let record = CreditReceivable {
        id: Uuid::new_v4().to_string(),
        sale_id: header.id.clone(),
        customer_name,
        customer_phone,
        total_cents: header.final_amount_cents,
        paid_cents: 0,
        balance_cents: header.final_amount_cents,
        due_date,
        status: CreditStatus::from_amounts(Money::from_cents(header.final_amount_cents), Money::zero()),
        created_at: header.created_at,
        updated_at: header.created_at,
    };
    receivable::insert(uow.conn(), &record).await?;

    info!(receivable_id = %record.id, sale_id = %header.id, balance = record.balance_cents, "Credit receivable issued");
    Ok(record.id)
}

/// `TRX-YYYYMMDD-XXXXXX` with a random uppercase hex suffix.
pub(crate) fn transaction_code(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("TRX-{}-{}", now.format("%Y%m%d"), suffix)
}
