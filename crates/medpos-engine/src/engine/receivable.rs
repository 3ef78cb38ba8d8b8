//! # Receivable Payments
//!
//! Collects money against a CREDIT sale's receivable.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use medpos_core::validation::validate_payment_amount;
use medpos_core::{Actor, CoreError, CreditReceivable, CreditStatus, Money, ReceivablePayment};
use medpos_db::repository::receivable;
use medpos_db::UnitOfWork;

use super::SaleEngine;
use crate::error::EngineResult;

impl SaleEngine {
    /// Applies a payment and returns the updated receivable.
    ///
    /// ## Status Transitions
    /// ```text
    /// PENDING ──► PARTIAL ──► PAID
    /// ```
    /// A payment larger than the balance is rejected, as is any payment
    /// against a PAID receivable.
    pub async fn record_receivable_payment(
        &self,
        actor: &Actor,
        receivable_id: &str,
        amount_cents: i64,
    ) -> EngineResult<CreditReceivable> {
        validate_payment_amount(amount_cents)?;

        let mut uow = self.db.begin().await?;
        match apply(&mut uow, actor, receivable_id, amount_cents).await {
            Ok(updated) => {
                uow.commit().await?;
                info!(
                    receivable_id = %updated.id,
                    amount = %Money::from_cents(amount_cents),
                    balance = %Money::from_cents(updated.balance_cents),
                    status = ?updated.status,
                    "Receivable payment recorded"
                );
                Ok(updated)
            }
            Err(e) => {
                uow.rollback().await;
                Err(e)
            }
        }
    }

    /// Receivable for a sale, if it was a CREDIT sale.
    pub async fn receivable_for_sale(&self, sale_id: &str) -> EngineResult<Option<CreditReceivable>> {
        let mut conn = self.db.connection().await?;
        Ok(receivable::get_by_sale(&mut conn, sale_id).await?)
    }

    pub async fn receivable_payments(&self, receivable_id: &str) -> EngineResult<Vec<ReceivablePayment>> {
        let mut conn = self.db.connection().await?;
        Ok(receivable::list_payments(&mut conn, receivable_id).await?)
    }
}

async fn apply(
    uow: &mut UnitOfWork,
    actor: &Actor,
    receivable_id: &str,
    amount_cents: i64,
) -> EngineResult<CreditReceivable> {
    let current = receivable::get_by_id(uow.conn(), receivable_id)
        .await?
        .ok_or_else(|| CoreError::ReceivableNotFound(receivable_id.to_string()))?;

    if current.status == CreditStatus::Paid {
        return Err(CoreError::ReceivableSettled(receivable_id.to_string()).into());
    }
    if amount_cents > current.balance_cents {
        return Err(CoreError::Overpayment {
            amount: amount_cents,
            balance: current.balance_cents,
        }
        .into());
    }

    let paid = current.paid_cents + amount_cents;
    let balance = current.total_cents - paid;
    let status = CreditStatus::from_amounts(Money::from_cents(current.total_cents), Money::from_cents(paid));

    receivable::insert_payment(
        uow.conn(),
        &ReceivablePayment {
            id: Uuid::new_v4().to_string(),
            receivable_id: receivable_id.to_string(),
            amount_cents,
            received_by: actor.id.clone(),
            created_at: Utc::now(),
        },
    )
    .await?;
    receivable::apply_payment(uow.conn(), receivable_id, paid, balance, status).await?;

    receivable::get_by_id(uow.conn(), receivable_id)
        .await?
        .ok_or_else(|| CoreError::ReceivableNotFound(receivable_id.to_string()).into())
}
