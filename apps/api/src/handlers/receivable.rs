use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use medpos_core::CreditReceivable;

use crate::error::{ApiResponse, ApiResult};
use crate::extract::CurrentActor;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentBody {
    pub amount_cents: i64,
}

/// `POST /api/receivables/{id}/payments`
pub async fn record_payment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(receivable_id): Path<String>,
    body: Result<Json<PaymentBody>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<CreditReceivable>>> {
    let Json(payment) = body?;
    let receivable = state
        .engine
        .record_receivable_payment(&actor, &receivable_id, payment.amount_cents)
        .await?;
    Ok(ApiResponse::ok(receivable))
}
