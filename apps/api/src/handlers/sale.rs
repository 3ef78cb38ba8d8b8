//! Sale routes: create, read, list, void.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use medpos_core::{CreateSaleRequest, SaleHeader, SaleReceipt};
use medpos_engine::VoidReceipt;

use crate::error::{ApiResponse, ApiResult};
use crate::extract::{header_str, CurrentActor, IDEMPOTENCY_KEY_HEADER};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListSalesQuery {
    pub limit: Option<u32>,
}

/// `POST /api/sales`
///
/// The body's `idempotency_key` wins over the `Idempotency-Key` header.
pub async fn create_sale(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    headers: HeaderMap,
    body: Result<Json<CreateSaleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SaleReceipt>>)> {
    let Json(mut request) = body?;

    if request.idempotency_key.is_none() {
        request.idempotency_key = header_str(&headers, IDEMPOTENCY_KEY_HEADER).map(str::to_string);
    }

    debug!(actor_id = %actor.id, lines = request.items.len(), "create_sale request");
    let receipt = state.engine.create_sale(&actor, &request).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(receipt)))
}

/// `GET /api/sales?limit=`
pub async fn list_sales(
    State(state): State<AppState>,
    query: Result<Query<ListSalesQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<SaleHeader>>>> {
    let Query(query) = query?;
    let sales = state.engine.list_recent_sales(query.limit).await?;
    Ok(ApiResponse::ok(sales))
}

/// `GET /api/sales/{id}`
pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> ApiResult<Json<ApiResponse<SaleReceipt>>> {
    let receipt = state.engine.get_sale(&sale_id).await?;
    Ok(ApiResponse::ok(receipt))
}

/// `POST /api/sales/{id}/void`
pub async fn void_sale(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(sale_id): Path<String>,
) -> ApiResult<Json<ApiResponse<VoidReceipt>>> {
    let voided = state.engine.void_sale(&actor, &sale_id).await?;
    Ok(ApiResponse::ok(voided))
}
