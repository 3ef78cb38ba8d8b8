use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use medpos_core::StockMovement;

use crate::error::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub reference_id: String,
}

/// `GET /api/inventory/{id}/movements`, oldest first.
pub async fn item_movements(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<StockMovement>>>> {
    let movements = state.engine.movements_for_item(&item_id).await?;
    Ok(ApiResponse::ok(movements))
}

/// `GET /api/movements?reference_id=`
pub async fn movements_by_reference(
    State(state): State<AppState>,
    query: Result<Query<MovementQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<StockMovement>>>> {
    let Query(query) = query?;
    let movements = state.engine.movements_for_reference(&query.reference_id).await?;
    Ok(ApiResponse::ok(movements))
}
