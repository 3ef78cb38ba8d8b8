//! # medpos-api
//!
//! HTTP surface of the sale engine.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/sales                      create_sale      201             │
//! │  GET  /api/sales?limit=               list_recent_sales                │
//! │  GET  /api/sales/{id}                 get_sale                         │
//! │  POST /api/sales/{id}/void            void_sale                        │
//! │  GET  /api/inventory/{id}/movements   movements_for_item               │
//! │  GET  /api/movements?reference_id=    movements_for_reference          │
//! │  POST /api/receivables/{id}/payments  record_receivable_payment        │
//! │  GET  /health                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;

#[cfg(test)]
mod tests;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use medpos_engine::SaleEngine;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResponse, ApiResult};

/// Shared handler state. Clones share the engine.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: SaleEngine,
}

impl AppState {
    pub fn new(engine: SaleEngine) -> Self {
        AppState { engine }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/sales",
            post(handlers::sale::create_sale).get(handlers::sale::list_sales),
        )
        .route("/api/sales/{id}", get(handlers::sale::get_sale))
        .route("/api/sales/{id}/void", post(handlers::sale::void_sale))
        .route(
            "/api/inventory/{id}/movements",
            get(handlers::movement::item_movements),
        )
        .route(
            "/api/movements",
            get(handlers::movement::movements_by_reference),
        )
        .route(
            "/api/receivables/{id}/payments",
            post(handlers::receivable::record_payment),
        )
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
