//! # API Error Type
//!
//! Every failure leaves the server as
//! `{"success": false, "error": "<message>"}` with a status matching its class.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Validation / MissingCreditCustomer / Overpayment /                    │
//! │  malformed body or query                            → 400              │
//! │  Missing X-Actor-Id                                 → 401              │
//! │  ItemNotFound / SaleNotFound / ReceivableNotFound   → 404              │
//! │  InsufficientStock / DuplicateRequest /                                │
//! │  ReceivableSettled                                  → 409              │
//! │  DbError::Busy / PoolExhausted                      → 503 (logged)     │
//! │  other DbError / LedgerInvariant                    → 500 (logged)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage errors never reach the client verbatim: the detail is logged and
//! the body carries a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use medpos_core::CoreError;
use medpos_db::DbError;
use medpos_engine::EngineError;

/// Error returned from every handler.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ItemNotFound(_)
            | CoreError::SaleNotFound(_)
            | CoreError::ReceivableNotFound(_) => ApiError::not_found(message),

            CoreError::InsufficientStock { .. }
            | CoreError::DuplicateRequest { .. }
            | CoreError::ReceivableSettled(_) => ApiError::conflict(message),

            CoreError::MissingCreditCustomer
            | CoreError::Overpayment { .. }
            | CoreError::Validation(_) => ApiError::bad_request(message),

            CoreError::LedgerInvariant { .. } => {
                tracing::error!(error = %message, "Ledger invariant violated");
                ApiError::internal("Internal error")
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(format!("{entity} not found: {id}")),
            other if other.is_transient() => {
                tracing::warn!(error = %other, "Database busy");
                ApiError::unavailable("Database busy, retry the request")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::internal("Database operation failed")
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(e) => e.into(),
            EngineError::Db(e) => e.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            tracing::debug!(status = %self.status, error = %self.message, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(ApiResponse { success: true, data })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
