//! # HTTP Handlers
//!
//! Each handler extracts, calls one engine operation, and wraps the result
//! in the `{success, data}` envelope. No business logic lives here.

pub mod health;
pub mod movement;
pub mod receivable;
pub mod sale;

use axum::extract::rejection::{JsonRejection, QueryRejection};

use crate::error::ApiError;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
