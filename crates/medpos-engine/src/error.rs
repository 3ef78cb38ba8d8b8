//! # Engine Errors
//!
//! Everything `create_sale`, `void_sale` and the receivable operations can
//! fail with. Business failures keep their original message so the cashier
//! sees exactly why a sale was refused.

use medpos_core::{CoreError, ValidationError};
use medpos_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Validation, not-found and business-rule failures.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failures (connection, constraint, transaction).
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

impl EngineError {
    /// True when the failure came from the request, not the infrastructure.
    pub fn is_business(&self) -> bool {
        matches!(self, EngineError::Core(_))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
