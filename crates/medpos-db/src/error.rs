//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error                                                            │
//! │       │  classified by SQLite result code, not message text             │
//! │       ▼                                                                 │
//! │  DbError (this module)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError::Db (medpos-engine), rolled back by the unit of work       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/api): NotFound → 404, everything else 500 + log         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock shortfalls are normally caught by the engine before any write.
//! The `stock_quantity >= 0` CHECK on `inventory_items` is the last line;
//! when it fires the sale surfaces as [`DbError::CheckViolation`].

use thiserror::Error;

/// Extended result code for `RAISE(ABORT, ...)` inside a trigger.
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";
/// Primary result code for a locked database file.
const SQLITE_BUSY: i32 = 5;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A sale, receivable or inventory item looked up by ID does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the row.
    ///
    /// ## When This Occurs
    /// - Transaction code collision on `sales`
    /// - Second receivable for the same sale
    /// - Re-inserting an inventory item ID
    #[error("Unique constraint failed on {constraint}")]
    UniqueViolation { constraint: String },

    /// A row points at a parent that does not exist or still has children.
    ///
    /// ## When This Occurs
    /// - `sale_items` or `stock_movements` naming an unknown inventory item
    /// - Deleting a sale header while its lines still exist
    #[error("Foreign key constraint failed: {0}")]
    ForeignKeyViolation(String),

    /// A CHECK constraint rejected the row.
    ///
    /// ## When This Occurs
    /// - Stock decrement below zero
    /// - Non-positive line quantity
    /// - Receivable `paid + balance` not equal to its total
    #[error("Check constraint failed: {0}")]
    CheckViolation(String),

    /// A NOT NULL column was left empty.
    #[error("Missing required column: {0}")]
    NotNullViolation(String),

    /// A trigger aborted the statement with `RAISE(ABORT, ...)`.
    #[error("Write aborted by trigger: {0}")]
    TriggerAbort(String),

    /// Another connection held the write lock past the busy timeout.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema migration failed at startup.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other SQL error reported by SQLite.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// BEGIN or COMMIT failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// All connections in use past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Decode or protocol error inside sqlx.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when retrying the whole unit of work may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// RowNotFound                         → NotFound
/// Database, kind UniqueViolation      → UniqueViolation
/// Database, kind ForeignKeyViolation  → ForeignKeyViolation
/// Database, kind CheckViolation       → CheckViolation
/// Database, kind NotNullViolation     → NotNullViolation
/// Database, code 1811                 → TriggerAbort
/// Database, primary code 5            → Busy
/// Database, anything else             → QueryFailed
/// PoolTimedOut                        → PoolExhausted
/// PoolClosed                          → ConnectionFailed
/// Other                               → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        constraint: constraint_target(&message),
                    },
                    sqlx::error::ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation(message),
                    sqlx::error::ErrorKind::CheckViolation => DbError::CheckViolation(constraint_target(&message)),
                    sqlx::error::ErrorKind::NotNullViolation => DbError::NotNullViolation(constraint_target(&message)),
                    _ => classify_code(db_err.code().as_deref(), message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Maps a SQLite extended result code not covered by `ErrorKind`.
fn classify_code(code: Option<&str>, message: String) -> DbError {
    let Some(code) = code else {
        return DbError::QueryFailed(message);
    };
    if code == SQLITE_CONSTRAINT_TRIGGER {
        return DbError::TriggerAbort(message);
    }
    match code.parse::<i32>() {
        Ok(extended) if extended & 0xff == SQLITE_BUSY => DbError::Busy(message),
        _ => DbError::QueryFailed(message),
    }
}

/// `"CHECK constraint failed: stock_quantity >= 0"` → `"stock_quantity >= 0"`.
fn constraint_target(message: &str) -> String {
    message
        .split_once(": ")
        .map(|(_, target)| target.trim().to_string())
        .unwrap_or_else(|| message.to_string())
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
