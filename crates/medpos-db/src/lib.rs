//! # medpos-db: Database Layer for MedPOS
//!
//! SQLite storage for the sale engine, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MedPOS Data Flow                                 │
//! │                                                                         │
//! │  SaleEngine::create_sale / void_sale                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    medpos-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ inventory     │    │              │  │   │
//! │  │   │ SqlitePool    │    │ sale          │    │ 001_initial  │  │   │
//! │  │   │ UnitOfWork    │◄───│ ledger        │    │ _schema.sql  │  │   │
//! │  │   │               │    │ receivable    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`unit_of_work`] - Explicit transaction boundary
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - SQL per table group
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medpos_db::{repository::inventory, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("medpos.db")).await?;
//!
//! let mut uow = db.begin().await?;
//! let item = inventory::get_by_id(uow.conn(), "amox-500").await?;
//! uow.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;
