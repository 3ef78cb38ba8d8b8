//! # Repository Module
//!
//! SQL for each table group, as free functions over `&mut SqliteConnection`.
//!
//! ## Why Free Functions?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The same function runs inside a transaction or on a pooled connection │
//! │                                                                         │
//! │  let mut uow = db.begin().await?;                                      │
//! │  inventory::decrement_stock_if_available(uow.conn(), id, 5).await?;    │
//! │  ledger::append(uow.conn(), &movement).await?;                         │
//! │  uow.commit().await?;              ← both or neither                   │
//! │                                                                         │
//! │  let mut conn = db.connection().await?;                                │
//! │  ledger::list_by_item(&mut conn, id).await?;   ← plain read            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`inventory`] - Item lookup and conditional stock changes
//! - [`sale`] - Sale headers and line items
//! - [`ledger`] - Append-only stock movements
//! - [`receivable`] - Credit receivables and their payments

pub mod inventory;
pub mod ledger;
pub mod receivable;
pub mod sale;
