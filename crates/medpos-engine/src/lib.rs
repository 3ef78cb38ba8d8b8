//! # medpos-engine: Sale Transaction Engine
//!
//! Records point-of-sale transactions atomically: the sale header, its line
//! items, the inventory decrements and the stock movement ledger rows commit
//! together or not at all. CREDIT sales also get a receivable.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  client ─► Idempotency Guard ─► SaleEngine ─┬─► inventory (read/write)  │
//! │                                             ├─► unit resolver           │
//! │                                             ├─► stock movement ledger   │
//! │                                             └─► credit receivable       │
//! │                                  ─► COMMIT ─► SaleReceipt              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use medpos_core::idempotency::InMemoryIdempotencyStore;
//! use medpos_engine::SaleEngine;
//!
//! let engine = SaleEngine::new(db, Arc::new(InMemoryIdempotencyStore::default()));
//! let receipt = engine.create_sale(&actor, &request).await?;
//! engine.void_sale(&actor, &receipt.sale_id).await?;
//! ```

pub mod engine;
pub mod error;
pub mod sweeper;

pub use engine::{SaleEngine, VoidReceipt};
pub use error::{EngineError, EngineResult};
pub use sweeper::{spawn_idempotency_sweeper, SweeperHandle};
