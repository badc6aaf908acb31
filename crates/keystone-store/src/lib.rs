//! # keystone-store: Allocation & Persistence for Keystone Numbering
//!
//! Everything stateful lives here: counter leasing, the sequence allocator,
//! serial-unit persistence, and the SQLite plumbing underneath them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    keystone-store (THIS CRATE)                           │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌────────────────────┐   ┌──────────────────┐  │
//! │  │ DocumentNumber   │   │ SerialMintService  │   │ SerialUnit       │  │
//! │  │ Formatter        │   │ (registry-checked) │   │ Repository       │  │
//! │  └────────┬─────────┘   └─────────┬──────────┘   └────────┬─────────┘  │
//! │           │                       │                       │            │
//! │           └───────────┬───────────┘                       │            │
//! │                       ▼                                   │            │
//! │             SequenceAllocator                             │            │
//! │                       │                                   │            │
//! │                       ▼                                   │            │
//! │             CounterStore (trait)                          │            │
//! │              ├── MemoryCounterStore                       │            │
//! │              └── SqliteCounterStore ──────┐               │            │
//! │                                           ▼               ▼            │
//! │                                      Database (sqlx SQLite pool)       │
//! │                                                                         │
//! │             keystone-core supplies keys, codec, and the state machine  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`allocator`] - Gap-free sequence allocation over any [`CounterStore`]
//! - [`store`] - The `CounterStore`/`CounterLease` contract and keyed locks
//! - [`memory`] - In-process counter store (tests, single-node deployments)
//! - [`sqlite`] - Durable counter store over SQLite
//! - [`db`] - Connection pool, pragmas, embedded migrations
//! - [`document`] - Document number formatting (`PO/APL/25-26/00042`)
//! - [`mint`] - Batch barcode minting
//! - [`units`] - Serial unit persistence, transitions, and export
//! - [`registry`] - Supplier/model code lookups
//! - [`error`] - Store error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod db;
pub mod document;
pub mod error;
pub mod memory;
pub mod mint;
pub mod registry;
pub mod sqlite;
pub mod store;
pub mod units;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocator::{AllocatorConfig, SequenceAllocator};
pub use db::{Database, DbConfig};
pub use document::{DocumentNumberFormatter, DocumentType};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryCounterStore;
pub use mint::{MintRequest, SerialMintService};
pub use registry::{CodeRegistry, MemoryCodeRegistry, SqliteCodeRegistry};
pub use sqlite::SqliteCounterStore;
pub use store::{CounterLease, CounterStore, CreateMode, KeyedLock};
pub use units::{SerialUnitRepository, UnitExportRecord};
