//! # keystone-core: Pure Numbering Logic for Keystone ERP
//!
//! This crate is the **heart** of the document/serial numbering subsystem.
//! It contains the identifier logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Keystone Numbering Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  ERP Request Handlers (elsewhere)                │   │
//! │  │    create_purchase_order, receive_grn, mint_barcodes, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    keystone-store                                │   │
//! │  │    SequenceAllocator ── CounterStore ── SerialUnitRepository    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ keystone-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ calendar  │  │ alphabet  │  │   codec   │  │ lifecycle │  │   │
//! │  │   │ FY labels │  │ year/month│  │  Barcode  │  │ SerialUnit│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCKS • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`calendar`] - Financial year labeling (April-start fiscal year)
//! - [`alphabet`] - Letter ⇄ integer mappers for year/month code fields
//! - [`codec`] - Barcode encode/decode with field validation
//! - [`keys`] - Sequence keys and counter records
//! - [`lifecycle`] - Serial unit status state machine
//! - [`validation`] - Shared field validators
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Closed Enums**: Status values are tagged variants; raw strings only
//!    exist at the persistence/transport boundary
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use keystone_core::calendar::financial_year_label;
//! use keystone_core::codec::{BarcodeCodec, IdentifierFields};
//!
//! // Fiscal year starts 1 April
//! let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
//! assert_eq!(financial_year_label(date), "25-26");
//!
//! // Encode one physical unit's identity into a scannable barcode
//! let fields = IdentifierFields::new("AP", "FS", 2026, 1, "IEL", 1).unwrap();
//! let barcode = BarcodeCodec::encode(&fields).unwrap();
//! assert_eq!(barcode, "APFSAAAIEL000001");
//! assert_eq!(BarcodeCodec::decode(&barcode).unwrap(), fields);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alphabet;
pub mod calendar;
pub mod codec;
pub mod error;
pub mod keys;
pub mod lifecycle;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use keystone_core::SerialStatus` instead of
// `use keystone_core::lifecycle::SerialStatus`

pub use codec::{BarcodeCodec, IdentifierFields};
pub use error::{CodecError, CoreResult, TransitionError};
pub use keys::{SequenceCounter, SequenceKey};
pub use lifecycle::{SerialStatus, SerialUnit, TransitionRecord};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// First year representable by the year-code alphabet.
///
/// ## Why a constant?
/// The year field of a barcode is an offset from this base. Moving it would
/// silently re-map every barcode already printed, so it is fixed for the
/// lifetime of the encoding scheme.
pub const BASE_YEAR: i32 = 2000;

/// Width of the serial segment in a barcode (zero-padded decimal digits).
pub const SERIAL_WIDTH: usize = 6;

/// Highest serial issuable under a year/month-scoped serial key.
///
/// ## Business Reason
/// The barcode serial segment is exactly 6 digits; 999_999 units per
/// (model, supplier, year, month) is the hard capacity of the scheme.
pub const MAX_SERIAL: u64 = 999_999;

/// Highest serial issuable under the continuous per-model scheme (8 digits).
pub const MAX_CONTINUOUS_SERIAL: u64 = 99_999_999;

/// Highest sequence issuable for a document-number key.
///
/// ## Business Reason
/// Document numbers are zero-padded to 5 digits but may grow past the pad
/// width; 7 digits per (type, financial year) is far beyond any realistic
/// volume while still bounding the counter.
pub const MAX_DOCUMENT_SEQUENCE: u64 = 9_999_999;

/// Zero-pad width for the sequence segment of a document number.
pub const DOCUMENT_SEQUENCE_WIDTH: usize = 5;
