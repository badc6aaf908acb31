//! # Error Types
//!
//! Domain-specific error types for keystone-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  keystone-core errors (this file)                                      │
//! │  ├── CodecError       - Barcode field failed to encode/decode          │
//! │  └── TransitionError  - Illegal lifecycle edge (names both states)     │
//! │                                                                         │
//! │  keystone-store errors (separate crate)                                │
//! │  └── StoreError       - Overflow, lock timeouts, DB failures           │
//! │                                                                         │
//! │  Flow: CodecError/TransitionError → StoreError → API layer → caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. A decode failure names the exact field that failed to parse
//! 3. Errors are enum variants, never String
//! 4. Identifier errors are never swallowed: a misformatted barcode
//!    corrupts a physical inventory record

use thiserror::Error;

use crate::lifecycle::SerialStatus;

// =============================================================================
// Codec Error
// =============================================================================

/// Barcode encoding/decoding errors.
///
/// Every variant names the field (or structural property) that failed, so
/// callers can report exactly which segment of a scanned string is bad.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input is shorter than the minimum field-width sum.
    #[error("barcode too short: {len} characters, minimum {min}")]
    TooShort { len: usize, min: usize },

    /// Input contains non-ASCII bytes; every field alphabet is ASCII.
    #[error("barcode contains non-ASCII characters")]
    NotAscii,

    /// Brand prefix must be exactly 2 uppercase alphanumeric characters.
    #[error("invalid brand prefix: {found:?}")]
    InvalidBrandPrefix { found: String },

    /// Supplier code must be exactly 2 uppercase letters.
    #[error("invalid supplier code: {found:?}")]
    InvalidSupplierCode { found: String },

    /// Year precedes the base year of the alphabet (2000).
    #[error("year {year} precedes base year {base}")]
    YearBeforeBase { year: i32, base: i32 },

    /// Year exceeds the two-letter alphabet capacity.
    #[error("year {year} exceeds the year-code alphabet")]
    YearPastAlphabet { year: i32 },

    /// Year segment of a barcode is not a valid year code.
    #[error("invalid year code: {found:?}")]
    InvalidYearCode { found: String },

    /// Month must be 1..=12.
    #[error("invalid month: {month}")]
    InvalidMonth { month: u32 },

    /// Month segment of a barcode is not one of A..L.
    #[error("invalid month code: {found:?}")]
    InvalidMonthCode { found: char },

    /// Model code must be at least 3 uppercase letters.
    #[error("invalid model code: {found:?}")]
    InvalidModelCode { found: String },

    /// Serial segment must be exactly 6 ASCII digits.
    #[error("invalid serial segment: {found:?}")]
    InvalidSerialSegment { found: String },

    /// Serial value is outside 1..=max.
    #[error("serial {serial} out of range 1..={max}")]
    SerialOutOfRange { serial: u64, max: u64 },

    /// Document type code must be 2..=4 uppercase letters.
    #[error("invalid document type code: {found:?}")]
    InvalidDocumentType { found: String },

    /// Company code must be 2..=4 uppercase letters.
    #[error("invalid company code: {found:?}")]
    InvalidCompanyCode { found: String },
}

// =============================================================================
// Transition Error
// =============================================================================

/// Illegal lifecycle transition.
///
/// ## When This Occurs
/// - Receiving a unit that was never sent to the vendor
/// - Selling a unit that was cancelled
/// - Any edge absent from the transition table
///
/// A failed transition never mutates the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal status transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    /// The unit's status when the transition was attempted.
    pub from: SerialStatus,
    /// The requested target status.
    pub to: SerialStatus,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CodecError.
pub type CoreResult<T> = Result<T, CodecError>;

// =============================================================================
// Unit Tests
// =============================================================================
