//! # Sequence Keys & Counters
//!
//! The composite keys under which document/serial counters are maintained,
//! and the counter record itself.
//!
//! ## Key Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sequence Key Shapes                                │
//! │                                                                         │
//! │  Document   (doc_type, financial_year)        → "DOC/PO/25-26"         │
//! │             Purchase/GRN/invoice numbers, 7-digit ceiling              │
//! │                                                                         │
//! │  Serial     (model, supplier, year, month)    → "SER/IEL/FS/AA/A"      │
//! │             Barcode serials, 6-digit ceiling (999_999)                 │
//! │                                                                         │
//! │  Model      (model)                           → "MOD/IEL"              │
//! │             Continuous 8-digit per-model scheme; an independent        │
//! │             second shape, NOT a special case of Serial                 │
//! │                                                                         │
//! │  Distinct keys are fully independent: no cross-key ordering, no        │
//! │  shared locks.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{MAX_CONTINUOUS_SERIAL, MAX_DOCUMENT_SEQUENCE, MAX_SERIAL};

// =============================================================================
// Sequence Key
// =============================================================================

/// Composite key identifying one independently-sequenced counter.
///
/// Opaque to callers: ordered, hashable, and renderable to a canonical
/// string for persistence. The canonical form uses '/' separators, which
/// cannot appear in any component (all components are validated uppercase
/// alphanumerics or FY labels).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SequenceKey {
    /// Document numbers: one counter per (document type, financial year).
    Document {
        doc_type: String,
        financial_year: String,
    },
    /// Year/month-scoped barcode serials.
    Serial {
        model: String,
        supplier: String,
        year_code: String,
        month_code: char,
    },
    /// Continuous per-model serials (8-digit scheme).
    Model { model: String },
}

impl SequenceKey {
    /// Key for a document-number counter, e.g. `("PO", "25-26")`.
    pub fn for_document(doc_type: impl Into<String>, financial_year: impl Into<String>) -> Self {
        SequenceKey::Document {
            doc_type: doc_type.into(),
            financial_year: financial_year.into(),
        }
    }

    /// Key for a year/month-scoped serial counter.
    pub fn for_serial(
        model: impl Into<String>,
        supplier: impl Into<String>,
        year_code: impl Into<String>,
        month_code: char,
    ) -> Self {
        SequenceKey::Serial {
            model: model.into(),
            supplier: supplier.into(),
            year_code: year_code.into(),
            month_code,
        }
    }

    /// Key for a continuous per-model serial counter.
    pub fn for_model(model: impl Into<String>) -> Self {
        SequenceKey::Model {
            model: model.into(),
        }
    }

    /// Canonical string form used as the persistence key.
    pub fn canonical(&self) -> String {
        match self {
            SequenceKey::Document {
                doc_type,
                financial_year,
            } => format!("DOC/{doc_type}/{financial_year}"),
            SequenceKey::Serial {
                model,
                supplier,
                year_code,
                month_code,
            } => format!("SER/{model}/{supplier}/{year_code}/{month_code}"),
            SequenceKey::Model { model } => format!("MOD/{model}"),
        }
    }

    /// The issuance ceiling for counters created under this key shape.
    pub fn default_ceiling(&self) -> u64 {
        match self {
            SequenceKey::Document { .. } => MAX_DOCUMENT_SEQUENCE,
            SequenceKey::Serial { .. } => MAX_SERIAL,
            SequenceKey::Model { .. } => MAX_CONTINUOUS_SERIAL,
        }
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

// =============================================================================
// Sequence Counter
// =============================================================================

/// One durable counter record.
///
/// ## Invariants
/// - `last_issued <= max_allowed`
/// - `last_issued` is non-decreasing except through an explicit, audited reset
/// - Never deleted: issuance history is append-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceCounter {
    /// The composite key this counter sequences.
    pub key: SequenceKey,

    /// Highest value issued so far; 0 means nothing issued yet.
    pub last_issued: u64,

    /// Hard ceiling; an allocation past this fails with no mutation.
    pub max_allowed: u64,

    /// Total values ever issued under this key (survives resets, so it can
    /// exceed `last_issued` after a downward reset).
    pub total_issued: u64,
}

impl SequenceCounter {
    /// Zero-initialized counter with the key's default ceiling.
    ///
    /// Counters are created lazily on first allocation for a key.
    pub fn new(key: SequenceKey) -> Self {
        let max_allowed = key.default_ceiling();
        SequenceCounter {
            key,
            last_issued: 0,
            max_allowed,
            total_issued: 0,
        }
    }

    /// How many values remain before the ceiling.
    pub fn remaining(&self) -> u64 {
        self.max_allowed - self.last_issued
    }

    /// Would issuing `n` more values exceed the ceiling?
    pub fn would_overflow(&self, n: u64) -> bool {
        n > self.remaining()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_forms() {
        let doc = SequenceKey::for_document("PO", "25-26");
        assert_eq!(doc.canonical(), "DOC/PO/25-26");

        let ser = SequenceKey::for_serial("IEL", "FS", "AA", 'A');
        assert_eq!(ser.canonical(), "SER/IEL/FS/AA/A");

        let model = SequenceKey::for_model("IEL");
        assert_eq!(model.canonical(), "MOD/IEL");
    }

    #[test]
    fn test_distinct_shapes_have_distinct_canonicals() {
        // A model key must never alias a serial key for the same model.
        let a = SequenceKey::for_model("IEL").canonical();
        let b = SequenceKey::for_serial("IEL", "FS", "AA", 'A').canonical();
        assert_ne!(a, b);
    }

    #[test]
    fn test_ceilings_per_shape() {
        assert_eq!(
            SequenceKey::for_serial("IEL", "FS", "AA", 'A').default_ceiling(),
            999_999
        );
        assert_eq!(SequenceKey::for_model("IEL").default_ceiling(), 99_999_999);
        assert_eq!(
            SequenceKey::for_document("PO", "25-26").default_ceiling(),
            9_999_999
        );
    }

    #[test]
    fn test_counter_overflow_math() {
        let mut counter = SequenceCounter::new(SequenceKey::for_serial("IEL", "FS", "AA", 'A'));
        assert_eq!(counter.remaining(), 999_999);
        assert!(!counter.would_overflow(999_999));
        assert!(counter.would_overflow(1_000_000));

        counter.last_issued = 999_997;
        assert!(!counter.would_overflow(2));
        assert!(counter.would_overflow(3));
    }
}
