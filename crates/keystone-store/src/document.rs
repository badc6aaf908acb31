//! # Document Number Formatter
//!
//! Thin formatter combining the allocator and the fiscal calendar into the
//! external document-number string.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Document Number Format                                │
//! │                                                                         │
//! │   PO / APL / 25-26 / 00001                                              │
//! │   ──   ───   ─────   ─────                                              │
//! │   type company  FY    sequence (zero-padded, per (type, FY) counter)   │
//! │                                                                         │
//! │   Each document type restarts at 00001 every fiscal year; uniqueness   │
//! │   follows directly from counter uniqueness per key.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use keystone_core::calendar::financial_year_label;
use keystone_core::validation::validate_company_code;
use keystone_core::{SequenceKey, DOCUMENT_SEQUENCE_WIDTH};

use crate::allocator::SequenceAllocator;
use crate::error::{StoreError, StoreResult};
use crate::store::CounterStore;

// =============================================================================
// Document Type
// =============================================================================

/// The document families that carry audit-facing numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Purchase order.
    PurchaseOrder,
    /// Goods received note.
    GoodsReceipt,
    /// Sales invoice.
    SalesInvoice,
    /// Purchase return.
    PurchaseReturn,
}

impl DocumentType {
    /// The short code printed in the document number.
    pub fn code(&self) -> &'static str {
        match self {
            DocumentType::PurchaseOrder => "PO",
            DocumentType::GoodsReceipt => "GRN",
            DocumentType::SalesInvoice => "INV",
            DocumentType::PurchaseReturn => "PRN",
        }
    }

    /// Zero-pad width for the sequence segment.
    pub fn padding(&self) -> usize {
        DOCUMENT_SEQUENCE_WIDTH
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Formatter
// =============================================================================

/// Issues and previews external document numbers.
pub struct DocumentNumberFormatter<S: CounterStore> {
    allocator: Arc<SequenceAllocator<S>>,
}

impl<S: CounterStore> DocumentNumberFormatter<S> {
    pub fn new(allocator: Arc<SequenceAllocator<S>>) -> Self {
        DocumentNumberFormatter { allocator }
    }

    /// Issues the next document number for `(doc_type, FY-of-date)`.
    ///
    /// ## Example
    /// Three sequential issues of `("PO", "APL", 2026-01-15)` produce
    /// `PO/APL/25-26/00001`, `PO/APL/25-26/00002`, `PO/APL/25-26/00003`.
    pub async fn issue(
        &self,
        doc_type: DocumentType,
        company_code: &str,
        date: NaiveDate,
    ) -> StoreResult<String> {
        validate_company_code(company_code)?;

        let fy = financial_year_label(date);
        let key = SequenceKey::for_document(doc_type.code(), &fy);
        let seq = self.allocator.next(&key).await?;

        let number = format_number(doc_type, company_code, &fy, seq);
        debug!(doc_type = %doc_type, number = %number, "issued document number");
        Ok(number)
    }

    /// Previews the next document number without issuing it.
    ///
    /// Side-effect-free; never takes the counter lease. The preview is not
    /// a reservation: a concurrent [`issue`](Self::issue) may consume it.
    /// Before any number has been issued for the key, previews `1`.
    pub async fn preview_next(
        &self,
        doc_type: DocumentType,
        company_code: &str,
        date: NaiveDate,
    ) -> StoreResult<String> {
        validate_company_code(company_code)?;

        let fy = financial_year_label(date);
        let key = SequenceKey::for_document(doc_type.code(), &fy);
        let seq = match self.allocator.peek(&key).await {
            Ok(seq) => seq,
            // Counter not created yet: the first issue will produce 1.
            Err(StoreError::UnknownKey { .. }) => 1,
            Err(e) => return Err(e),
        };

        Ok(format_number(doc_type, company_code, &fy, seq))
    }
}

fn format_number(doc_type: DocumentType, company_code: &str, fy: &str, seq: u64) -> String {
    format!(
        "{}/{}/{}/{:0width$}",
        doc_type.code(),
        company_code,
        fy,
        seq,
        width = doc_type.padding(),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCounterStore;

    fn formatter() -> DocumentNumberFormatter<MemoryCounterStore> {
        DocumentNumberFormatter::new(Arc::new(SequenceAllocator::new(MemoryCounterStore::new())))
    }

    fn jan_15_2026() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    #[tokio::test]
    async fn test_sequential_issue_produces_padded_sequence() {
        let formatter = formatter();
        let date = jan_15_2026();

        let first = formatter
            .issue(DocumentType::PurchaseOrder, "APL", date)
            .await
            .unwrap();
        let second = formatter
            .issue(DocumentType::PurchaseOrder, "APL", date)
            .await
            .unwrap();
        let third = formatter
            .issue(DocumentType::PurchaseOrder, "APL", date)
            .await
            .unwrap();

        assert_eq!(first, "PO/APL/25-26/00001");
        assert_eq!(second, "PO/APL/25-26/00002");
        assert_eq!(third, "PO/APL/25-26/00003");
    }

    #[tokio::test]
    async fn test_types_and_fiscal_years_sequence_independently() {
        let formatter = formatter();
        let in_fy_25_26 = jan_15_2026();
        let in_fy_26_27 = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();

        assert_eq!(
            formatter
                .issue(DocumentType::PurchaseOrder, "APL", in_fy_25_26)
                .await
                .unwrap(),
            "PO/APL/25-26/00001"
        );
        assert_eq!(
            formatter
                .issue(DocumentType::GoodsReceipt, "APL", in_fy_25_26)
                .await
                .unwrap(),
            "GRN/APL/25-26/00001"
        );
        assert_eq!(
            formatter
                .issue(DocumentType::PurchaseOrder, "APL", in_fy_26_27)
                .await
                .unwrap(),
            "PO/APL/26-27/00001"
        );
    }

    #[tokio::test]
    async fn test_preview_is_side_effect_free() {
        let formatter = formatter();
        let date = jan_15_2026();

        // Before anything is issued, preview shows the first number.
        let preview = formatter
            .preview_next(DocumentType::PurchaseOrder, "APL", date)
            .await
            .unwrap();
        assert_eq!(preview, "PO/APL/25-26/00001");

        // Previewing did not consume the number.
        let issued = formatter
            .issue(DocumentType::PurchaseOrder, "APL", date)
            .await
            .unwrap();
        assert_eq!(issued, "PO/APL/25-26/00001");

        let preview = formatter
            .preview_next(DocumentType::PurchaseOrder, "APL", date)
            .await
            .unwrap();
        assert_eq!(preview, "PO/APL/25-26/00002");
    }

    #[tokio::test]
    async fn test_bad_company_code_is_rejected() {
        let formatter = formatter();
        let err = formatter
            .issue(DocumentType::PurchaseOrder, "apl", jan_15_2026())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }
}
