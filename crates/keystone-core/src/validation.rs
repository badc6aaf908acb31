//! # Validation Module
//!
//! Field validators shared by the barcode codec and the store services.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request handler (deserialization, basic shape)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - field alphabets and widths                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Code registry - is this supplier/model actually registered?  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database - UNIQUE barcode, FK constraints                    │
//! │                                                                         │
//! │  A barcode is vendor- and regulator-facing: a malformed field that     │
//! │  slips through here ends up printed on a physical label.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::CodecError;
use crate::MAX_SERIAL;

/// Validates a brand prefix: exactly 2 uppercase ASCII alphanumerics.
pub fn validate_brand_prefix(value: &str) -> Result<(), CodecError> {
    let ok = value.len() == 2
        && value
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(CodecError::InvalidBrandPrefix {
            found: value.to_string(),
        })
    }
}

/// Validates a supplier code: exactly 2 uppercase ASCII letters.
pub fn validate_supplier_code(value: &str) -> Result<(), CodecError> {
    if value.len() == 2 && value.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(CodecError::InvalidSupplierCode {
            found: value.to_string(),
        })
    }
}

/// Validates a model code: at least 3 uppercase ASCII letters.
///
/// Model codes are letters-only so the decoder can always find the 6-digit
/// serial segment unambiguously.
pub fn validate_model_code(value: &str) -> Result<(), CodecError> {
    if value.len() >= 3 && value.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(CodecError::InvalidModelCode {
            found: value.to_string(),
        })
    }
}

/// Validates a serial number against the 6-digit scheme: 1..=999_999.
pub fn validate_serial(serial: u64) -> Result<(), CodecError> {
    if (1..=MAX_SERIAL).contains(&serial) {
        Ok(())
    } else {
        Err(CodecError::SerialOutOfRange {
            serial,
            max: MAX_SERIAL,
        })
    }
}

/// Validates a document type code: 2..=4 uppercase ASCII letters (e.g. "PO").
pub fn validate_document_type(value: &str) -> Result<(), CodecError> {
    if (2..=4).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(CodecError::InvalidDocumentType {
            found: value.to_string(),
        })
    }
}

/// Validates a company code: 2..=4 uppercase ASCII letters (e.g. "APL").
pub fn validate_company_code(value: &str) -> Result<(), CodecError> {
    if (2..=4).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(CodecError::InvalidCompanyCode {
            found: value.to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_prefix() {
        assert!(validate_brand_prefix("AP").is_ok());
        assert!(validate_brand_prefix("A1").is_ok());
        assert!(validate_brand_prefix("A").is_err());
        assert!(validate_brand_prefix("APX").is_err());
        assert!(validate_brand_prefix("ap").is_err());
    }

    #[test]
    fn test_supplier_code() {
        assert!(validate_supplier_code("FS").is_ok());
        assert!(validate_supplier_code("F1").is_err());
        assert!(validate_supplier_code("FSX").is_err());
        assert!(validate_supplier_code("").is_err());
    }

    #[test]
    fn test_model_code() {
        assert!(validate_model_code("IEL").is_ok());
        assert!(validate_model_code("IELX").is_ok());
        assert!(validate_model_code("IE").is_err());
        assert!(validate_model_code("IE1").is_err());
        assert!(validate_model_code("iel").is_err());
    }

    #[test]
    fn test_serial_bounds() {
        assert!(validate_serial(1).is_ok());
        assert!(validate_serial(999_999).is_ok());
        assert!(validate_serial(0).is_err());
        assert!(validate_serial(1_000_000).is_err());
    }

    #[test]
    fn test_document_and_company_codes() {
        assert!(validate_document_type("PO").is_ok());
        assert!(validate_document_type("GRN").is_ok());
        assert!(validate_document_type("P").is_err());
        assert!(validate_document_type("po").is_err());

        assert!(validate_company_code("APL").is_ok());
        assert!(validate_company_code("A").is_err());
    }
}
