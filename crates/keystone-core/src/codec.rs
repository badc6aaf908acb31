//! # Barcode Codec
//!
//! Encodes one physical unit's identity into a fixed-alphabet, scannable
//! string and inverts it exactly.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Barcode Layout                                     │
//! │                                                                         │
//! │   A P  F S  A A  A  I E L  0 0 0 0 0 1                                  │
//! │   ────  ───  ───  ─  ─────  ───────────                                 │
//! │   brand sup  year mo model  serial                                      │
//! │   (2)   (2)  (2)  (1) (≥3)  (6 digits)                                  │
//! │                                                                         │
//! │   Year field is ALWAYS 2 characters:                                    │
//! │     2000..=2025  →  '0' + single alphabet letter   ("0A".."0Z")         │
//! │     2026..       →  two alphabet letters           ("AA", "AB", ...)    │
//! │                                                                         │
//! │   Serial is the trailing 6 digits; model is letters-only, so the       │
//! │   boundary between model and serial is always unambiguous.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why the '0' pad?
//! The historical scheme emitted a 1- or 2-letter year field and guessed its
//! width from the following character, which collides with model-code
//! letters. The pad character '0' cannot appear in any letter field, so the
//! decoder can classify the year field from its first character alone.
//! 15-character inputs are still accepted as the legacy form (1-letter year,
//! exactly-3-letter model), which is the only legacy shape that parses
//! unambiguously. Longer legacy strings must be re-minted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::alphabet::{month_code, month_from_code, year_code, year_from_code};
use crate::error::CodecError;
use crate::validation::{
    validate_brand_prefix, validate_model_code, validate_serial, validate_supplier_code,
};
use crate::SERIAL_WIDTH;

/// Shortest decodable barcode: the legacy 15-character form.
pub const MIN_BARCODE_LEN: usize = 15;

/// Shortest barcode the current encoder produces (2-char year field).
pub const MIN_ENCODED_LEN: usize = 16;

/// Character that marks a padded single-letter year field.
const YEAR_PAD: u8 = b'0';

// =============================================================================
// Identifier Fields
// =============================================================================

/// The decomposed semantic payload of one barcode.
///
/// One `IdentifierFields` value corresponds to exactly one barcode string
/// and vice versa (bijective under [`BarcodeCodec`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IdentifierFields {
    /// Brand prefix, 2 uppercase alphanumerics (e.g. "AP").
    pub brand_prefix: String,

    /// Registered supplier code, 2 uppercase letters.
    pub supplier_code: String,

    /// Calendar year of issuance (2000..).
    pub year: i32,

    /// Calendar month of issuance, 1..=12.
    pub month: u32,

    /// Registered model code, at least 3 uppercase letters.
    pub model_code: String,

    /// Serial within the (model, supplier, year, month) scope, 1..=999_999.
    pub serial: u32,
}

impl IdentifierFields {
    /// Builds a validated field set.
    ///
    /// Every field is checked against its alphabet and width; the year is
    /// checked against the year-code alphabet range.
    pub fn new(
        brand_prefix: &str,
        supplier_code: &str,
        year: i32,
        month: u32,
        model_code: &str,
        serial: u32,
    ) -> Result<Self, CodecError> {
        validate_brand_prefix(brand_prefix)?;
        validate_supplier_code(supplier_code)?;
        year_code(year)?;
        month_code(month)?;
        validate_model_code(model_code)?;
        validate_serial(serial as u64)?;
        Ok(IdentifierFields {
            brand_prefix: brand_prefix.to_string(),
            supplier_code: supplier_code.to_string(),
            year,
            month,
            model_code: model_code.to_string(),
            serial,
        })
    }
}

// =============================================================================
// Barcode Codec
// =============================================================================

/// Stateless encoder/decoder for unit barcodes.
pub struct BarcodeCodec;

impl BarcodeCodec {
    /// Encodes a validated field set into its barcode string.
    ///
    /// ## Example
    /// ```rust
    /// use keystone_core::codec::{BarcodeCodec, IdentifierFields};
    ///
    /// let f = IdentifierFields::new("AP", "FS", 2026, 1, "IEL", 1).unwrap();
    /// assert_eq!(BarcodeCodec::encode(&f).unwrap(), "APFSAAAIEL000001");
    /// ```
    pub fn encode(fields: &IdentifierFields) -> Result<String, CodecError> {
        // Inputs may have been constructed directly (e.g. deserialized), so
        // validate here as well: a bad field must never reach a printer.
        validate_brand_prefix(&fields.brand_prefix)?;
        validate_supplier_code(&fields.supplier_code)?;
        validate_model_code(&fields.model_code)?;
        validate_serial(fields.serial as u64)?;

        let year = year_code(fields.year)?;
        let year_field = if year.len() == 1 {
            format!("{}{}", YEAR_PAD as char, year)
        } else {
            year
        };
        let month = month_code(fields.month)?;

        Ok(format!(
            "{}{}{}{}{}{:0width$}",
            fields.brand_prefix,
            fields.supplier_code,
            year_field,
            month,
            fields.model_code,
            fields.serial,
            width = SERIAL_WIDTH,
        ))
    }

    /// Decodes a barcode string back into its fields. Exact inverse of
    /// [`encode`](Self::encode); also accepts the legacy 15-character form.
    pub fn decode(barcode: &str) -> Result<IdentifierFields, CodecError> {
        if !barcode.is_ascii() {
            return Err(CodecError::NotAscii);
        }
        let len = barcode.len();
        if len < MIN_BARCODE_LEN {
            return Err(CodecError::TooShort {
                len,
                min: MIN_BARCODE_LEN,
            });
        }

        // Serial is always the trailing 6 characters and must be all digits.
        let (head, serial_seg) = barcode.split_at(len - SERIAL_WIDTH);
        if !serial_seg.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::InvalidSerialSegment {
                found: serial_seg.to_string(),
            });
        }
        // 6 digits always fit in u32
        let serial: u32 = serial_seg
            .parse()
            .map_err(|_| CodecError::InvalidSerialSegment {
                found: serial_seg.to_string(),
            })?;
        validate_serial(serial as u64)?;

        let brand_prefix = &head[0..2];
        let supplier_code = &head[2..4];

        // Legacy form: 15 total chars forces a 1-letter year and a 3-letter
        // model, the one legacy shape with no width ambiguity.
        let (year, month_char, model_code) = if len == MIN_BARCODE_LEN {
            let year = year_from_code(&head[4..5])?;
            (year, head.as_bytes()[5] as char, &head[6..])
        } else {
            let year_field = &head[4..6];
            let year = if year_field.as_bytes()[0] == YEAR_PAD {
                year_from_code(&year_field[1..2])?
            } else {
                year_from_code(year_field)?
            };
            (year, head.as_bytes()[6] as char, &head[7..])
        };

        let month = month_from_code(month_char)?;
        validate_brand_prefix(brand_prefix)?;
        validate_supplier_code(supplier_code)?;
        validate_model_code(model_code)?;

        Ok(IdentifierFields {
            brand_prefix: brand_prefix.to_string(),
            supplier_code: supplier_code.to_string(),
            year,
            month,
            model_code: model_code.to_string(),
            serial,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(year: i32, month: u32, model: &str, serial: u32) -> IdentifierFields {
        IdentifierFields::new("AP", "FS", year, month, model, serial).unwrap()
    }

    #[test]
    fn test_encode_two_letter_year() {
        // 2026 is the first two-letter year: "AA"; January is "A"
        let f = fields(2026, 1, "IEL", 1);
        assert_eq!(BarcodeCodec::encode(&f).unwrap(), "APFSAAAIEL000001");
    }

    #[test]
    fn test_encode_pads_single_letter_year() {
        // 2020 → offset 20 → 'U', padded to "0U"
        let f = fields(2020, 5, "IEL", 42);
        assert_eq!(BarcodeCodec::encode(&f).unwrap(), "APFS0UEIEL000042");
    }

    #[test]
    fn test_decode_inverts_encode_exactly() {
        let f = fields(2026, 1, "IEL", 1);
        let decoded = BarcodeCodec::decode("APFSAAAIEL000001").unwrap();
        assert_eq!(decoded, f);
    }

    #[test]
    fn test_round_trip_across_field_space() {
        for year in [2000, 2003, 2025, 2026, 2040, 2080] {
            for month in [1, 6, 12] {
                for model in ["IEL", "XKQ", "LONGMODEL"] {
                    for serial in [1, 7, 999, 999_999] {
                        let f = fields(year, month, model, serial);
                        let barcode = BarcodeCodec::encode(&f).unwrap();
                        let back = BarcodeCodec::decode(&barcode).unwrap();
                        assert_eq!(back, f, "barcode {barcode}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_long_model_codes_decode_unambiguously() {
        let f = fields(2026, 3, "IELPROMAX", 123);
        let barcode = BarcodeCodec::encode(&f).unwrap();
        assert_eq!(barcode.len(), 16 + 6); // 3-letter base + 6 extra letters
        assert_eq!(BarcodeCodec::decode(&barcode).unwrap(), f);
    }

    #[test]
    fn test_legacy_fifteen_char_form_decodes() {
        // Pre-redesign emission: year 2000 is a bare 'A', model exactly 3.
        let decoded = BarcodeCodec::decode("APFSAAIEL000001").unwrap();
        assert_eq!(decoded.year, 2000);
        assert_eq!(decoded.month, 1);
        assert_eq!(decoded.model_code, "IEL");
        assert_eq!(decoded.serial, 1);
    }

    #[test]
    fn test_too_short_is_rejected() {
        assert!(matches!(
            BarcodeCodec::decode("APFSAA000001"),
            Err(CodecError::TooShort { .. })
        ));
    }

    #[test]
    fn test_non_digit_serial_is_rejected() {
        assert!(matches!(
            BarcodeCodec::decode("APFSAAAIEL00O001"),
            Err(CodecError::InvalidSerialSegment { .. })
        ));
    }

    #[test]
    fn test_zero_serial_is_rejected() {
        assert!(matches!(
            BarcodeCodec::decode("APFSAAAIEL000000"),
            Err(CodecError::SerialOutOfRange { serial: 0, .. })
        ));
    }

    #[test]
    fn test_bad_month_letter_is_rejected() {
        // 'M' is outside the 12-letter month alphabet
        assert!(matches!(
            BarcodeCodec::decode("APFSAAMIEL000001"),
            Err(CodecError::InvalidMonthCode { found: 'M' })
        ));
    }

    #[test]
    fn test_lowercase_model_is_rejected() {
        assert!(matches!(
            BarcodeCodec::decode("APFSAAAiel000001"),
            Err(CodecError::InvalidModelCode { .. })
        ));
    }

    #[test]
    fn test_non_ascii_is_rejected() {
        assert!(matches!(
            BarcodeCodec::decode("ÄPFSAAAIEL000001"),
            Err(CodecError::NotAscii)
        ));
    }

    #[test]
    fn test_fields_constructor_validates() {
        assert!(IdentifierFields::new("AP", "FS", 1999, 1, "IEL", 1).is_err());
        assert!(IdentifierFields::new("AP", "FS", 2026, 13, "IEL", 1).is_err());
        assert!(IdentifierFields::new("AP", "F5", 2026, 1, "IEL", 1).is_err());
        assert!(IdentifierFields::new("AP", "FS", 2026, 1, "IE", 1).is_err());
        assert!(IdentifierFields::new("AP", "FS", 2026, 1, "IEL", 0).is_err());
    }
}
