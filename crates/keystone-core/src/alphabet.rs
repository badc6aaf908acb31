//! # Code Alphabet
//!
//! Bidirectional letter ⇄ integer mappers for the year and month fields of
//! a barcode.
//!
//! ## The Year Alphabet
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Year Code Mapping (base 2000)                       │
//! │                                                                         │
//! │   offset 0..=25   →  single letter:  2000→"A", 2001→"B", ... 2025→"Z"  │
//! │   offset 26..     →  two letters:    2026→"AA", 2027→"AB", ...         │
//! │                      high = 'A' + (offset-26)/26                        │
//! │                      low  = 'A' + (offset-26)%26                        │
//! │                                                                         │
//! │   Inverse: one letter  → 2000 + v                                       │
//! │            two letters → 2000 + 26 + high*26 + low                      │
//! │                                                                         │
//! │   Capacity ends at "ZZ" (year 2701).                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Month Alphabet
//! Months 1..=12 map onto `"ABCDEFGHIJKL"`; anything outside errors.

use crate::error::CodecError;
use crate::BASE_YEAR;

/// Month letters, indexed by `month - 1`.
const MONTH_ALPHABET: &[u8; 12] = b"ABCDEFGHIJKL";

/// Last year expressible by the two-letter scheme: 2000 + 26 + 25*26 + 25.
const MAX_YEAR: i32 = BASE_YEAR + 26 + 25 * 26 + 25;

/// Encodes a calendar year as its alphabet code.
///
/// ## Example
/// ```rust
/// use keystone_core::alphabet::year_code;
///
/// assert_eq!(year_code(2000).unwrap(), "A");
/// assert_eq!(year_code(2025).unwrap(), "Z");
/// assert_eq!(year_code(2026).unwrap(), "AA");
/// assert_eq!(year_code(2052).unwrap(), "BA");
/// ```
pub fn year_code(year: i32) -> Result<String, CodecError> {
    if year < BASE_YEAR {
        return Err(CodecError::YearBeforeBase {
            year,
            base: BASE_YEAR,
        });
    }
    if year > MAX_YEAR {
        return Err(CodecError::YearPastAlphabet { year });
    }
    let offset = (year - BASE_YEAR) as u32;
    if offset <= 25 {
        Ok(((b'A' + offset as u8) as char).to_string())
    } else {
        let high = (offset - 26) / 26;
        let low = (offset - 26) % 26;
        Ok(format!(
            "{}{}",
            (b'A' + high as u8) as char,
            (b'A' + low as u8) as char
        ))
    }
}

/// Decodes a year code back to the calendar year. Inverse of [`year_code`].
pub fn year_from_code(code: &str) -> Result<i32, CodecError> {
    let invalid = || CodecError::InvalidYearCode {
        found: code.to_string(),
    };
    let bytes = code.as_bytes();
    match bytes {
        [c] if c.is_ascii_uppercase() => Ok(BASE_YEAR + (c - b'A') as i32),
        [hi, lo] if hi.is_ascii_uppercase() && lo.is_ascii_uppercase() => {
            Ok(BASE_YEAR + 26 + (hi - b'A') as i32 * 26 + (lo - b'A') as i32)
        }
        _ => Err(invalid()),
    }
}

/// Encodes a month (1..=12) as its letter.
///
/// ## Example
/// ```rust
/// use keystone_core::alphabet::month_code;
///
/// assert_eq!(month_code(1).unwrap(), 'A');
/// assert_eq!(month_code(12).unwrap(), 'L');
/// assert!(month_code(13).is_err());
/// ```
pub fn month_code(month: u32) -> Result<char, CodecError> {
    if (1..=12).contains(&month) {
        Ok(MONTH_ALPHABET[(month - 1) as usize] as char)
    } else {
        Err(CodecError::InvalidMonth { month })
    }
}

/// Decodes a month letter back to 1..=12. Inverse of [`month_code`].
pub fn month_from_code(code: char) -> Result<u32, CodecError> {
    MONTH_ALPHABET
        .iter()
        .position(|&c| c as char == code)
        .map(|i| i as u32 + 1)
        .ok_or(CodecError::InvalidMonthCode { found: code })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_letter_years() {
        assert_eq!(year_code(2000).unwrap(), "A");
        assert_eq!(year_code(2001).unwrap(), "B");
        assert_eq!(year_code(2025).unwrap(), "Z");
    }

    #[test]
    fn test_two_letter_years() {
        assert_eq!(year_code(2026).unwrap(), "AA");
        assert_eq!(year_code(2027).unwrap(), "AB");
        assert_eq!(year_code(2051).unwrap(), "AZ");
        assert_eq!(year_code(2052).unwrap(), "BA");
    }

    #[test]
    fn test_year_round_trip_over_full_range() {
        for year in BASE_YEAR..=MAX_YEAR {
            let code = year_code(year).unwrap();
            assert_eq!(year_from_code(&code).unwrap(), year, "year {year}");
        }
    }

    #[test]
    fn test_year_before_base_is_rejected() {
        assert!(matches!(
            year_code(1999),
            Err(CodecError::YearBeforeBase { year: 1999, .. })
        ));
    }

    #[test]
    fn test_year_past_alphabet_is_rejected() {
        assert!(matches!(
            year_code(MAX_YEAR + 1),
            Err(CodecError::YearPastAlphabet { .. })
        ));
    }

    #[test]
    fn test_bad_year_codes_are_rejected() {
        for bad in ["", "a", "1", "AAA", "A1"] {
            assert!(year_from_code(bad).is_err(), "expected reject: {bad:?}");
        }
    }

    #[test]
    fn test_month_codes() {
        assert_eq!(month_code(1).unwrap(), 'A');
        assert_eq!(month_code(6).unwrap(), 'F');
        assert_eq!(month_code(12).unwrap(), 'L');
        assert!(month_code(0).is_err());
        assert!(month_code(13).is_err());
    }

    #[test]
    fn test_month_round_trip() {
        for month in 1..=12 {
            let code = month_code(month).unwrap();
            assert_eq!(month_from_code(code).unwrap(), month);
        }
    }

    #[test]
    fn test_month_outside_alphabet_is_rejected() {
        assert!(matches!(
            month_from_code('M'),
            Err(CodecError::InvalidMonthCode { found: 'M' })
        ));
        assert!(month_from_code('a').is_err());
    }
}
