//! # Financial Year Calendar
//!
//! Maps calendar dates to fiscal-year labels.
//!
//! ## The Fiscal Year
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 April-Start Financial Year                              │
//! │                                                                         │
//! │   Jan  Feb  Mar │ Apr  May  Jun  Jul  Aug  Sep  Oct  Nov  Dec │ Jan ... │
//! │  ───────────────┼──────────────────────────────────────────────┼─────── │
//! │    FY "24-25"   │              FY "25-26"                      │ "25-26" │
//! │                 ▲                                                        │
//! │            1 April 2025                                                  │
//! │                                                                         │
//! │  Document numbers are sequenced per (type, FY) so that each fiscal     │
//! │  year restarts its audit-facing sequence at 00001.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate};

/// Returns the financial-year label ("YY-YY+1") for a date.
///
/// Pure and total: every valid date maps to exactly one label.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use keystone_core::calendar::financial_year_label;
///
/// // January 2026 falls in the FY that began 1 April 2025
/// let d = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// assert_eq!(financial_year_label(d), "25-26");
///
/// // 1 April opens the new FY
/// let d = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
/// assert_eq!(financial_year_label(d), "26-27");
/// ```
pub fn financial_year_label(date: NaiveDate) -> String {
    let year = date.year();
    let (start, end) = if date.month() >= 4 {
        (year, year + 1)
    } else {
        (year - 1, year)
    };
    format!("{:02}-{:02}", start.rem_euclid(100), end.rem_euclid(100))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_before_april_belongs_to_previous_fy() {
        assert_eq!(financial_year_label(d(2026, 1, 15)), "25-26");
        assert_eq!(financial_year_label(d(2026, 3, 31)), "25-26");
    }

    #[test]
    fn test_april_onward_opens_new_fy() {
        assert_eq!(financial_year_label(d(2025, 4, 1)), "25-26");
        assert_eq!(financial_year_label(d(2025, 12, 31)), "25-26");
    }

    #[test]
    fn test_century_wrap_is_zero_padded() {
        assert_eq!(financial_year_label(d(2099, 6, 1)), "99-00");
        assert_eq!(financial_year_label(d(2100, 1, 1)), "99-00");
        assert_eq!(financial_year_label(d(2100, 5, 1)), "00-01");
    }

    #[test]
    fn test_single_digit_years_are_padded() {
        assert_eq!(financial_year_label(d(2005, 7, 1)), "05-06");
        assert_eq!(financial_year_label(d(2009, 2, 1)), "08-09");
    }
}
