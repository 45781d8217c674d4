//! # Invoice Numbers
//!
//! Daily-sequence invoice numbers in the format `INV{seq}-{yyyymmdd}`.
//!
//! The sequence restarts every calendar day; the storage layer supplies
//! `seq = (orders created today) + 1` while holding the order-creation
//! transaction, so same-day numbers are strictly increasing and share the
//! date suffix.

use chrono::NaiveDate;

/// Formats an invoice number for the given daily sequence and date.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use tillpoint_core::invoice::invoice_number;
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// assert_eq!(invoice_number(3, date), "INV3-20240601");
/// ```
pub fn invoice_number(daily_seq: i64, date: NaiveDate) -> String {
    format!("INV{}-{}", daily_seq, date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format() {
        assert_eq!(invoice_number(1, date(2024, 6, 1)), "INV1-20240601");
        assert_eq!(invoice_number(3, date(2024, 6, 1)), "INV3-20240601");
        assert_eq!(invoice_number(120, date(2024, 12, 31)), "INV120-20241231");
    }

    #[test]
    fn test_zero_padded_date() {
        assert_eq!(invoice_number(1, date(2025, 1, 5)), "INV1-20250105");
    }

    #[test]
    fn test_same_day_sequences_share_suffix() {
        let d = date(2024, 6, 1);
        let first = invoice_number(1, d);
        let second = invoice_number(2, d);
        assert_eq!(first.split('-').nth(1), second.split('-').nth(1));
        assert_ne!(first, second);
    }
}
