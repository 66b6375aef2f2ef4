//! Transaction reference formatting: `TXN-YYYYMMDD-NNNNNN`.
//!
//! The sequence number comes from the store's `reference_sequence` counter,
//! claimed inside the same write transaction as the insert — never from
//! `max(id) + 1`, which two concurrent writers could both read. The
//! UNIQUE constraint on `transactions.reference` backstops the counter.

use chrono::NaiveDate;

/// Format a reference for the given generation date and sequence number.
/// The sequence is zero-padded to `pad` digits and widens past that.
pub fn transaction_reference(prefix: &str, date: NaiveDate, sequence: i64, pad: usize) -> String {
    format!(
        "{prefix}-{}-{sequence:0width$}",
        date.format("%Y%m%d"),
        width = pad
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_date_and_padded_sequence() {
        assert_eq!(
            transaction_reference("TXN", date(2026, 8, 8), 1, 6),
            "TXN-20260808-000001"
        );
        assert_eq!(
            transaction_reference("TXN", date(2026, 1, 3), 4217, 6),
            "TXN-20260103-004217"
        );
    }

    #[test]
    fn sequence_widens_past_the_pad() {
        assert_eq!(
            transaction_reference("TXN", date(2026, 8, 8), 12_345_678, 6),
            "TXN-20260808-12345678"
        );
    }

    #[test]
    fn prefix_is_configurable() {
        assert_eq!(
            transaction_reference("RCPT", date(2026, 8, 8), 9, 4),
            "RCPT-20260808-0009"
        );
    }
}
