//! Sale numbering: `VTE-{year}-{sequence:06}`
//!
//! The sequence itself comes from the store (a PostgreSQL sequence in
//! production); this module owns the display format.

use std::sync::atomic::{AtomicI64, Ordering};

pub const SALE_NUMBER_PREFIX: &str = "VTE";

/// Minimum width of the zero-padded sequence part
pub const SEQUENCE_WIDTH: usize = 6;

/// Format a sale number, e.g. `VTE-2024-000007`
///
/// Sequences wider than six digits are printed in full rather than truncated.
pub fn format_sale_number(year: i32, sequence: i64) -> String {
    format!(
        "{}-{:04}-{:0width$}",
        SALE_NUMBER_PREFIX,
        year,
        sequence,
        width = SEQUENCE_WIDTH
    )
}

/// Split a sale number back into its year and sequence
pub fn parse_sale_number(value: &str) -> Option<(i32, i64)> {
    let mut parts = value.splitn(3, '-');
    if parts.next()? != SALE_NUMBER_PREFIX {
        return None;
    }
    let year = parts.next()?;
    let sequence = parts.next()?;
    if year.len() != 4 || sequence.len() < SEQUENCE_WIDTH {
        return None;
    }
    if !year.chars().chain(sequence.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((year.parse().ok()?, sequence.parse().ok()?))
}

/// Process-local sequence, for stores that do not persist one
#[derive(Debug)]
pub struct SequenceCounter {
    last: AtomicI64,
}

impl SequenceCounter {
    /// Start after `last`; pass the highest sequence already in the ledger
    pub fn starting_after(last: i64) -> Self {
        Self {
            last: AtomicI64::new(last),
        }
    }

    pub fn next(&self) -> i64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::starting_after(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sale_number() {
        assert_eq!(format_sale_number(2024, 7), "VTE-2024-000007");
        assert_eq!(format_sale_number(2025, 123456), "VTE-2025-123456");
        assert_eq!(format_sale_number(2025, 1234567), "VTE-2025-1234567");
    }

    #[test]
    fn test_parse_sale_number() {
        assert_eq!(parse_sale_number("VTE-2024-000007"), Some((2024, 7)));
        assert_eq!(parse_sale_number("VTE-2025-1234567"), Some((2025, 1234567)));
        assert_eq!(parse_sale_number("FAC-2024-000007"), None);
        assert_eq!(parse_sale_number("VTE-24-000007"), None);
        assert_eq!(parse_sale_number("VTE-2024-7"), None);
        assert_eq!(parse_sale_number("VTE-2024-00000x"), None);
    }

    #[test]
    fn test_counter_strictly_increasing() {
        let counter = SequenceCounter::starting_after(41);
        assert_eq!(counter.next(), 42);
        assert_eq!(counter.next(), 43);
    }

    #[test]
    fn test_numbers_order_across_year_change() {
        let counter = SequenceCounter::default();
        let a = counter.next();
        let b = counter.next();
        assert!(b > a);
        let first = format_sale_number(2024, a);
        let second = format_sale_number(2025, b);
        assert_ne!(first, second);
    }
}
