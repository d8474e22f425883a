//! Validation utilities for the Stock Chic platform
//!
//! Plain checks return `Result<(), &'static str>`; the `validate_*` functions
//! taking a reference and returning `ValidationError` are wired into the
//! request schemas through `#[validate(custom = "...")]`.

use std::collections::HashSet;

use rust_decimal::Decimal;
use validator::ValidationError;

// ============================================================================
// Money
// ============================================================================

/// Number of decimal places stored for prices and payments
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12,2)` column holds: 9999999999.99
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Check that an amount is non-negative, in range, with at most two decimal places
pub fn check_money(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    if amount > MAX_MONEY {
        return Err("Amount exceeds 9999999999.99");
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err("Amount must have at most 2 decimal places");
    }
    Ok(())
}

/// `validator` adapter for [`check_money`]
pub fn validate_money(amount: &Decimal) -> Result<(), ValidationError> {
    check_money(*amount).map_err(|msg| {
        let mut err = ValidationError::new("money");
        err.message = Some(msg.into());
        err
    })
}

/// Round an amount to the stored money precision
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_SCALE)
}

// ============================================================================
// Catalog
// ============================================================================

/// Check barcode format: 1-50 digits, letters or dashes
pub fn check_barcode(barcode: &str) -> Result<(), &'static str> {
    if barcode.is_empty() || barcode.len() > 50 {
        return Err("Barcode must be 1-50 characters");
    }
    if !barcode.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("Barcode may only contain letters, digits and dashes");
    }
    Ok(())
}

pub fn validate_barcode(barcode: &str) -> Result<(), ValidationError> {
    check_barcode(barcode).map_err(|msg| {
        let mut err = ValidationError::new("barcode");
        err.message = Some(msg.into());
        err
    })
}

/// An update may repeat the article's reference but never change it
pub fn check_reference_unchanged(
    current: &str,
    requested: Option<&str>,
) -> Result<(), &'static str> {
    match requested {
        Some(reference) if reference.trim() != current => {
            Err("The reference of an article cannot be changed")
        }
        _ => Ok(()),
    }
}

/// Return the first barcode that appears more than once in the input
pub fn find_duplicate_barcode<'a, I>(barcodes: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut seen = HashSet::new();
    barcodes
        .into_iter()
        .flatten()
        .find(|code| !seen.insert(*code))
}

/// Return the first size/color pair that appears more than once
pub fn find_duplicate_variant<'a, I>(variants: I) -> Option<(&'a str, &'a str)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut seen = HashSet::new();
    variants.into_iter().find(|v| !seen.insert(*v))
}

// ============================================================================
// Accounts
// ============================================================================

/// Minimum password length accepted for user accounts
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate password strength
pub fn check_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    check_password(password).map_err(|msg| {
        let mut err = ValidationError::new("password");
        err.message = Some(msg.into());
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_money_accepts_two_decimals() {
        assert!(check_money(dec("25.00")).is_ok());
        assert!(check_money(dec("0")).is_ok());
        assert!(check_money(dec("19.9")).is_ok());
    }

    #[test]
    fn test_money_trailing_zeros_are_not_precision() {
        assert!(check_money(dec("12.5000")).is_ok());
    }

    #[test]
    fn test_money_rejects_negative_and_extra_precision() {
        assert!(check_money(dec("-0.01")).is_err());
        assert!(check_money(dec("1.005")).is_err());
        assert!(validate_money(&dec("1.005")).is_err());
    }

    #[test]
    fn test_money_upper_bound_matches_column() {
        assert_eq!(MAX_MONEY, dec("9999999999.99"));
        assert!(check_money(dec("9999999999.99")).is_ok());
        assert!(check_money(dec("10000000000.00")).is_err());
        assert!(check_money(dec("99999999999999.00")).is_err());
        assert!(validate_money(&dec("10000000000")).is_err());
    }

    #[test]
    fn test_reference_is_immutable() {
        assert!(check_reference_unchanged("TSH-001", None).is_ok());
        assert!(check_reference_unchanged("TSH-001", Some("TSH-001")).is_ok());
        assert!(check_reference_unchanged("TSH-001", Some(" TSH-001 ")).is_ok());
        assert!(check_reference_unchanged("TSH-001", Some("TSH-002")).is_err());
    }

    #[test]
    fn test_barcode_format() {
        assert!(check_barcode("3760123456789").is_ok());
        assert!(check_barcode("TSH-001-M").is_ok());
        assert!(check_barcode("").is_err());
        assert!(check_barcode("12 34").is_err());
        assert!(check_barcode(&"9".repeat(51)).is_err());
    }

    #[test]
    fn test_find_duplicate_barcode() {
        let codes = [Some("111"), None, Some("222"), None, Some("111")];
        assert_eq!(find_duplicate_barcode(codes), Some("111"));

        let codes = [Some("111"), None, None];
        assert_eq!(find_duplicate_barcode(codes), None);
    }

    #[test]
    fn test_find_duplicate_variant() {
        let variants = [("M", "Blanc"), ("L", "Blanc"), ("M", "Blanc")];
        assert_eq!(find_duplicate_variant(variants), Some(("M", "Blanc")));
        assert_eq!(find_duplicate_variant([("M", "Blanc"), ("M", "Noir")]), None);
    }

    #[test]
    fn test_password_validation() {
        assert!(check_password("secret").is_ok());
        assert!(check_password("short").is_err());
    }
}
