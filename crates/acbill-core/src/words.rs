//! # Amount in Words
//!
//! Writes a rupee amount out in English words on the Indian numbering
//! scale, as printed on the invoice ("Amount Chargeable (in words)").
//!
//! ## Indian Grouping
//! ```text
//!   12,34,567.89
//!   ──┬ ──┬ ─┬─ ─┬
//!     │   │  │   └── Eighty Nine Paise
//!     │   │  └────── Five Hundred Sixty Seven
//!     │   └───────── Thirty Four Thousand
//!     └───────────── Twelve Lakh
//!
//!   → "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven
//!      Rupees Eighty Nine Paise Only"
//! ```
//!
//! Crore counts above 999 recurse on the same scale, so 10^10 rupees is
//! "One Thousand Crore".

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Scale breakpoints, largest first.
const SCALES: [(u64, &str); 3] = [
    (10_000_000, "Crore"),
    (100_000, "Lakh"),
    (1_000, "Thousand"),
];

/// Words for 1..=999. Empty for 0.
fn below_thousand(n: u64) -> String {
    let hundreds = (n / 100) as usize;
    let rest = (n % 100) as usize;

    let mut parts: Vec<&str> = Vec::with_capacity(4);
    if hundreds > 0 {
        parts.push(ONES[hundreds]);
        parts.push("Hundred");
    }
    if rest >= 20 {
        parts.push(TENS[rest / 10]);
        if rest % 10 > 0 {
            parts.push(ONES[rest % 10]);
        }
    } else if rest > 0 {
        parts.push(ONES[rest]);
    }

    parts.join(" ")
}

/// Words for any positive whole number. Empty for 0.
fn integer_words(n: u64) -> String {
    for (value, name) in SCALES {
        if n >= value {
            let head = integer_words(n / value);
            let rest = n % value;
            return if rest == 0 {
                format!("{head} {name}")
            } else {
                format!("{head} {name} {}", integer_words(rest))
            };
        }
    }
    below_thousand(n)
}

/// Writes an amount out in words.
///
/// ## Rules
/// - Zero is just `"Zero"` (no "Rupees", no "Only")
/// - Otherwise `"{rupees} Rupees"`, then `" {paise} Paise"` if there are
///   any, then `" Only"`
/// - Less than one rupee reads `"Zero Rupees Fifty Paise Only"`
///
/// ## Errors
/// [`CoreError::InvalidAmount`] for a negative amount.
///
/// ## Example
/// ```rust
/// use acbill_core::money::Money;
/// use acbill_core::words::amount_in_words;
///
/// let words = amount_in_words(Money::from_rupees(100_000)).unwrap();
/// assert_eq!(words, "One Lakh Rupees Only");
/// ```
pub fn amount_in_words(amount: Money) -> CoreResult<String> {
    if amount.is_negative() {
        return Err(CoreError::InvalidAmount {
            amount: amount.to_decimal().to_string(),
        });
    }
    if amount.is_zero() {
        return Ok("Zero".to_string());
    }

    let rupees = amount.rupees().unsigned_abs();
    let paise = amount.paise_part().unsigned_abs();

    let mut words = if rupees == 0 {
        "Zero".to_string()
    } else {
        integer_words(rupees)
    };
    words.push_str(" Rupees");
    if paise > 0 {
        words.push(' ');
        words.push_str(&below_thousand(paise));
        words.push_str(" Paise");
    }
    words.push_str(" Only");

    Ok(words)
}

/// Like [`amount_in_words`], for a decimal rupee amount.
///
/// The amount is first rounded to paise, half away from zero.
pub fn decimal_in_words(amount: Decimal) -> CoreResult<String> {
    let money = Money::from_decimal(amount).ok_or_else(|| CoreError::InvalidAmount {
        amount: amount.to_string(),
    })?;
    amount_in_words(money)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn words(rupees: i64) -> String {
        amount_in_words(Money::from_rupees(rupees)).unwrap()
    }

    #[test]
    fn test_zero() {
        assert_eq!(words(0), "Zero");
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(words(1), "One Rupees Only");
        assert_eq!(words(10), "Ten Rupees Only");
        assert_eq!(words(19), "Nineteen Rupees Only");
        assert_eq!(words(20), "Twenty Rupees Only");
        assert_eq!(words(45), "Forty Five Rupees Only");
        assert_eq!(words(999), "Nine Hundred Ninety Nine Rupees Only");
    }

    #[test]
    fn test_scale_boundaries() {
        assert_eq!(words(100), "One Hundred Rupees Only");
        assert_eq!(words(1_000), "One Thousand Rupees Only");
        assert_eq!(words(1_500), "One Thousand Five Hundred Rupees Only");
        assert_eq!(words(100_000), "One Lakh Rupees Only");
        assert_eq!(words(10_000_000), "One Crore Rupees Only");
    }

    #[test]
    fn test_crore_and_lakh_together() {
        assert_eq!(
            words(12_345_678),
            "One Crore Twenty Three Lakh Forty Five Thousand Six Hundred Seventy Eight Rupees Only"
        );
        assert_eq!(words(20_500_000), "Two Crore Five Lakh Rupees Only");
        assert_eq!(words(10_000_001), "One Crore One Rupees Only");
    }

    #[test]
    fn test_large_crore_counts_recurse() {
        assert_eq!(words(10_000_000_000), "One Thousand Crore Rupees Only");
        assert_eq!(
            words(1_250_000_000),
            "One Hundred Twenty Five Crore Rupees Only"
        );
    }

    #[test]
    fn test_with_paise() {
        let amount = Money::from_paise(123_456_789);
        assert_eq!(
            amount_in_words(amount).unwrap(),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven Rupees Eighty Nine Paise Only"
        );
        assert_eq!(
            amount_in_words(Money::from_paise(150_005)).unwrap(),
            "One Thousand Five Hundred Rupees Five Paise Only"
        );
    }

    #[test]
    fn test_paise_only() {
        assert_eq!(
            amount_in_words(Money::from_paise(50)).unwrap(),
            "Zero Rupees Fifty Paise Only"
        );
    }

    #[test]
    fn test_negative_is_rejected() {
        let err = amount_in_words(Money::from_paise(-1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
        assert_eq!(err.to_string(), "Invalid amount for words: -0.01");
    }

    #[test]
    fn test_decimal_in_words() {
        let amount = Decimal::from_str("1234567.89").unwrap();
        assert_eq!(
            decimal_in_words(amount).unwrap(),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven Rupees Eighty Nine Paise Only"
        );
        assert_eq!(decimal_in_words(Decimal::from_str("0.004").unwrap()).unwrap(), "Zero");
        assert!(decimal_in_words(Decimal::from_str("-5").unwrap()).is_err());
    }
}
