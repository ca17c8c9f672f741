//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing line items as binary floats:                                   │
//! │    500.00 + 750.25 + 250.15 = 1500.3999999999999  ❌ WRONG!             │
//! │                                                                         │
//! │  A rounding rule that compares the fraction against 0.50 gives         │
//! │  different answers depending on that last bit of noise.                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    50000 + 75025 + 25015 = 150040 paise, exactly ₹1,500.40              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimals coming from forms are converted once, at the boundary, with
//! [`Money::from_decimal`]. Everything after that is integer arithmetic.
//!
//! ## Usage
//! ```rust
//! use acbill_core::money::Money;
//!
//! let rate = Money::from_paise(75_025);           // ₹750.25
//! let total = rate + Money::from_rupees(750);     // ₹1,500.25
//! assert_eq!(total.grouped(), "1,500.25");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

/// Paise in one rupee.
pub const PAISE_PER_RUPEE: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A rupee amount held in paise (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: rounding adjustments are negative when rounding down
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as paise**: storage and the JSON API both carry integers
///
/// ## Where Money is Used
/// ```text
/// LineItem.amount ──► BillTotals.subtotal ──► rounding ──► grand_total
///                                                              │
///                              amount_in_words(grand_total) ◄──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use acbill_core::money::Money;
    ///
    /// let rate = Money::from_paise(150_040); // ₹1,500.40
    /// assert_eq!(rate.paise(), 150_040);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * PAISE_PER_RUPEE)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the rupee part carries the sign:
    /// `from_rupees_paise(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_rupees_paise(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * PAISE_PER_RUPEE - paise)
        } else {
            Money(rupees * PAISE_PER_RUPEE + paise)
        }
    }

    /// Converts a decimal rupee amount to Money.
    ///
    /// Rounds to 2 decimal places with conventional half-away-from-zero
    /// rounding (`0.005` becomes `0.01`). Returns `None` when the value does
    /// not fit in an i64 of paise.
    ///
    /// ## Example
    /// ```rust
    /// use acbill_core::money::Money;
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    ///
    /// let amount = Money::from_decimal(Decimal::from_str("1234567.885").unwrap()).unwrap();
    /// assert_eq!(amount.paise(), 123_456_789);
    /// ```
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded
            .checked_mul(Decimal::from(PAISE_PER_RUPEE))
            .and_then(|paise| paise.to_i64())
            .map(Money)
    }

    /// Addition that reports overflow instead of wrapping.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Subtraction that reports overflow instead of wrapping.
    #[inline]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Sums `amounts`, or `None` if the total leaves the i64 range.
    ///
    /// ```rust
    /// use acbill_core::money::Money;
    ///
    /// let parts = [Money::from_paise(50_000), Money::from_paise(75_025)];
    /// assert_eq!(Money::checked_sum(parts).unwrap().paise(), 125_025);
    /// assert!(Money::checked_sum([Money::from_paise(i64::MAX), Money::from_paise(1)]).is_none());
    /// ```
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Returns the amount as a decimal number of rupees (2 decimal places).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the rupee portion, truncated toward zero.
    ///
    /// ```rust
    /// use acbill_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(150_040).rupees(), 1500);
    /// assert_eq!(Money::from_paise(-550).rupees(), -5);
    /// ```
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / PAISE_PER_RUPEE
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % PAISE_PER_RUPEE).abs()
    }

    /// Returns `self - floor(self)` in paise (always 0-99).
    ///
    /// Unlike [`Money::paise_part`] this follows the floor, so -₹0.40 has a
    /// fraction of 60 paise.
    #[inline]
    pub const fn fraction_paise(&self) -> i64 {
        self.0.rem_euclid(PAISE_PER_RUPEE)
    }

    /// Largest whole-rupee amount not greater than `self`.
    #[inline]
    pub const fn floor_rupee(&self) -> Self {
        Money(self.0 - self.fraction_paise())
    }

    /// Smallest whole-rupee amount not less than `self`.
    #[inline]
    pub const fn ceil_rupee(&self) -> Self {
        let fraction = self.fraction_paise();
        if fraction == 0 {
            *self
        } else {
            Money(self.0 - fraction + PAISE_PER_RUPEE)
        }
    }

    /// Whether the amount is a whole number of rupees.
    #[inline]
    pub const fn is_whole_rupees(&self) -> bool {
        self.fraction_paise() == 0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Formats the amount with Indian digit grouping and two decimals.
    ///
    /// Matches the `en-IN` locale used on printed invoices: the last three
    /// digits form one group, every group before it has two digits.
    ///
    /// ## Example
    /// ```rust
    /// use acbill_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(123_456_789).grouped(), "12,34,567.89");
    /// assert_eq!(Money::from_paise(-40).grouped(), "-0.40");
    /// ```
    pub fn grouped(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let rupees = (self.0 / PAISE_PER_RUPEE).unsigned_abs();
        format!("{}{}.{:02}", sign, group_indian(rupees), self.paise_part())
    }
}

/// Inserts `en-IN` thousands separators into a whole number.
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with the rupee sign, e.g. `₹1,500.40`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}", sign, self.abs().grouped())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}


// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(150_040);
        assert_eq!(money.paise(), 150_040);
        assert_eq!(money.rupees(), 1500);
        assert_eq!(money.paise_part(), 40);
    }

    #[test]
    fn test_from_rupees_paise() {
        assert_eq!(Money::from_rupees_paise(10, 99).paise(), 1099);
        assert_eq!(Money::from_rupees_paise(-5, 50).paise(), -550);
        assert_eq!(Money::from_rupees(1500).paise(), 150_000);
    }

    #[test]
    fn test_from_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec("750.25")).unwrap().paise(), 75_025);
        assert_eq!(Money::from_decimal(dec("0.005")).unwrap().paise(), 1);
        assert_eq!(Money::from_decimal(dec("0.004")).unwrap().paise(), 0);
        assert_eq!(Money::from_decimal(dec("-0.005")).unwrap().paise(), -1);
        assert_eq!(Money::from_decimal(dec("12")).unwrap().paise(), 1200);
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Money::from_paise(150_040).to_decimal(), dec("1500.40"));
        assert_eq!(Money::from_paise(-40).to_decimal(), dec("-0.40"));
    }

    #[test]
    fn test_decimal_sum_is_exact() {
        let total = Money::checked_sum(
            ["500.00", "750.25", "250.15"]
                .iter()
                .map(|s| Money::from_decimal(dec(s)).unwrap()),
        )
        .unwrap();
        assert_eq!(total.paise(), 150_040);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let big = Money::from_paise(5_000_000_000_000_000_000);
        assert_eq!(big.checked_add(big), None);
        assert_eq!(Money::checked_sum([big, big]), None);
        assert_eq!(Money::from_paise(i64::MIN).checked_sub(Money::from_paise(1)), None);
        assert_eq!(
            Money::from_paise(100).checked_sub(Money::from_paise(40)),
            Some(Money::from_paise(60))
        );
    }

    #[test]
    fn test_from_decimal_out_of_range() {
        assert_eq!(Money::from_decimal(dec("100000000000000000")), None);
    }

    #[test]
    fn test_floor_and_ceil() {
        let m = Money::from_paise(150_060);
        assert_eq!(m.fraction_paise(), 60);
        assert_eq!(m.floor_rupee().paise(), 150_000);
        assert_eq!(m.ceil_rupee().paise(), 150_100);

        let whole = Money::from_rupees(42);
        assert!(whole.is_whole_rupees());
        assert_eq!(whole.ceil_rupee(), whole);

        let negative = Money::from_paise(-40);
        assert_eq!(negative.fraction_paise(), 60);
        assert_eq!(negative.floor_rupee().paise(), -100);
        assert_eq!(negative.ceil_rupee().paise(), 0);
    }

    #[test]
    fn test_grouped() {
        assert_eq!(Money::from_paise(0).grouped(), "0.00");
        assert_eq!(Money::from_paise(99_900).grouped(), "999.00");
        assert_eq!(Money::from_paise(150_040).grouped(), "1,500.40");
        assert_eq!(Money::from_rupees(100_000).grouped(), "1,00,000.00");
        assert_eq!(Money::from_rupees(10_000_000).grouped(), "1,00,00,000.00");
        assert_eq!(Money::from_paise(123_456_789).grouped(), "12,34,567.89");
        assert_eq!(Money::from_paise(-150_040).grouped(), "-1,500.40");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(150_040)), "₹1,500.40");
        assert_eq!(format!("{}", Money::from_paise(-40)), "-₹0.40");
        assert_eq!(format!("{}", Money::zero()), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((-a).paise(), -1000);
        assert_eq!((a * 3).paise(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_paise(250);
        assert_eq!(c.paise(), 1250);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_paise(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().paise(), 100);
    }
}
