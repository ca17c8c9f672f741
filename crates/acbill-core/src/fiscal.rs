//! # Fiscal Years & Invoice Numbers
//!
//! Invoice numbers are scoped to the Indian fiscal year (April 1 to
//! March 31) and increase monotonically within it.
//!
//! ## Number Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Invoice Number Anatomy                              │
//! │                                                                         │
//! │        2025-26 / 014                                                    │
//! │        ───┬───   ─┬─                                                    │
//! │           │       └── sequence, zero-padded to at least 3 digits        │
//! │           │           (1000 prints as "1000", never truncated)          │
//! │           └────────── fiscal year: start year, end year mod 100         │
//! │                                                                         │
//! │  Date            Fiscal year                                            │
//! │  2025-04-01  ──► 2025-26   (April starts a new year)                    │
//! │  2026-02-14  ──► 2025-26   (Jan-Mar belong to the previous start year)  │
//! │  2026-04-01  ──► 2026-27                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sequencing
//! [`next_invoice_number`] scans prior numbers for the target fiscal year
//! and returns `max + 1`. It is read-then-write over shared history, so the
//! caller must serialize assignment per fiscal year. `acbill-db` does this
//! with a counter row updated inside the bill-creating transaction and only
//! uses this scan to seed that counter.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Month (1-based) on which an Indian fiscal year begins.
pub const FISCAL_YEAR_START_MONTH: u32 = 4;

/// Minimum width of the sequence part of an invoice number.
pub const SEQUENCE_MIN_WIDTH: usize = 3;

// =============================================================================
// Fiscal Year
// =============================================================================

/// An Indian fiscal year, identified by the calendar year it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    /// The fiscal year starting on April 1 of `start_year`.
    #[inline]
    pub const fn starting(start_year: i32) -> Self {
        FiscalYear { start_year }
    }

    /// The fiscal year a date falls in.
    ///
    /// ## Example
    /// ```rust
    /// use acbill_core::fiscal::FiscalYear;
    /// use chrono::NaiveDate;
    ///
    /// let feb = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
    /// assert_eq!(FiscalYear::containing(feb).to_string(), "2025-26");
    /// ```
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= FISCAL_YEAR_START_MONTH {
            FiscalYear::starting(date.year())
        } else {
            FiscalYear::starting(date.year() - 1)
        }
    }

    /// Calendar year in which this fiscal year starts.
    #[inline]
    pub const fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Calendar year in which this fiscal year ends.
    #[inline]
    pub const fn end_year(&self) -> i32 {
        self.start_year + 1
    }

    /// The following fiscal year.
    #[inline]
    pub const fn next(&self) -> Self {
        FiscalYear::starting(self.start_year + 1)
    }

    /// Whether `date` falls within this fiscal year.
    pub fn contains(&self, date: NaiveDate) -> bool {
        FiscalYear::containing(date) == *self
    }

    /// Parses the `"YYYY-YY"` key form.
    ///
    /// The suffix must be the end year modulo 100, so `"2025-27"` is
    /// rejected.
    pub fn parse(key: &str) -> Option<Self> {
        let (start, suffix) = key.split_once('-')?;
        if start.len() != 4 || suffix.len() != 2 {
            return None;
        }
        if !start.bytes().chain(suffix.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let start_year: i32 = start.parse().ok()?;
        let suffix: i32 = suffix.parse().ok()?;
        let year = FiscalYear::starting(start_year);

        (year.end_year().rem_euclid(100) == suffix).then_some(year)
    }
}

/// The `"YYYY-YY"` namespace key, e.g. `2025-26`.
impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start_year, self.end_year().rem_euclid(100))
    }
}

// =============================================================================
// Invoice Number
// =============================================================================

/// A bill's business key: fiscal year plus sequence within that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvoiceNumber {
    fiscal_year: FiscalYear,
    sequence: u32,
}

impl InvoiceNumber {
    /// Creates an invoice number from its parts.
    #[inline]
    pub const fn new(fiscal_year: FiscalYear, sequence: u32) -> Self {
        InvoiceNumber {
            fiscal_year,
            sequence,
        }
    }

    /// The first number of a fiscal year (`…/001`).
    #[inline]
    pub const fn first(fiscal_year: FiscalYear) -> Self {
        InvoiceNumber::new(fiscal_year, 1)
    }

    #[inline]
    pub const fn fiscal_year(&self) -> FiscalYear {
        self.fiscal_year
    }

    #[inline]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The number after this one in the same fiscal year.
    #[inline]
    pub const fn successor(&self) -> Self {
        InvoiceNumber::new(self.fiscal_year, self.sequence.saturating_add(1))
    }

    /// Parses a stored invoice number.
    ///
    /// Returns `None` for anything not shaped `YYYY-YY/<integer>`:
    /// history records that fail here are skipped when sequencing, never
    /// treated as errors.
    ///
    /// ## Example
    /// ```rust
    /// use acbill_core::fiscal::InvoiceNumber;
    ///
    /// let number = InvoiceNumber::parse("2025-26/014").unwrap();
    /// assert_eq!(number.sequence(), 14);
    /// assert!(InvoiceNumber::parse("2025-26/abc").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let mut segments = raw.split('/');
        let fiscal_year = FiscalYear::parse(segments.next()?)?;
        let digits = segments.next()?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let sequence: u32 = digits.parse().ok()?;
        if segments.next().is_some() {
            return None;
        }
        Some(InvoiceNumber::new(fiscal_year, sequence))
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{:0width$}",
            self.fiscal_year,
            self.sequence,
            width = SEQUENCE_MIN_WIDTH
        )
    }
}

/// Strict parsing for user-supplied lookups (CLI arguments, URLs).
impl FromStr for InvoiceNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceNumber::parse(s.trim()).ok_or_else(|| ValidationError::InvalidFormat {
            field: "bill_number".to_string(),
            reason: "expected YYYY-YY/NNN, e.g. 2025-26/001".to_string(),
        })
    }
}

// =============================================================================
// Sequencer
// =============================================================================

/// Highest sequence already used in `fiscal_year`, if any.
///
/// Malformed records and numbers from other fiscal years are ignored.
pub fn highest_sequence<I, S>(fiscal_year: FiscalYear, existing: I) -> Option<u32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    existing
        .into_iter()
        .filter_map(|raw| InvoiceNumber::parse(raw.as_ref()))
        .filter(|number| number.fiscal_year() == fiscal_year)
        .map(|number| number.sequence())
        .max()
}

/// Next invoice number within a given fiscal year.
pub fn next_in_fiscal_year<I, S>(fiscal_year: FiscalYear, existing: I) -> InvoiceNumber
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match highest_sequence(fiscal_year, existing) {
        Some(last) => InvoiceNumber::new(fiscal_year, last).successor(),
        None => InvoiceNumber::first(fiscal_year),
    }
}

/// Next invoice number for a bill created on `today`.
///
/// ## How It Works
/// 1. Derive the fiscal year from `today`
/// 2. Keep existing numbers of that fiscal year that parse
/// 3. Return `max(sequence) + 1`, or `…/001` when there are none
///
/// `existing` may be unordered and may contain numbers from any year.
///
/// ## Example
/// ```rust
/// use acbill_core::fiscal::next_invoice_number;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let next = next_invoice_number(today, ["2025-26/001", "2025-26/002", "2025-26/abc"]);
/// assert_eq!(next.to_string(), "2025-26/003");
/// ```
pub fn next_invoice_number<I, S>(today: NaiveDate, existing: I) -> InvoiceNumber
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    next_in_fiscal_year(FiscalYear::containing(today), existing)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fiscal_year_from_date() {
        assert_eq!(FiscalYear::containing(date(2025, 4, 1)).to_string(), "2025-26");
        assert_eq!(FiscalYear::containing(date(2026, 2, 28)).to_string(), "2025-26");
        assert_eq!(FiscalYear::containing(date(2025, 12, 31)).to_string(), "2025-26");
    }

    #[test]
    fn test_fiscal_year_changes_exactly_on_april_first() {
        let year = FiscalYear::starting(2025);
        assert!(!year.contains(date(2025, 3, 31)));
        assert!(year.contains(date(2025, 4, 1)));
        assert!(year.contains(date(2026, 3, 31)));
        assert!(!year.contains(date(2026, 4, 1)));
        assert_eq!(FiscalYear::containing(date(2026, 4, 1)), year.next());
    }

    #[test]
    fn test_fiscal_year_is_stable_across_the_whole_year() {
        let year = FiscalYear::starting(2030);
        let mut day = date(2030, 4, 1);
        while day <= date(2031, 3, 31) {
            assert_eq!(FiscalYear::containing(day), year, "{day}");
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_fiscal_year_suffix_is_zero_padded() {
        assert_eq!(FiscalYear::starting(2099).to_string(), "2099-00");
        assert_eq!(FiscalYear::starting(2000).to_string(), "2000-01");
        assert_eq!(FiscalYear::starting(2008).to_string(), "2008-09");
    }

    #[test]
    fn test_fiscal_year_parse() {
        assert_eq!(FiscalYear::parse("2025-26"), Some(FiscalYear::starting(2025)));
        assert_eq!(FiscalYear::parse("2099-00"), Some(FiscalYear::starting(2099)));
        assert_eq!(FiscalYear::parse("2025-27"), None);
        assert_eq!(FiscalYear::parse("25-26"), None);
        assert_eq!(FiscalYear::parse("2025/26"), None);
        assert_eq!(FiscalYear::parse(""), None);
    }

    #[test]
    fn test_invoice_number_format() {
        let year = FiscalYear::starting(2025);
        assert_eq!(InvoiceNumber::new(year, 1).to_string(), "2025-26/001");
        assert_eq!(InvoiceNumber::new(year, 14).to_string(), "2025-26/014");
        assert_eq!(InvoiceNumber::new(year, 999).to_string(), "2025-26/999");
        assert_eq!(InvoiceNumber::new(year, 1000).to_string(), "2025-26/1000");
        assert_eq!(InvoiceNumber::new(year, 12345).to_string(), "2025-26/12345");
    }

    #[test]
    fn test_invoice_number_parse() {
        let parsed = InvoiceNumber::parse("2025-26/014").unwrap();
        assert_eq!(parsed.fiscal_year(), FiscalYear::starting(2025));
        assert_eq!(parsed.sequence(), 14);

        assert_eq!(InvoiceNumber::parse("2025-26/1000").unwrap().sequence(), 1000);
        assert!(InvoiceNumber::parse("2025-26/abc").is_none());
        assert!(InvoiceNumber::parse("2025-26/").is_none());
        assert!(InvoiceNumber::parse("2025-26/+5").is_none());
        assert!(InvoiceNumber::parse("2025-26").is_none());
        assert!(InvoiceNumber::parse("2025-26/001/2").is_none());
        assert!(InvoiceNumber::parse("INV-7").is_none());
    }

    #[test]
    fn test_invoice_number_from_str_is_strict() {
        assert!("2025-26/003".parse::<InvoiceNumber>().is_ok());
        assert!(" 2025-26/003 ".parse::<InvoiceNumber>().is_ok());
        assert!("2025-26/x".parse::<InvoiceNumber>().is_err());
    }

    #[test]
    fn test_next_number_starts_at_one() {
        let empty: [&str; 0] = [];
        let next = next_invoice_number(date(2025, 4, 1), empty);
        assert_eq!(next.to_string(), "2025-26/001");
    }

    #[test]
    fn test_next_number_is_max_plus_one() {
        let existing = vec![
            "2025-26/002".to_string(),
            "2025-26/007".to_string(),
            "2025-26/001".to_string(),
        ];
        let next = next_invoice_number(date(2025, 11, 3), &existing);
        assert_eq!(next.to_string(), "2025-26/008");
    }

    #[test]
    fn test_next_number_ignores_malformed_records() {
        let existing = ["2025-26/001", "2025-26/002", "2025-26/abc"];
        let next = next_invoice_number(date(2025, 6, 1), existing);
        assert_eq!(next.to_string(), "2025-26/003");
    }

    #[test]
    fn test_next_number_ignores_other_fiscal_years() {
        let existing = ["2024-25/120", "2026-27/004", "2025-26/009"];
        let next = next_invoice_number(date(2026, 1, 15), existing);
        assert_eq!(next.to_string(), "2025-26/010");

        let next = next_invoice_number(date(2026, 4, 1), existing);
        assert_eq!(next.to_string(), "2026-27/005");
    }

    #[test]
    fn test_next_number_grows_past_three_digits() {
        let existing = ["2025-26/999"];
        let next = next_invoice_number(date(2025, 9, 9), existing);
        assert_eq!(next.to_string(), "2025-26/1000");
    }

    /// The scan alone is check-then-act: two callers reading the same
    /// history get the same answer. acbill-db serializes assignment with a
    /// counter row; this documents why that is needed.
    #[test]
    fn test_concurrent_scans_collide_without_serialization() {
        let history = ["2025-26/001"];
        let first = next_invoice_number(date(2025, 5, 1), history);
        let second = next_invoice_number(date(2025, 5, 1), history);
        assert_eq!(first, second);
    }
}
