//! # Bill Totals
//!
//! Turns line items into subtotal, rounding adjustment and grand total.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bill Finalization                                  │
//! │                                                                         │
//! │  items ──► line_amount() each ──► Σ = subtotal (exact paise)           │
//! │                                        │                                │
//! │                    override given? ────┤                                │
//! │                      │ yes             │ no                             │
//! │                      ▼                 ▼                                │
//! │      grand = subtotal + adj     round_grand_total(subtotal)            │
//! │                                   fraction > 0.50 → ceil               │
//! │                                   otherwise      → floor               │
//! │                                        │                                │
//! │                      adjustment = grand_total - subtotal               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Examples
//! | Subtotal  | Fraction | Grand Total | Adjustment |
//! |-----------|----------|-------------|------------|
//! | 1500.40   | 0.40     | 1500        | -0.40      |
//! | 1500.60   | 0.60     | 1501        | +0.40      |
//! | 1500.50   | 0.50     | 1500        | -0.50      |
//!
//! Exactly half a rupee rounds DOWN. Issued invoices were computed that
//! way, so it stays.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::LineItem;

/// Fractions strictly above this many paise round up.
const ROUND_UP_ABOVE_PAISE: i64 = 50;

/// The three monetary results of finalizing a bill.
///
/// Invariant: `grand_total == subtotal + rounding_adjustment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillTotals {
    pub subtotal: Money,
    pub rounding_adjustment: Money,
    pub grand_total: Money,
}

/// Amount contributed by one line item.
///
/// Uses the explicit amount when present, otherwise quantity × rate.
/// Missing numbers count as zero, as do negative quantities and rates.
/// An explicit negative amount is kept (credit line).
///
/// ## Errors
/// [`CoreError::AmountOutOfRange`] when the amount does not fit in paise.
pub fn line_amount(item: &LineItem) -> CoreResult<Money> {
    let amount = match item.amount {
        Some(amount) => Some(amount),
        None => {
            let quantity = item.quantity.unwrap_or_default().max(Decimal::ZERO);
            let rate = item.rate.unwrap_or_default().max(Decimal::ZERO);
            quantity.checked_mul(rate)
        }
    };

    amount
        .and_then(Money::from_decimal)
        .ok_or_else(|| CoreError::AmountOutOfRange {
            field: format!("line item '{}'", item.description.trim()),
            amount: match item.amount {
                Some(amount) => amount.to_string(),
                None => format!(
                    "{} x {}",
                    item.quantity.unwrap_or_default(),
                    item.rate.unwrap_or_default()
                ),
            },
        })
}

/// Exact sum of all line amounts.
pub fn subtotal(items: &[LineItem]) -> CoreResult<Money> {
    let mut total = Money::zero();
    for item in items {
        total = total
            .checked_add(line_amount(item)?)
            .ok_or_else(|| out_of_range("subtotal", total))?;
    }
    Ok(total)
}

/// Rounds a subtotal to whole rupees.
///
/// A fraction above 50 paise rounds up, anything else (including exactly
/// 50 paise) rounds down. Works on negative subtotals too, using the
/// floor-based fraction.
///
/// ## Example
/// ```rust
/// use acbill_core::money::Money;
/// use acbill_core::totals::round_grand_total;
///
/// assert_eq!(round_grand_total(Money::from_paise(150_060)).paise(), 150_100);
/// assert_eq!(round_grand_total(Money::from_paise(150_050)).paise(), 150_000);
/// ```
pub fn round_grand_total(subtotal: Money) -> Money {
    if subtotal.fraction_paise() > ROUND_UP_ABOVE_PAISE {
        subtotal.ceil_rupee()
    } else {
        subtotal.floor_rupee()
    }
}

/// Computes totals with the standard rounding rule.
pub fn finalize(items: &[LineItem]) -> CoreResult<BillTotals> {
    finalize_with_adjustment(items, None)
}

/// Computes totals, optionally trusting a caller-supplied adjustment.
///
/// The override is not checked: `grand_total` becomes
/// `subtotal + adjustment` even if that is not a whole rupee.
pub fn finalize_with_adjustment(
    items: &[LineItem],
    adjustment: Option<Money>,
) -> CoreResult<BillTotals> {
    let subtotal = subtotal(items)?;

    let (rounding_adjustment, grand_total) = match adjustment {
        Some(adjustment) => {
            let grand_total = subtotal
                .checked_add(adjustment)
                .ok_or_else(|| out_of_range("grand total", subtotal))?;
            (adjustment, grand_total)
        }
        None => {
            let grand_total = round_grand_total(subtotal);
            (grand_total - subtotal, grand_total)
        }
    };

    Ok(BillTotals {
        subtotal,
        rounding_adjustment,
        grand_total,
    })
}

fn out_of_range(field: &str, running: Money) -> CoreError {
    CoreError::AmountOutOfRange {
        field: field.to_string(),
        amount: running.to_decimal().to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
