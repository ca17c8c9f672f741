//! # Domain Types
//!
//! Core domain types used throughout acbill.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   BillDraft     │   │      Bill       │   │   LineItem      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bill_date?     │──►│  id (UUID)      │   │  description    │       │
//! │  │  bill_to?       │   │  bill_number    │   │  sac_code?      │       │
//! │  │  details        │   │  subtotal       │   │  unit ("EA")    │       │
//! │  │  items          │   │  rounding_adj   │   │  quantity?      │       │
//! │  │  rounding_adj?  │   │  grand_total    │   │  rate?          │       │
//! │  └─────────────────┘   │  amount_in_words│   │  amount?        │       │
//! │                        │  status         │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   BillStatus    │   │   BillParty     │   │ CompanyProfile  │       │
//! │  │  Draft          │   │  name           │   │  issuer block   │       │
//! │  │  Sent           │   │  address?       │   │  bank details   │       │
//! │  │  Paid           │   │  gstin?         │   │  payment terms  │       │
//! │  │  Cancelled      │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every bill has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `bill_number`: `2025-26/014` - the legal invoice number, also immutable
//!
//! ## Immutable Once Issued
//! The bill number, subtotal, rounding adjustment, grand total and amount in
//! words are fixed when the bill is created. Later edits only touch
//! [`BillDetails`], [`BillParty`] and [`BillStatus`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::fiscal::InvoiceNumber;
use crate::money::Money;
use crate::totals::{finalize_with_adjustment, BillTotals};
use crate::validation::{lenient_decimal, lenient_unit, validate_draft, validate_update};
use crate::words::amount_in_words;
use crate::{DEFAULT_PAYMENT_TERMS, DEFAULT_UNIT};

// =============================================================================
// Line Item
// =============================================================================

/// One billable entry on a bill.
///
/// Numeric fields are optional: forms leave them blank, imported work
/// orders carry an amount without a rate. The finalizer treats anything
/// missing as zero (see [`crate::totals::line_amount`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// What was done, e.g. "Split AC gas charging".
    #[serde(default)]
    pub description: String,

    /// Services Accounting Code (Indian tax classification).
    #[serde(default)]
    pub sac_code: Option<String>,

    /// Unit label printed in the table. Blank becomes "EA".
    #[serde(default = "default_unit", deserialize_with = "lenient_unit")]
    pub unit: String,

    /// Quantity (≥ 0).
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[ts(as = "Option<String>")]
    pub quantity: Option<Decimal>,

    /// Rate per unit in rupees (≥ 0).
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[ts(as = "Option<String>")]
    pub rate: Option<Decimal>,

    /// Line amount in rupees. Normally quantity × rate, but may be supplied
    /// on its own; when present it wins.
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[ts(as = "Option<String>")]
    pub amount: Option<Decimal>,
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

impl LineItem {
    /// A line priced as quantity × rate.
    ///
    /// The amount is filled in the way the bill form does it, so the stored
    /// row carries all three numbers.
    pub fn priced(description: impl Into<String>, quantity: Decimal, rate: Decimal) -> Self {
        LineItem {
            description: description.into(),
            sac_code: None,
            unit: default_unit(),
            quantity: Some(quantity),
            rate: Some(rate),
            amount: quantity.checked_mul(rate),
        }
    }

    /// A line with only an amount (e.g. imported from a work order PDF).
    pub fn with_amount(description: impl Into<String>, amount: Decimal) -> Self {
        LineItem {
            description: description.into(),
            sac_code: None,
            unit: default_unit(),
            quantity: None,
            rate: None,
            amount: Some(amount),
        }
    }

    /// Sets the SAC code.
    pub fn sac_code(mut self, code: impl Into<String>) -> Self {
        self.sac_code = Some(code.into());
        self
    }

    /// Sets the unit label.
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Unit label for printing ("EA" when blank).
    pub fn unit_label(&self) -> &str {
        let unit = self.unit.trim();
        if unit.is_empty() {
            DEFAULT_UNIT
        } else {
            unit
        }
    }
}

// =============================================================================
// Bill Status
// =============================================================================

/// Where a bill is in its life.
///
/// ```text
/// Draft ──► Sent ──► Paid
///   │         │
///   └────┬────┘
///        ▼
///    Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    /// Created, not yet handed to the customer.
    Draft,
    /// Delivered to the customer.
    Sent,
    /// Settled.
    Paid,
    /// Withdrawn. The number stays used.
    Cancelled,
}

impl BillStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [BillStatus; 4] = [
        BillStatus::Draft,
        BillStatus::Sent,
        BillStatus::Paid,
        BillStatus::Cancelled,
    ];

    /// Lowercase name as stored and shown.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Draft => "draft",
            BillStatus::Sent => "sent",
            BillStatus::Paid => "paid",
            BillStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a bill in this status may move to `next`.
    pub const fn can_transition_to(&self, next: BillStatus) -> bool {
        matches!(
            (self, next),
            (BillStatus::Draft, BillStatus::Sent)
                | (BillStatus::Draft, BillStatus::Paid)
                | (BillStatus::Draft, BillStatus::Cancelled)
                | (BillStatus::Sent, BillStatus::Paid)
                | (BillStatus::Sent, BillStatus::Cancelled)
        )
    }

    /// Paid and cancelled bills never change status again.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, BillStatus::Paid | BillStatus::Cancelled)
    }
}

impl Default for BillStatus {
    fn default() -> Self {
        BillStatus::Draft
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        BillStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: BillStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Parties & Metadata
// =============================================================================

/// Customer block printed under "Bill To".
///
/// Snapshot pattern: copied onto the bill at creation so later edits to
/// the customer record don't rewrite issued invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillParty {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    /// GSTIN or PAN.
    #[serde(default)]
    pub gstin: Option<String>,
}

/// Free-form bill metadata. Editable after the bill is issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillDetails {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub reference_no: Option<String>,
    /// Customer's work order number.
    #[serde(default, rename = "customerWONumber")]
    pub customer_wo_number: Option<String>,
    #[serde(default, rename = "customerWODate")]
    #[ts(as = "Option<String>")]
    pub customer_wo_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Bill Draft
// =============================================================================

/// Everything the caller supplies to create a bill.
///
/// The number, totals and words are NOT part of the draft: they are
/// assigned by the sequencer and computed by the finalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillDraft {
    /// Issue date. Defaults to the creation date.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub bill_date: Option<NaiveDate>,

    #[serde(default)]
    pub bill_to: Option<BillParty>,

    #[serde(default)]
    pub details: BillDetails,

    pub items: Vec<LineItem>,

    /// Manual rounding adjustment in rupees. Overrides the computed one.
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[ts(as = "Option<String>")]
    pub rounding_adjustment: Option<Decimal>,
}

/// Metadata edit for an issued bill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillUpdate {
    #[serde(default)]
    pub bill_to: Option<BillParty>,
    #[serde(default)]
    pub details: BillDetails,
}

// =============================================================================
// Bill
// =============================================================================

/// A finalized invoice.
///
/// Invariant: `grand_total == subtotal + rounding_adjustment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bill {
    pub id: String,
    pub bill_number: String,
    #[ts(as = "String")]
    pub bill_date: NaiveDate,
    pub bill_to: Option<BillParty>,
    pub details: BillDetails,
    pub items: Vec<LineItem>,
    /// Sum of line amounts before rounding.
    pub subtotal: Money,
    /// Signed: negative when the total was rounded down.
    pub rounding_adjustment: Money,
    pub grand_total: Money,
    /// Printed verbatim on the invoice.
    pub amount_in_words: String,
    pub status: BillStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Turns a draft into a finalized bill.
    ///
    /// ## What This Does
    /// 1. Validates the draft (items present, field lengths, SAC codes)
    /// 2. Computes subtotal, rounding adjustment and grand total
    /// 3. Writes the grand total out in words
    /// 4. Fills the bill date with `today` when the draft has none
    ///
    /// Blank payment terms are stored as absent, so the issuer's terms apply
    /// when printing (see [`Bill::payment_terms`]).
    ///
    /// ## Errors
    /// - [`CoreError::Validation`] for a bad draft, including amounts beyond
    ///   [`MAX_LINE_AMOUNT`](crate::MAX_LINE_AMOUNT)
    /// - [`CoreError::AmountOutOfRange`] if the totals do not fit in paise
    /// - [`CoreError::InvalidAmount`] if the grand total is negative
    pub fn finalize(
        id: impl Into<String>,
        number: InvoiceNumber,
        draft: BillDraft,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> CoreResult<Bill> {
        validate_draft(&draft)?;

        let adjustment = draft
            .rounding_adjustment
            .map(|value| {
                Money::from_decimal(value).ok_or_else(|| CoreError::AmountOutOfRange {
                    field: "roundingAdjustment".to_string(),
                    amount: value.to_string(),
                })
            })
            .transpose()?;
        let totals = finalize_with_adjustment(&draft.items, adjustment)?;
        let amount_in_words = amount_in_words(totals.grand_total)?;

        let mut details = draft.details;
        if details.payment_terms.as_deref().map_or(false, |t| t.trim().is_empty()) {
            details.payment_terms = None;
        }

        Ok(Bill {
            id: id.into(),
            bill_number: number.to_string(),
            bill_date: draft.bill_date.unwrap_or(today),
            bill_to: draft.bill_to,
            details,
            items: draft.items,
            subtotal: totals.subtotal,
            rounding_adjustment: totals.rounding_adjustment,
            grand_total: totals.grand_total,
            amount_in_words,
            status: BillStatus::Draft,
            created_at: now,
            updated_at: now,
        })
    }

    /// Parsed invoice number, if the stored one is well-formed.
    pub fn invoice_number(&self) -> Option<InvoiceNumber> {
        InvoiceNumber::parse(&self.bill_number)
    }

    /// The three monetary fields as one value.
    pub fn totals(&self) -> BillTotals {
        BillTotals {
            subtotal: self.subtotal,
            rounding_adjustment: self.rounding_adjustment,
            grand_total: self.grand_total,
        }
    }

    /// Payment terms to print.
    ///
    /// The bill's own terms, else `issuer_terms` (the company default),
    /// else [`DEFAULT_PAYMENT_TERMS`].
    pub fn payment_terms<'a>(&'a self, issuer_terms: &'a str) -> &'a str {
        [self.details.payment_terms.as_deref(), Some(issuer_terms)]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .unwrap_or(DEFAULT_PAYMENT_TERMS)
    }

    /// Replaces editable metadata. Number and totals are untouched.
    pub fn apply_update(&mut self, update: BillUpdate, now: DateTime<Utc>) -> CoreResult<()> {
        validate_update(&update)?;
        self.bill_to = update.bill_to;
        self.details = update.details;
        self.updated_at = now;
        Ok(())
    }

    /// Moves the bill to `next`, enforcing the lifecycle.
    pub fn transition(&mut self, next: BillStatus, now: DateTime<Utc>) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                bill_number: self.bill_number.clone(),
                current_status: self.status.to_string(),
                requested_status: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Company Profile
// =============================================================================

/// Bank account printed in the invoice footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BankDetails {
    pub account_name: String,
    pub account_no: String,
    pub ifsc: String,
    pub branch: String,
}

/// The issuing business, printed in the invoice header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompanyProfile {
    pub name: String,
    pub pan: String,
    pub phone: String,
    pub email: String,
    /// Address printed on bills.
    pub bill_address: String,
    pub bank: BankDetails,
    /// Used when a bill has no payment terms of its own.
    pub payment_terms: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        CompanyProfile {
            name: "AC Service Company".to_string(),
            pan: String::new(),
            phone: String::new(),
            email: String::new(),
            bill_address: String::new(),
            bank: BankDetails {
                account_name: String::new(),
                account_no: String::new(),
                ifsc: String::new(),
                branch: String::new(),
            },
            payment_terms: DEFAULT_PAYMENT_TERMS.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
