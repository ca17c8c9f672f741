//! # acbill-core: Pure Billing Logic
//!
//! This crate is the **heart** of acbill. It turns line items into a
//! finalized, numbered, human-readable invoice using pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         acbill Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Web app / CLI (request handling)                   │   │
//! │  │    next number ──► bill form ──► create ──► PDF download       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ acbill-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  fiscal   │  │  totals   │  │   words   │  │   money   │  │   │
//! │  │   │ Sequencer │  │ Finalizer │  │ Crore/Lakh│  │   paise   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             acbill-db (SQLite) / acbill-pdf (printpdf)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`fiscal`] - Indian fiscal years and invoice numbers
//! - [`totals`] - Subtotal, rounding adjustment, grand total
//! - [`words`] - Amount in words (Indian numbering scale)
//! - [`money`] - Money type with integer paise arithmetic
//! - [`types`] - Domain types (LineItem, Bill, BillStatus, ...)
//! - [`validation`] - Boundary validation and lenient numeric parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use acbill_core::money::Money;
//! use acbill_core::totals::round_grand_total;
//! use acbill_core::words::amount_in_words;
//!
//! let subtotal = Money::from_paise(150_040); // ₹1,500.40
//! let grand_total = round_grand_total(subtotal);
//! assert_eq!(grand_total.paise(), 150_000);
//!
//! let words = amount_in_words(grand_total).unwrap();
//! assert_eq!(words, "One Thousand Five Hundred Rupees Only");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fiscal;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;
pub mod words;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use fiscal::{next_invoice_number, FiscalYear, InvoiceNumber};
pub use money::Money;
pub use totals::{finalize, finalize_with_adjustment, BillTotals};
pub use types::*;
pub use words::{amount_in_words, decimal_in_words};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single bill.
///
/// Keeps a printed invoice within a handful of pages.
pub const MAX_BILL_ITEMS: usize = 200;

/// Largest line amount, in rupees, accepted on a draft (one lakh crore).
///
/// The same bound applies to a rounding override. With at most
/// [`MAX_BILL_ITEMS`] lines the subtotal stays well inside i64 paise.
pub const MAX_LINE_AMOUNT: i64 = 1_000_000_000_000;

/// Unit label used when a line item does not name one.
pub const DEFAULT_UNIT: &str = "EA";

/// Payment terms printed when a bill does not specify its own.
pub const DEFAULT_PAYMENT_TERMS: &str = "30 Days credit";
