//! # Error Types
//!
//! Domain-specific error types for acbill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  acbill-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  acbill-db errors (separate crate)                                     │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → "could not create bill" │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed numbers on line items are NOT errors: the finalizer treats
//! them as zero. Numbers too large to total are errors, as is anything else
//! that would put nonsense on a legal document.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An amount cannot be written out in words.
    ///
    /// ## When This Occurs
    /// - A negative grand total (credit lines outweigh the charges)
    /// - A rounding override that pushes the grand total below zero
    ///
    /// The words are printed on the invoice, so nothing is rendered.
    #[error("Invalid amount for words: {amount}")]
    InvalidAmount { amount: String },

    /// An amount does not fit in paise arithmetic.
    ///
    /// Raised instead of counting the value as zero or wrapping around.
    #[error("{field} is out of range: {amount}")]
    AmountOutOfRange { field: String, amount: String },

    /// Bill is not in a state that allows the requested transition.
    #[error("Bill {bill_number} is {current_status}, cannot become {requested_status}")]
    InvalidStatusTransition {
        bill_number: String,
        current_status: String,
        requested_status: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid invoice number, invalid SAC code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
