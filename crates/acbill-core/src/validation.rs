//! # Validation Module
//!
//! Input validation and lenient numeric parsing for acbill.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── lenient_decimal: "12.5", 12.5, "", null, "NaN" all accepted       │
//! │  └── Non-numeric values become "absent", never an error                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: shape checks on the draft                       │
//! │  ├── At least one line item, at most MAX_BILL_ITEMS                    │
//! │  └── Field lengths, SAC code format                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── UNIQUE (bill_number)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use acbill_core::validation::{parse_decimal, validate_sac_code};
//!
//! assert!(validate_sac_code("998719").is_ok());
//! assert_eq!(parse_decimal(" 12.50 ").unwrap().to_string(), "12.50");
//! assert!(parse_decimal("abc").is_none());
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::fiscal::InvoiceNumber;
use crate::types::{BillDetails, BillDraft, BillParty, BillUpdate, LineItem};
use crate::{DEFAULT_UNIT, MAX_BILL_ITEMS, MAX_LINE_AMOUNT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_DESCRIPTION_LEN: usize = 500;
const MAX_UNIT_LEN: usize = 20;
const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 1000;
const MAX_SAC_LEN: usize = 8;

// =============================================================================
// Lenient Parsing
// =============================================================================

/// Parses a decimal from user text.
///
/// Accepts plain (`"1500.40"`) and scientific (`"1.5e3"`) notation, with
/// surrounding whitespace. Returns `None` for anything else.
pub fn parse_decimal(input: &str) -> Option<Decimal> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .ok()
}

/// Converts any JSON value to an optional decimal.
fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Serde helper for optional numeric fields that come from forms.
///
/// Numbers, numeric strings, `null`, empty strings and garbage are all
/// accepted. Anything that is not a number deserializes as `None`.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

/// Serde helper for the unit label: blank or missing becomes "EA".
pub fn lenient_unit<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let unit = match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => DEFAULT_UNIT.to_string(),
    };
    Ok(unit)
}

// =============================================================================
// String Validators
// =============================================================================

fn check_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn check_optional_len(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) => check_len(field, v, max),
        None => Ok(()),
    }
}

/// Validates a SAC (Services Accounting Code).
///
/// ## Rules
/// - Blank is allowed (the column prints empty)
/// - Otherwise digits only, at most 8 of them
///
/// ## Example
/// ```rust
/// use acbill_core::validation::validate_sac_code;
///
/// assert!(validate_sac_code("998719").is_ok());
/// assert!(validate_sac_code("").is_ok());
/// assert!(validate_sac_code("99-87").is_err());
/// ```
pub fn validate_sac_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();
    if code.is_empty() {
        return Ok(());
    }

    if code.len() > MAX_SAC_LEN {
        return Err(ValidationError::TooLong {
            field: "sacCode".to_string(),
            max: MAX_SAC_LEN,
        });
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "sacCode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a line item description. May be empty.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    check_len("description", description, MAX_DESCRIPTION_LEN)
}

/// Validates a unit label.
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    check_len("unit", unit, MAX_UNIT_LEN)
}

/// Parses and validates an invoice number such as `2025-26/014`.
///
/// ## Example
/// ```rust
/// use acbill_core::validation::validate_bill_number;
///
/// assert_eq!(validate_bill_number("2025-26/14").unwrap().to_string(), "2025-26/014");
/// assert!(validate_bill_number("2025-26/abc").is_err());
/// ```
pub fn validate_bill_number(number: &str) -> ValidationResult<InvoiceNumber> {
    if number.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "bill_number".to_string(),
        });
    }
    number.parse()
}

// =============================================================================
// Draft Validators
// =============================================================================

fn validate_item(index: usize, item: &LineItem) -> ValidationResult<()> {
    validate_description(&item.description)?;
    validate_unit(&item.unit)?;
    if let Some(code) = &item.sac_code {
        validate_sac_code(code)?;
    }
    validate_line_amount(index, item)
}

/// Checks that a line's amount (explicit, or quantity × rate) stays within
/// ±[`MAX_LINE_AMOUNT`] rupees.
///
/// Missing numbers are fine, they count as zero when totalling.
pub fn validate_line_amount(index: usize, item: &LineItem) -> ValidationResult<()> {
    let amount = match item.amount {
        Some(amount) => Some(amount),
        None => {
            let quantity = item.quantity.unwrap_or_default().max(Decimal::ZERO);
            let rate = item.rate.unwrap_or_default().max(Decimal::ZERO);
            quantity.checked_mul(rate)
        }
    };

    check_amount(&format!("items[{index}].amount"), amount)
}

fn check_amount(field: &str, amount: Option<Decimal>) -> ValidationResult<()> {
    let limit = Decimal::from(MAX_LINE_AMOUNT);
    match amount {
        Some(value) if value.abs() <= limit => Ok(()),
        _ => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: -MAX_LINE_AMOUNT,
            max: MAX_LINE_AMOUNT,
        }),
    }
}

fn validate_party(party: &BillParty) -> ValidationResult<()> {
    if party.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "billTo.name".to_string(),
        });
    }
    check_len("billTo.name", &party.name, MAX_NAME_LEN)?;
    check_optional_len("billTo.address", party.address.as_deref(), MAX_TEXT_LEN)?;
    check_optional_len("billTo.gstin", party.gstin.as_deref(), 20)
}

/// Validates editable bill metadata.
pub fn validate_details(details: &BillDetails) -> ValidationResult<()> {
    check_optional_len("projectName", details.project_name.as_deref(), MAX_NAME_LEN)?;
    check_optional_len("referenceNo", details.reference_no.as_deref(), MAX_NAME_LEN)?;
    check_optional_len(
        "customerWONumber",
        details.customer_wo_number.as_deref(),
        MAX_NAME_LEN,
    )?;
    check_optional_len("paymentTerms", details.payment_terms.as_deref(), MAX_NAME_LEN)?;
    check_optional_len("notes", details.notes.as_deref(), MAX_TEXT_LEN)
}

/// Validates a bill draft before it is finalized.
///
/// ## Rules
/// - At least one line item, at most [`MAX_BILL_ITEMS`]
/// - Every item passes the string validators
/// - Line amounts and the rounding override are within ±[`MAX_LINE_AMOUNT`] rupees
/// - `billTo`, when present, has a name
///
/// Blank or unparseable numbers are not errors: a blank rate is a zero rate.
pub fn validate_draft(draft: &BillDraft) -> ValidationResult<()> {
    if draft.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if draft.items.len() > MAX_BILL_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_BILL_ITEMS as i64,
        });
    }

    for (index, item) in draft.items.iter().enumerate() {
        validate_item(index, item)?;
    }

    if let Some(adjustment) = draft.rounding_adjustment {
        check_amount("roundingAdjustment", Some(adjustment))?;
    }

    if let Some(party) = &draft.bill_to {
        validate_party(party)?;
    }

    validate_details(&draft.details)
}

/// Validates a metadata edit for an issued bill.
pub fn validate_update(update: &BillUpdate) -> ValidationResult<()> {
    if let Some(party) = &update.bill_to {
        validate_party(party)?;
    }
    validate_details(&update.details)
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use acbill_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapped {
        #[serde(default, deserialize_with = "lenient_decimal")]
        value: Option<Decimal>,
    }

    fn lenient(json: &str) -> Option<Decimal> {
        serde_json::from_str::<Wrapped>(json).unwrap().value
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1500.40"), Some(dec("1500.40")));
        assert_eq!(parse_decimal("  -3 "), Some(dec("-3")));
        assert_eq!(parse_decimal("1.5e3"), Some(dec("1500")));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("12abc"), None);
    }

    #[test]
    fn test_lenient_decimal() {
        assert_eq!(lenient(r#"{"value": 12.5}"#), Some(dec("12.5")));
        assert_eq!(lenient(r#"{"value": 7}"#), Some(dec("7")));
        assert_eq!(lenient(r#"{"value": "250.15"}"#), Some(dec("250.15")));
        assert_eq!(lenient(r#"{"value": ""}"#), None);
        assert_eq!(lenient(r#"{"value": null}"#), None);
        assert_eq!(lenient(r#"{"value": "NaN"}"#), None);
        assert_eq!(lenient(r#"{"value": true}"#), None);
        assert_eq!(lenient(r#"{}"#), None);
    }

    #[test]
    fn test_validate_sac_code() {
        assert!(validate_sac_code("998719").is_ok());
        assert!(validate_sac_code("  ").is_ok());
        assert!(validate_sac_code("99871A").is_err());
        assert!(validate_sac_code("123456789").is_err());
    }

    #[test]
    fn test_validate_bill_number() {
        assert!(validate_bill_number("2025-26/001").is_ok());
        assert!(matches!(
            validate_bill_number(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_bill_number("2025-26/abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_draft() {
        let item = LineItem::with_amount("Service", dec("100"));

        let empty = BillDraft::default();
        assert!(matches!(
            validate_draft(&empty),
            Err(ValidationError::Required { .. })
        ));

        let ok = BillDraft {
            items: vec![item.clone()],
            ..BillDraft::default()
        };
        assert!(validate_draft(&ok).is_ok());

        let too_many = BillDraft {
            items: vec![item.clone(); MAX_BILL_ITEMS + 1],
            ..BillDraft::default()
        };
        assert!(matches!(
            validate_draft(&too_many),
            Err(ValidationError::OutOfRange { .. })
        ));

        let nameless = BillDraft {
            items: vec![item],
            bill_to: Some(BillParty {
                name: " ".to_string(),
                address: None,
                gstin: None,
            }),
            ..BillDraft::default()
        };
        assert!(validate_draft(&nameless).is_err());
    }

    #[test]
    fn test_validate_draft_amount_bounds() {
        let draft = |items: Vec<LineItem>, adjustment: Option<&str>| BillDraft {
            items,
            rounding_adjustment: adjustment.map(dec),
            ..BillDraft::default()
        };

        let at_limit = LineItem::with_amount("Plant", dec("1000000000000"));
        assert!(validate_draft(&draft(vec![at_limit.clone(), at_limit], None)).is_ok());

        let huge = LineItem::with_amount("Plant", dec("100000000000000000"));
        let err = validate_draft(&draft(vec![LineItem::with_amount("Visit", dec("100")), huge], None))
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "items[1].amount"));

        let big_credit = LineItem::with_amount("Credit", dec("-1000000000000.01"));
        assert!(validate_draft(&draft(vec![big_credit], None)).is_err());

        let huge_product = LineItem::priced("Chillers", dec("1000000"), dec("100000000"));
        assert!(validate_draft(&draft(vec![huge_product], None)).is_err());

        let item = LineItem::with_amount("Visit", dec("100"));
        assert!(validate_draft(&draft(vec![item.clone()], Some("-0.40"))).is_ok());
        let err = validate_draft(&draft(vec![item], Some("5000000000000"))).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "roundingAdjustment"));
    }

    #[test]
    fn test_validate_unit_and_description() {
        assert!(validate_unit("EA").is_ok());
        assert!(validate_unit(&"U".repeat(21)).is_err());
        assert!(validate_description("").is_ok());
        assert!(validate_description(&"d".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
