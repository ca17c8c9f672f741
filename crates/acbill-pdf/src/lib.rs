//! # acbill-pdf: Invoice Documents
//!
//! Renders a finalized [`Bill`] as a paginated A4 invoice.
//!
//! Rendering happens in two steps:
//! 1. [`InvoiceSheet::from_bill`] formats every printed field
//! 2. [`render_sheet`] lays the sheet out on pages
//!
//! The sheet is the contract: its `grand_total` and `amount_in_words` are
//! taken from the stored bill and printed without recomputation.
//!
//! ```rust,ignore
//! let bytes = acbill_pdf::render_invoice(&bill, &company)?;
//! std::fs::write(acbill_pdf::file_name(&bill.bill_number), bytes)?;
//! ```

pub mod error;
pub mod render;
pub mod sheet;

pub use error::{PdfError, PdfResult};
pub use render::{render_sheet, RenderedInvoice};
pub use sheet::{InvoiceSheet, SheetRow};

use acbill_core::{Bill, CompanyProfile};

/// Renders `bill` as PDF bytes.
pub fn render_invoice(bill: &Bill, company: &CompanyProfile) -> PdfResult<Vec<u8>> {
    let sheet = InvoiceSheet::from_bill(bill, company)?;
    render_sheet(&sheet).map(|rendered| rendered.bytes)
}

/// File name used when saving or downloading an invoice.
///
/// ```rust
/// assert_eq!(acbill_pdf::file_name("2025-26/014"), "Invoice-2025-26-014.pdf");
/// ```
pub fn file_name(bill_number: &str) -> String {
    format!("Invoice-{}.pdf", bill_number.replace('/', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use acbill_core::fiscal::{FiscalYear, InvoiceNumber};
    use acbill_core::{BillDraft, LineItem};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn bill_with_items(count: usize) -> Bill {
        let items = (0..count)
            .map(|i| {
                LineItem::priced(
                    format!("Service visit {i} including indoor unit cleaning and drain check"),
                    Decimal::from(1),
                    Decimal::new(125_050, 2),
                )
            })
            .collect();
        let draft = BillDraft {
            items,
            ..BillDraft::default()
        };
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        Bill::finalize(
            "id",
            InvoiceNumber::new(FiscalYear::starting(2025), 1),
            draft,
            today,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_invoice(&bill_with_items(3), &CompanyProfile::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_single_page_for_short_bill() {
        let sheet = InvoiceSheet::from_bill(&bill_with_items(3), &CompanyProfile::default()).unwrap();
        assert_eq!(render_sheet(&sheet).unwrap().pages, 1);
    }

    #[test]
    fn test_long_bill_breaks_pages() {
        let bill = bill_with_items(80);
        let sheet = InvoiceSheet::from_bill(&bill, &CompanyProfile::default()).unwrap();
        let rendered = render_sheet(&sheet).unwrap();

        assert!(rendered.pages > 1);
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(sheet.grand_total, bill.grand_total.grouped());
        assert_eq!(sheet.amount_in_words, bill.amount_in_words);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("2025-26/001"), "Invoice-2025-26-001.pdf");
    }
}
