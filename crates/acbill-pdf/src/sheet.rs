//! # Invoice Sheet
//!
//! Every string printed on an invoice, computed once from the bill.
//!
//! ## Field Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  COMPANY NAME                                                           │
//! │  Pan: ...  Mob: ...                                                     │
//! │  bill address                                                           │
//! │ ─────────────────────────────────────────────────────────────────────── │
//! │  Invoice No: 2025-26/014                         Date: 01/07/2025       │
//! │  Bill To Address: name / address / GSTIN                                │
//! │  Customer WO No / Project / Reference                                   │
//! │ ─────────────────────────────────────────────────────────────────────── │
//! │  SL No  Description  SAC Code  Unit  Qty   Rate        Amount           │
//! │  rows...                                                                │
//! │ ─────────────────────────────────────────────────────────────────────── │
//! │                                    Total Amount        1,500.40         │
//! │                                    Round Up               -0.40         │
//! │                                    Grand Total         1,500.00  ◄──┐   │
//! │  Rupees in Words:                                                   │   │
//! │  One Thousand Five Hundred Rupees Only  ◄───────────── verbatim ────┘   │
//! │  Payment Terms / Our Bank Details                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use acbill_core::totals::line_amount;
use acbill_core::{Bill, CompanyProfile, LineItem};

use crate::error::PdfResult;
use rust_decimal::{Decimal, RoundingStrategy};

/// One row of the item table, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub sl_no: String,
    pub description: String,
    pub sac_code: String,
    pub unit: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

/// All printed fields of one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSheet {
    pub title: String,
    pub company_name: String,
    pub company_contact: String,
    pub company_address: String,
    pub invoice_no: String,
    pub date: String,
    pub bill_to: Vec<String>,
    /// "Customer WO No: ..." paired with its "Dated: ..." if any.
    pub work_order: Option<(String, Option<String>)>,
    pub project: Option<String>,
    pub reference: Option<String>,
    pub rows: Vec<SheetRow>,
    /// Subtotal, en-IN grouping.
    pub total_amount: String,
    /// Present only when the bill was actually rounded.
    pub round_up: Option<String>,
    pub grand_total: String,
    /// Exactly `Bill::amount_in_words`.
    pub amount_in_words: String,
    pub payment_terms: String,
    pub bank: Vec<String>,
    pub notes: Option<String>,
}

impl InvoiceSheet {
    /// Builds the sheet for `bill`, issued by `company`.
    ///
    /// Fails only if a stored line amount cannot be represented in paise.
    pub fn from_bill(bill: &Bill, company: &CompanyProfile) -> PdfResult<Self> {
        let bill_to = match &bill.bill_to {
            Some(party) => {
                let mut lines = vec![party.name.clone()];
                lines.extend(non_blank(party.address.as_deref()).map(str::to_string));
                lines.extend(
                    non_blank(party.gstin.as_deref()).map(|gstin| format!("GSTIN / PAN: {gstin}")),
                );
                lines
            }
            None => Vec::new(),
        };

        let details = &bill.details;
        let work_order = non_blank(details.customer_wo_number.as_deref()).map(|number| {
            (
                format!("Customer WO No: {number}"),
                details
                    .customer_wo_date
                    .map(|d| format!("Dated: {}", d.format("%d/%m/%Y"))),
            )
        });

        let rows = bill
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| row(index, item))
            .collect::<PdfResult<Vec<_>>>()?;

        let mut contact = format!("Pan: {}  Mob: {}", company.pan, company.phone);
        if let Some(email) = non_blank(Some(company.email.as_str())) {
            contact.push_str(&format!("  Email: {email}"));
        }

        Ok(InvoiceSheet {
            title: format!("Invoice-{}", bill.bill_number),
            company_name: company.name.clone(),
            company_contact: contact,
            company_address: company.bill_address.clone(),
            invoice_no: format!("Invoice No: {}", bill.bill_number),
            date: format!("Date: {}", bill.bill_date.format("%d/%m/%Y")),
            bill_to,
            work_order,
            project: non_blank(details.project_name.as_deref()).map(|p| format!("Project: {p}")),
            reference: non_blank(details.reference_no.as_deref()).map(|r| format!("Reference: {r}")),
            rows,
            total_amount: bill.subtotal.grouped(),
            round_up: (!bill.rounding_adjustment.is_zero())
                .then(|| bill.rounding_adjustment.grouped()),
            grand_total: bill.grand_total.grouped(),
            amount_in_words: bill.amount_in_words.clone(),
            payment_terms: bill.payment_terms(&company.payment_terms).to_string(),
            bank: vec![
                format!("Account Name: {}", company.bank.account_name),
                format!("Account No: {}", company.bank.account_no),
                format!("IFSC Code: {}", company.bank.ifsc),
                format!("Branch: {}", company.bank.branch),
            ],
            notes: non_blank(details.notes.as_deref()).map(str::to_string),
        })
    }
}

fn row(index: usize, item: &LineItem) -> PdfResult<SheetRow> {
    Ok(SheetRow {
        sl_no: (index + 1).to_string(),
        description: item.description.trim().to_string(),
        sac_code: item.sac_code.clone().unwrap_or_default(),
        unit: item.unit_label().to_string(),
        quantity: two_places(item.quantity),
        rate: two_places(item.rate),
        amount: line_amount(item)?.grouped(),
    })
}

fn two_places(value: Option<Decimal>) -> String {
    let value = value
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{value:.2}")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
