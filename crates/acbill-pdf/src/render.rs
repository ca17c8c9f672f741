//! # Invoice Rendering
//!
//! Draws an [`InvoiceSheet`] onto A4 pages with printpdf's builtin
//! Helvetica fonts.
//!
//! ## Pagination
//! ```text
//!   page 1                      page 2
//!   ┌──────────────┐            ┌──────────────┐
//!   │ header       │            │ table header │  ← repeated
//!   │ table header │            │ rows 40..    │
//!   │ rows 1..39   │            │ totals       │
//!   │ ............ │ ─ y < ──►  │ words, bank  │
//!   └──────────────┘  bottom    └──────────────┘
//! ```
//!
//! Coordinates are millimetres from the bottom-left corner, as printpdf
//! expects. Right-aligned columns use an approximate Helvetica width table.

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use std::io::BufWriter;
use tracing::debug;

use crate::error::{PdfError, PdfResult};
use crate::sheet::{InvoiceSheet, SheetRow};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 14.0;
const RIGHT: f32 = 196.0;
const TOP: f32 = 283.0;
const BOTTOM: f32 = 20.0;

const PT_TO_MM: f32 = 0.3528;

// Item table columns.
const COL_SL: f32 = LEFT;
const COL_DESC: f32 = 28.0;
const COL_SAC: f32 = 92.0;
const COL_UNIT: f32 = 113.0;
const COL_QTY: f32 = 127.0;
const COL_RATE_RIGHT: f32 = 169.0;
const COL_AMOUNT_RIGHT: f32 = RIGHT;

/// Description column width in characters at 9pt.
const DESC_WRAP: usize = 34;
/// Amount-in-words width in characters at 9pt.
const WORDS_WRAP: usize = 70;

const ROW_HEIGHT: f32 = 5.0;

/// A rendered invoice.
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// Cursor over the current page.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl Canvas {
    fn new(title: &str) -> PdfResult<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PdfError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        Ok(Canvas {
            doc,
            layer,
            regular,
            bold,
            y: TOP,
            pages: 1,
        })
    }

    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn text_right(&self, text: &str, size: f32, right: f32, bold: bool) {
        let x = right - text_width_mm(text, size);
        self.text(text, size, x, bold);
    }

    fn rule(&self) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(LEFT), Mm(self.y)), false),
                (Point::new(Mm(RIGHT), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }

    fn down(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Starts a new page when fewer than `needed` mm are left.
    fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y - needed >= BOTTOM {
            return false;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
        self.pages += 1;
        true
    }

    fn finish(self) -> PdfResult<RenderedInvoice> {
        let pages = self.pages;
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| PdfError::Render(e.to_string()))?;
        let bytes = writer.into_inner().map_err(|e| PdfError::Io(e.into_error()))?;
        Ok(RenderedInvoice { bytes, pages })
    }
}

/// Approximate Helvetica advance width in mm.
fn text_width_mm(text: &str, size: f32) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            '0'..='9' => 0.556,
            '.' | ',' | ' ' => 0.278,
            '-' => 0.333,
            'A'..='Z' => 0.667,
            _ => 0.5,
        })
        .sum();
    em * size * PT_TO_MM
}

/// Greedy word wrap at `width` characters. Words longer than a line are
/// kept whole.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Renders a sheet into PDF bytes.
pub fn render_sheet(sheet: &InvoiceSheet) -> PdfResult<RenderedInvoice> {
    let mut canvas = Canvas::new(&sheet.title)?;

    draw_header(&mut canvas, sheet);
    draw_table_header(&mut canvas);
    for row in &sheet.rows {
        draw_row(&mut canvas, row);
    }
    draw_totals(&mut canvas, sheet);
    draw_footer(&mut canvas, sheet);

    debug!(title = %sheet.title, pages = canvas.pages, rows = sheet.rows.len(), "Invoice rendered");
    canvas.finish()
}

fn draw_header(canvas: &mut Canvas, sheet: &InvoiceSheet) {
    canvas.text(&sheet.company_name, 14.0, LEFT, true);
    canvas.down(6.0);
    canvas.text(&sheet.company_contact, 9.0, LEFT, false);
    canvas.down(4.5);
    canvas.text(&sheet.company_address, 9.0, LEFT, false);
    canvas.down(4.0);
    canvas.rule();
    canvas.down(6.0);

    canvas.text(&sheet.invoice_no, 10.0, LEFT, true);
    canvas.text(&sheet.date, 10.0, 141.0, true);
    canvas.down(8.0);

    if !sheet.bill_to.is_empty() {
        canvas.text("Bill To Address:", 10.0, LEFT, true);
        canvas.down(5.0);
        for line in &sheet.bill_to {
            for part in wrap(line, 50) {
                canvas.text(&part, 9.0, LEFT, false);
                canvas.down(4.0);
            }
        }
        canvas.down(3.0);
    }

    if let Some((number, dated)) = &sheet.work_order {
        canvas.text(number, 9.0, LEFT, false);
        if let Some(dated) = dated {
            canvas.text(dated, 9.0, 141.0, false);
        }
        canvas.down(4.5);
    }
    for line in [&sheet.project, &sheet.reference].into_iter().flatten() {
        canvas.text(line, 9.0, LEFT, false);
        canvas.down(4.5);
    }

    canvas.down(1.0);
    canvas.rule();
    canvas.down(5.0);
}

fn draw_table_header(canvas: &mut Canvas) {
    canvas.text("SL No", 9.0, COL_SL, true);
    canvas.text("Description", 9.0, COL_DESC, true);
    canvas.text("SAC Code", 9.0, COL_SAC, true);
    canvas.text("Unit", 9.0, COL_UNIT, true);
    canvas.text("Qty", 9.0, COL_QTY, true);
    canvas.text_right("Rate", 9.0, COL_RATE_RIGHT, true);
    canvas.text_right("Amount", 9.0, COL_AMOUNT_RIGHT, true);
    canvas.down(2.0);
    canvas.rule();
    canvas.down(5.0);
}

fn draw_row(canvas: &mut Canvas, row: &SheetRow) {
    let description = wrap(&row.description, DESC_WRAP);
    let height = ROW_HEIGHT * description.len() as f32;

    if canvas.ensure_space(height) {
        draw_table_header(canvas);
    }

    canvas.text(&row.sl_no, 9.0, COL_SL, false);
    canvas.text(&row.sac_code, 9.0, COL_SAC, false);
    canvas.text(&row.unit, 9.0, COL_UNIT, false);
    canvas.text(&row.quantity, 9.0, COL_QTY, false);
    canvas.text_right(&row.rate, 9.0, COL_RATE_RIGHT, false);
    canvas.text_right(&row.amount, 9.0, COL_AMOUNT_RIGHT, false);

    for (i, line) in description.iter().enumerate() {
        if i > 0 {
            canvas.down(ROW_HEIGHT);
        }
        canvas.text(line, 9.0, COL_DESC, false);
    }
    canvas.down(ROW_HEIGHT);
}

fn draw_totals(canvas: &mut Canvas, sheet: &InvoiceSheet) {
    canvas.ensure_space(30.0);
    canvas.rule();
    canvas.down(6.0);

    canvas.text_right("Total Amount", 10.0, COL_RATE_RIGHT, true);
    canvas.text_right(&sheet.total_amount, 10.0, COL_AMOUNT_RIGHT, true);
    canvas.down(5.5);

    if let Some(round_up) = &sheet.round_up {
        canvas.text_right("Round Up", 9.0, COL_RATE_RIGHT, false);
        canvas.text_right(round_up, 9.0, COL_AMOUNT_RIGHT, false);
        canvas.down(5.5);
    }

    canvas.text_right("Grand Total", 11.0, COL_RATE_RIGHT, true);
    canvas.text_right(&sheet.grand_total, 11.0, COL_AMOUNT_RIGHT, true);
    canvas.down(9.0);
}

fn draw_footer(canvas: &mut Canvas, sheet: &InvoiceSheet) {
    let words = wrap(&sheet.amount_in_words, WORDS_WRAP);
    canvas.ensure_space(10.0 + 4.5 * words.len() as f32);
    canvas.text("Rupees in Words:", 10.0, LEFT, true);
    canvas.down(5.0);
    for line in &words {
        canvas.text(line, 9.0, LEFT, false);
        canvas.down(4.5);
    }
    canvas.down(2.0);
    canvas.rule();
    canvas.down(6.0);

    if let Some(notes) = &sheet.notes {
        let lines = wrap(notes, 90);
        canvas.ensure_space(6.0 + 4.5 * lines.len() as f32);
        canvas.text("Notes", 10.0, LEFT, true);
        canvas.down(5.0);
        for line in &lines {
            canvas.text(line, 9.0, LEFT, false);
            canvas.down(4.5);
        }
        canvas.down(3.0);
    }

    canvas.ensure_space(12.0);
    canvas.text("Payment Terms", 10.0, LEFT, true);
    canvas.down(5.0);
    canvas.text(&sheet.payment_terms, 9.0, LEFT, false);
    canvas.down(8.0);

    canvas.ensure_space(6.0 + 4.5 * sheet.bank.len() as f32);
    canvas.text("Our Bank Details", 10.0, LEFT, true);
    canvas.down(5.0);
    for line in &sheet.bank {
        canvas.text(line, 9.0, LEFT, false);
        canvas.down(4.5);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("", 10), vec![String::new()]);
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("supercalifragilistic x", 5), vec!["supercalifragilistic", "x"]);
    }

    #[test]
    fn test_wrapped_words_rejoin_verbatim() {
        let words = "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven Rupees Eighty Nine Paise Only";
        assert_eq!(wrap(words, WORDS_WRAP).join(" "), words);
    }

    #[test]
    fn test_right_alignment_width_grows_with_text() {
        assert!(text_width_mm("1,00,000.00", 9.0) > text_width_mm("0.40", 9.0));
        assert_eq!(text_width_mm("", 9.0), 0.0);
    }
}
