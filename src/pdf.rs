//! Invoice document rendering.
//!
//! The engine sits behind `DocumentEngine` so settlement logic never touches
//! layout, and tests can swap in a faulting engine. A render fault leaves the
//! underlying sale untouched; the same invoice renders again once the fault
//! clears.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use thiserror::Error;

use crate::domain::invoice::{InvoiceDocument, BAKERY};
use crate::domain::report::ReportTable;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document engine fault: {0}")]
    Engine(String),
}

pub trait DocumentEngine: Send + Sync {
    fn render(&self, invoice: &InvoiceDocument) -> Result<Vec<u8>, RenderError>;
    fn render_report(&self, report: &ReportTable) -> Result<Vec<u8>, RenderError>;
}

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: Mm = Mm(20.0);
const LINE_HEIGHT: Mm = Mm(7.0);
const HALF_LINE: Mm = Mm(3.5);
const FOOTER_TOP: Mm = Mm(35.0);
const PAGE_BREAK_AT: Mm = Mm(42.0);
const COL_MID: Mm = Mm(110.0);
const TABLE_COLS: [Mm; 4] = [Mm(20.0), Mm(85.0), Mm(125.0), Mm(165.0)];
const COL_RIGHT: Mm = Mm(165.0);
const COL_VALUE: Mm = Mm(65.0);
const TOP: Mm = Mm(277.0);

/// A4 invoice layout with builtin Helvetica, modeled on the shop's paper
/// receipts: header, bakery block, itemized lines, cash tender, total,
/// banking footer.
pub struct PdfEngine;

struct Cursor {
    doc: printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: Mm,
}

impl Cursor {
    fn title(&mut self, text: &str) {
        self.layer.use_text(text, 20.0, MARGIN, self.y, &self.bold);
        self.advance();
    }

    fn heading(&mut self, text: &str) {
        self.break_page_if_needed();
        self.layer.use_text(text, 12.0, MARGIN, self.y, &self.bold);
        self.advance();
    }

    fn body(&mut self, text: &str) {
        self.break_page_if_needed();
        self.layer.use_text(text, 11.0, MARGIN, self.y, &self.regular);
        self.advance();
    }

    fn small(&mut self, text: &str, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, 10.0, MARGIN, self.y, font);
        self.advance();
    }

    fn labeled(&mut self, label: &str, value: &str) {
        self.break_page_if_needed();
        self.layer.use_text(label, 11.0, MARGIN, self.y, &self.bold);
        self.layer.use_text(value, 11.0, COL_VALUE, self.y, &self.regular);
        self.advance();
    }

    fn row(&mut self, left: &str, mid: &str, right: &str) {
        self.break_page_if_needed();
        self.layer.use_text(left, 11.0, MARGIN, self.y, &self.regular);
        self.layer.use_text(mid, 11.0, COL_MID, self.y, &self.regular);
        self.layer.use_text(right, 11.0, COL_RIGHT, self.y, &self.regular);
        self.advance();
    }

    fn table_row(&mut self, cells: &[&str; 4], bold: bool) {
        self.break_page_if_needed();
        let font = if bold { &self.bold } else { &self.regular };
        for (cell, x) in cells.iter().zip(TABLE_COLS) {
            self.layer.use_text(*cell, 10.0, x, self.y, font);
        }
        self.advance();
    }

    fn separator(&mut self) {
        self.break_page_if_needed();
        self.layer
            .use_text("-".repeat(78), 10.0, MARGIN, self.y, &self.regular);
        self.advance();
    }

    fn half_skip(&mut self) {
        self.y = self.y - HALF_LINE;
    }

    fn advance(&mut self) {
        self.y = self.y - LINE_HEIGHT;
    }

    fn break_page_if_needed(&mut self) {
        if self.y < PAGE_BREAK_AT {
            let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "invoice");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP;
        }
    }
}

impl DocumentEngine for PdfEngine {
    fn render(&self, invoice: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
        let title = format!("Factura #{}", invoice.invoice_id);
        let (doc, page, layer) = PdfDocument::new(&title, PAGE_WIDTH, PAGE_HEIGHT, "invoice");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Engine(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Engine(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut c = Cursor { doc, layer, regular, bold, y: TOP };

        c.title(&title);
        c.half_skip();
        c.labeled("Issued:", &invoice.formatted_date());
        c.labeled("Transaction:", &invoice.transaction_id);
        c.labeled("Payment method:", &invoice.payment_method);
        c.labeled("Status:", &invoice.status);
        c.half_skip();
        c.heading(BAKERY.name);
        c.body(BAKERY.phone);
        c.body(BAKERY.address);
        c.half_skip();

        c.separator();
        c.heading("Products");
        for line in &invoice.lines {
            c.row(
                &line.product_name,
                &format!("${} x {}", line.unit_price, line.quantity),
                &format!("${}", line.line_total),
            );
        }
        c.separator();

        if invoice.is_cash() {
            if let (Some(received), Some(change)) = (invoice.amount_received, invoice.change) {
                c.labeled("Amount received:", &format!("${received}"));
                c.labeled("Change:", &format!("${change}"));
            }
        }
        c.labeled("Total:", &format!("${}", invoice.total));

        // Footer pinned to the bottom of the last page.
        c.y = FOOTER_TOP;
        c.small("Banking details:", true);
        c.small(&format!("{}  {}", BAKERY.bank, BAKERY.bank_account), false);
        c.small("Contact:", true);
        c.small(&format!("{}  {}", BAKERY.email, BAKERY.phone), false);

        c.doc
            .save_to_bytes()
            .map_err(|e| RenderError::Engine(e.to_string()))
    }

    fn render_report(&self, report: &ReportTable) -> Result<Vec<u8>, RenderError> {
        let (doc, page, layer) =
            PdfDocument::new(&report.title, PAGE_WIDTH, PAGE_HEIGHT, "report");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Engine(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Engine(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut c = Cursor { doc, layer, regular, bold, y: TOP };

        c.title(&report.title);
        c.body(&report.subtitle);
        c.half_skip();
        c.heading(BAKERY.name);
        c.half_skip();

        c.separator();
        c.table_row(&report.columns, true);
        c.separator();
        for row in &report.rows {
            let cells = [
                row[0].as_str(),
                row[1].as_str(),
                row[2].as_str(),
                row[3].as_str(),
            ];
            c.table_row(&cells, false);
        }
        c.separator();

        if let Some((label, value)) = &report.summary {
            c.labeled(label, value);
        }

        c.y = FOOTER_TOP;
        c.small("Contact:", true);
        c.small(&format!("{}  {}", BAKERY.email, BAKERY.phone), false);

        c.doc
            .save_to_bytes()
            .map_err(|e| RenderError::Engine(e.to_string()))
    }
}
