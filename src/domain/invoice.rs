//! Structured invoice data handed to the document engine.
//!
//! Built from a persisted sale and its line snapshots; the layout concerns
//! live in `pdf.rs`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Fixed identity block printed on every invoice.
pub struct BakeryContact {
    pub name: &'static str,
    pub phone: &'static str,
    pub address: &'static str,
    pub email: &'static str,
    pub bank: &'static str,
    pub bank_account: &'static str,
}

pub const BAKERY: BakeryContact = BakeryContact {
    name: "Panadería Alemana",
    phone: "8-8888-8888",
    address: "Alto Boquete, Chiriquí, Panamá",
    email: "pasteleriaalemana@gmail.com",
    bank: "Banco General",
    bank_account: "0-12345-6789",
};

pub struct InvoiceLine {
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Everything the renderer needs; deliberately free of database types.
pub struct InvoiceDocument {
    pub invoice_id: String,
    pub transaction_id: String,
    pub issued_at: DateTime<Utc>,
    pub payment_method: String,
    pub status: String,
    pub lines: Vec<InvoiceLine>,
    pub total: Decimal,
    /// Cash sales only; printed above the total.
    pub amount_received: Option<Decimal>,
    pub change: Option<Decimal>,
}

impl InvoiceDocument {
    pub fn formatted_date(&self) -> String {
        self.issued_at.format("%A, %e %B %Y, %H:%M").to_string()
    }

    pub fn is_cash(&self) -> bool {
        self.payment_method == "cash"
    }
}
