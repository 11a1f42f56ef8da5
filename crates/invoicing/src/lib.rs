//! Invoicing domain module.
//!
//! Line items, the invoice calculator, the draft invoice editor, the Invoice
//! aggregate with its status lifecycle, and invoice list filtering. Pure,
//! deterministic domain logic (no IO, no storage).

pub mod draft;
pub mod filter;
pub mod invoice;
pub mod line_item;
pub mod totals;

pub use draft::DraftInvoice;
pub use filter::{StatusFilter, filter_invoices};
pub use invoice::{
    ChangeStatus, Invoice, InvoiceCommand, InvoiceEvent, InvoiceId, InvoiceIssued, InvoiceStatus,
    InvoiceStatusChanged, IssueInvoice, MAX_PAYMENT_TERMS_DAYS, due_date_after,
    format_invoice_number,
};
pub use line_item::{LineItem, LineItemId, LineItemUpdate};
pub use totals::{DEFAULT_TAX_RATE, InvoiceTotals, calculate_totals, format_currency};
