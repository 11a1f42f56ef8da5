//! Dashboard figures computed from the session state.

use rust_decimal::Decimal;
use serde::Serialize;

use invotech_core::{DomainError, DomainResult};
use invotech_invoicing::InvoiceStatus;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub invoice_count: usize,
    pub client_count: usize,
    pub unpaid_count: usize,
    pub overdue_count: usize,
    pub paid_count: usize,
    /// Totals of invoices still awaiting payment (unpaid + overdue).
    pub pending_amount: Decimal,
    pub paid_amount: Decimal,
}

impl SessionSummary {
    /// Fails only when a running amount no longer fits in a `Decimal`.
    pub fn of(state: &AppState) -> DomainResult<Self> {
        let mut summary = Self {
            invoice_count: state.invoices().len(),
            client_count: state.clients().len(),
            unpaid_count: 0,
            overdue_count: 0,
            paid_count: 0,
            pending_amount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
        };

        for invoice in state.invoices() {
            match invoice.status() {
                InvoiceStatus::Unpaid => {
                    summary.unpaid_count += 1;
                    summary.pending_amount = add(summary.pending_amount, invoice.total())?;
                }
                InvoiceStatus::Overdue => {
                    summary.overdue_count += 1;
                    summary.pending_amount = add(summary.pending_amount, invoice.total())?;
                }
                InvoiceStatus::Paid => {
                    summary.paid_count += 1;
                    summary.paid_amount = add(summary.paid_amount, invoice.total())?;
                }
            }
        }

        Ok(summary)
    }
}

fn add(running: Decimal, amount: Decimal) -> DomainResult<Decimal> {
    running
        .checked_add(amount)
        .ok_or_else(|| DomainError::validation("summary amount out of range"))
}
