//! Session-owned application state.

use serde::Serialize;

use invotech_clients::Client;
use invotech_invoicing::{DraftInvoice, Invoice};

/// Clients, invoices (newest first) and the draft being composed.
///
/// Plain owned data. The collection manager borrows it for each operation;
/// nothing else mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub(crate) clients: Vec<Client>,
    pub(crate) invoices: Vec<Invoice>,
    pub(crate) draft: DraftInvoice,
}

impl AppState {
    pub fn new(draft: DraftInvoice) -> Self {
        Self::from_parts(Vec::new(), Vec::new(), draft)
    }

    pub fn from_parts(clients: Vec<Client>, invoices: Vec<Invoice>, draft: DraftInvoice) -> Self {
        Self {
            clients,
            invoices,
            draft,
        }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn draft(&self) -> &DraftInvoice {
        &self.draft
    }
}
