//! Collection manager: every mutation of the session's clients, invoices and
//! draft goes through here.
//!
//! Each operation validates before it mutates, so a failed call leaves the
//! state untouched. Outcomes are reported to the notification sink; the
//! returned `DomainResult` is the authoritative result.

use rust_decimal::Decimal;

use invotech_clients::{
    Client, ClientCommand, ClientDetails, ClientId, RegisterClient, UpdateClient,
};
use invotech_core::{
    Aggregate, Clock, DomainError, DomainResult, Entity, IdGenerator, Notification, NotificationSink,
    SystemClock, TracingNotifier, UuidIdGenerator, find_by_id, position_of,
};
use invotech_invoicing::{
    ChangeStatus, DraftInvoice, Invoice, InvoiceCommand, InvoiceId, InvoiceStatus, IssueInvoice,
    LineItemId, LineItemUpdate, StatusFilter, due_date_after, filter_invoices,
    format_invoice_number,
};

use crate::config::InvoicingConfig;
use crate::state::AppState;
use crate::summary::SessionSummary;

/// Operations over [`AppState`], parameterized over the identity source,
/// the clock and the notification sink.
#[derive(Debug)]
pub struct CollectionManager<G = UuidIdGenerator, C = SystemClock, N = TracingNotifier> {
    config: InvoicingConfig,
    ids: G,
    clock: C,
    notifier: N,
}

impl CollectionManager {
    /// UUIDv7 ids, wall-clock time, notifications logged through tracing.
    pub fn new(config: InvoicingConfig) -> Self {
        Self::with_capabilities(config, UuidIdGenerator, SystemClock, TracingNotifier)
    }
}

impl<G, C, N> CollectionManager<G, C, N>
where
    G: IdGenerator,
    C: Clock,
    N: NotificationSink,
{
    pub fn with_capabilities(config: InvoicingConfig, ids: G, clock: C, notifier: N) -> Self {
        Self {
            config,
            ids,
            clock,
            notifier,
        }
    }

    pub fn config(&self) -> &InvoicingConfig {
        &self.config
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn ids(&self) -> &G {
        &self.ids
    }

    /// Empty session: no clients, no invoices, a fresh draft.
    pub fn new_state(&self) -> AppState {
        AppState::new(self.fresh_draft())
    }

    pub fn fresh_draft(&self) -> DraftInvoice {
        DraftInvoice::new(
            self.ids.next_id(),
            self.config.default_payment_terms.clone(),
            self.config.default_tax_rate,
        )
    }

    fn report<T>(&self, operation: &'static str, result: DomainResult<T>) -> DomainResult<T> {
        if let Err(err) = &result {
            tracing::warn!(operation, error = %err, "operation rejected");
            self.notifier.notify(Notification::error(err.to_string()));
        }
        result
    }

    /// Append a blank line item with a fresh id.
    pub fn add_line_item(&self, state: &mut AppState) -> LineItemId {
        let item = state.draft.add_line_item(self.ids.next_id());
        tracing::debug!(line_item_id = %item.id(), "line item added");
        item.id().clone()
    }

    /// Replace one field of the line item at `index`; hours/rate edits
    /// recompute its subtotal.
    pub fn update_line_item(
        &self,
        state: &mut AppState,
        index: usize,
        update: LineItemUpdate,
    ) -> DomainResult<()> {
        let result = state
            .draft
            .update_line_item(index, update)
            .map(|item| tracing::debug!(index, subtotal = %item.subtotal(), "line item updated"));
        self.report("update_line_item", result)
    }

    /// Remove the line item at `index`. Returns `Ok(false)` (no-op) when it
    /// is the only item left.
    pub fn remove_line_item(&self, state: &mut AppState, index: usize) -> DomainResult<bool> {
        let result = state.draft.remove_line_item(index);
        if let Ok(removed) = &result {
            tracing::debug!(index, removed, "line item removal");
        }
        self.report("remove_line_item", result)
    }

    pub fn select_client(&self, state: &mut AppState, client_id: &ClientId) -> DomainResult<()> {
        let result = match find_by_id(&state.clients, client_id) {
            Some(_) => {
                state.draft.client_id = Some(client_id.clone());
                Ok(())
            }
            None => Err(DomainError::not_found(format!("client {client_id}"))),
        };
        self.report("select_client", result)
    }

    pub fn set_tax_rate(&self, state: &mut AppState, tax_rate: Decimal) -> DomainResult<()> {
        let result = if tax_rate.is_sign_negative() {
            Err(DomainError::validation("tax rate must not be negative"))
        } else {
            state.draft.tax_rate = tax_rate;
            Ok(())
        };
        self.report("set_tax_rate", result)
    }

    pub fn set_payment_terms(&self, state: &mut AppState, terms: impl Into<String>) {
        state.draft.payment_terms = terms.into();
    }

    /// Turn the draft into an invoice, prepend it, and reset the draft.
    pub fn create_invoice(&self, state: &mut AppState) -> DomainResult<InvoiceId> {
        let result = self.issue_from_draft(state);
        if let Ok(invoice) = &result {
            tracing::info!(
                invoice_id = %invoice.id(),
                invoice_number = invoice.invoice_number(),
                total = %invoice.total(),
                "invoice created"
            );
            self.notifier.notify(Notification::success(format!(
                "Invoice {} created successfully!",
                invoice.invoice_number()
            )));
        }
        let invoice = self.report("create_invoice", result)?;

        let id = invoice.id().clone();
        state.invoices.insert(0, invoice);
        state.draft = self.fresh_draft();
        Ok(id)
    }

    fn issue_from_draft(&self, state: &AppState) -> DomainResult<Invoice> {
        let client_id = state.draft.validate()?;
        let client = find_by_id(&state.clients, client_id)
            .ok_or_else(|| DomainError::not_found(format!("client {client_id}")))?;

        let issue_date = self.clock.now();
        let days = state
            .draft
            .net_days()
            .unwrap_or(self.config.payment_terms_days);
        let due_date = due_date_after(issue_date, days)?;
        let invoice_id = InvoiceId::new(self.ids.next_id());

        let mut invoice = Invoice::empty(invoice_id.clone());
        invoice.execute(&InvoiceCommand::IssueInvoice(IssueInvoice {
            invoice_id,
            invoice_number: format_invoice_number(
                &self.config.invoice_prefix,
                state.invoices.len() + 1,
                self.config.number_width,
            ),
            client_id: client_id.clone(),
            client_name: client.company_name().to_string(),
            line_items: state.draft.line_items().to_vec(),
            payment_terms: state.draft.payment_terms.clone(),
            tax_rate: state.draft.tax_rate,
            issue_date,
            due_date,
        }))?;
        Ok(invoice)
    }

    /// Move one invoice to `new_status`. Only `unpaid -> paid` and
    /// `unpaid -> overdue` are allowed.
    pub fn update_invoice_status(
        &self,
        state: &mut AppState,
        invoice_id: &InvoiceId,
        new_status: InvoiceStatus,
    ) -> DomainResult<()> {
        let result = self.change_status(state, invoice_id, new_status);
        if result.is_ok() {
            tracing::info!(invoice_id = %invoice_id, status = %new_status, "invoice status changed");
            self.notifier
                .notify(Notification::success(format!("Invoice marked as {new_status}")));
        }
        self.report("update_invoice_status", result)
    }

    fn change_status(
        &self,
        state: &mut AppState,
        invoice_id: &InvoiceId,
        new_status: InvoiceStatus,
    ) -> DomainResult<()> {
        let position = position_of(&state.invoices, invoice_id)
            .ok_or_else(|| DomainError::not_found(format!("invoice {invoice_id}")))?;

        let mut updated = state.invoices[position].clone();
        updated.execute(&InvoiceCommand::ChangeStatus(ChangeStatus {
            invoice_id: invoice_id.clone(),
            status: new_status,
            occurred_at: self.clock.now(),
        }))?;
        state.invoices[position] = updated;
        Ok(())
    }

    /// Mark every unpaid invoice whose due date has passed as overdue.
    ///
    /// Overdue is never applied implicitly; this is the explicit action.
    pub fn flag_overdue(&self, state: &mut AppState) -> Vec<InvoiceId> {
        let now = self.clock.now();
        let due: Vec<InvoiceId> = state
            .invoices
            .iter()
            .filter(|invoice| invoice.is_past_due(now))
            .map(|invoice| invoice.id().clone())
            .collect();

        let mut flagged = Vec::with_capacity(due.len());
        for invoice_id in due {
            match self.change_status(state, &invoice_id, InvoiceStatus::Overdue) {
                Ok(()) => flagged.push(invoice_id),
                Err(err) => tracing::warn!(invoice_id = %invoice_id, error = %err, "could not flag overdue"),
            }
        }

        if !flagged.is_empty() {
            tracing::info!(count = flagged.len(), "invoices flagged overdue");
            self.notifier.notify(Notification::info(format!(
                "{} invoice(s) marked as overdue",
                flagged.len()
            )));
        }
        flagged
    }

    /// Case-insensitive search on client name / invoice number plus a status
    /// filter. Order-preserving; does not touch the state.
    pub fn filter_invoices<'s>(
        &self,
        state: &'s AppState,
        search_term: &str,
        status_filter: StatusFilter,
    ) -> Vec<&'s Invoice> {
        let found = filter_invoices(&state.invoices, search_term, status_filter);
        tracing::debug!(search_term, ?status_filter, matched = found.len(), "invoices filtered");
        found
    }

    pub fn summary(&self, state: &AppState) -> DomainResult<SessionSummary> {
        SessionSummary::of(state)
    }

    /// Register a new client profile and append it.
    pub fn add_client(&self, state: &mut AppState, details: ClientDetails) -> DomainResult<ClientId> {
        let result = details.validate().and_then(|()| {
            let client_id = ClientId::new(self.ids.next_id());
            let mut client = Client::empty(client_id.clone());
            client.execute(&ClientCommand::RegisterClient(RegisterClient {
                client_id,
                details,
                occurred_at: self.clock.now(),
            }))?;
            Ok(client)
        });
        let client = self.report("add_client", result)?;

        let client_id = client.id().clone();
        tracing::info!(client_id = %client_id, company = client.company_name(), "client added");
        self.notifier
            .notify(Notification::success("Client profile added successfully!"));
        state.clients.push(client);
        Ok(client_id)
    }

    /// Edit a client profile. Invoices already issued keep the client name
    /// they were created with.
    pub fn update_client(
        &self,
        state: &mut AppState,
        client_id: &ClientId,
        details: ClientDetails,
    ) -> DomainResult<()> {
        let result = position_of(&state.clients, client_id)
            .ok_or_else(|| DomainError::not_found(format!("client {client_id}")))
            .and_then(|position| {
                let mut updated = state.clients[position].clone();
                updated.execute(&ClientCommand::UpdateClient(UpdateClient {
                    client_id: client_id.clone(),
                    details,
                    occurred_at: self.clock.now(),
                }))?;
                Ok((position, updated))
            });
        let (position, updated) = self.report("update_client", result)?;

        tracing::info!(client_id = %client_id, "client updated");
        self.notifier
            .notify(Notification::success("Client profile updated successfully!"));
        state.clients[position] = updated;
        Ok(())
    }
}
