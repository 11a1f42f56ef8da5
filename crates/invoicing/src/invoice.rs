use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invotech_clients::ClientId;
use invotech_core::{Aggregate, AggregateRoot, DomainError, Entity, entity_id};
use invotech_events::Event;

use crate::line_item::LineItem;
use crate::totals::{InvoiceTotals, calculate_totals};

entity_id!(
    /// Invoice identifier.
    InvoiceId
);

/// Invoice status lifecycle.
///
/// `Unpaid` is the only non-terminal state: it may move to `Paid` or
/// `Overdue`. Nothing moves back to `Unpaid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        matches!(
            (self, next),
            (InvoiceStatus::Unpaid, InvoiceStatus::Paid)
                | (InvoiceStatus::Unpaid, InvoiceStatus::Overdue)
        )
    }

    pub fn is_terminal(self) -> bool {
        self != InvoiceStatus::Unpaid
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            other => Err(DomainError::validation(format!(
                "unknown invoice status: {other:?}"
            ))),
        }
    }
}

/// `prefix` + running number zero-padded to `width` (`"INV-2024-" + 1` -> `"INV-2024-001"`).
pub fn format_invoice_number(prefix: &str, sequence: usize, width: usize) -> String {
    format!("{prefix}{sequence:0width$}")
}

/// Longest accepted payment term in days (ten years).
pub const MAX_PAYMENT_TERMS_DAYS: i64 = 3650;

/// Due date `days` after `issue_date`.
///
/// Terms outside `0..=MAX_PAYMENT_TERMS_DAYS` are rejected rather than
/// wrapped or clamped.
pub fn due_date_after(issue_date: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, DomainError> {
    if !(0..=MAX_PAYMENT_TERMS_DAYS).contains(&days) {
        return Err(DomainError::validation(format!(
            "payment terms out of range: {days} days (max {MAX_PAYMENT_TERMS_DAYS})"
        )));
    }
    Duration::try_days(days)
        .and_then(|delta| issue_date.checked_add_signed(delta))
        .ok_or_else(|| DomainError::validation("payment terms out of range"))
}

/// Aggregate root: Invoice.
///
/// Immutable once issued except for its status. `client_name` is a snapshot
/// taken at issue time and is not kept in sync with the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: String,
    client_id: Option<ClientId>,
    client_name: String,
    issue_date: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    payment_terms: String,
    tax_rate: Decimal,
    total: Decimal,
    status: InvoiceStatus,
    line_items: Vec<LineItem>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-issued instance.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            invoice_number: String::new(),
            client_id: None,
            client_name: String::new(),
            issue_date: None,
            due_date: None,
            payment_terms: String::new(),
            tax_rate: Decimal::ZERO,
            total: Decimal::ZERO,
            status: InvoiceStatus::Unpaid,
            line_items: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn issue_date(&self) -> Option<DateTime<Utc>> {
        self.issue_date
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn payment_terms(&self) -> &str {
        &self.payment_terms
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Full breakdown, recomputed from the line items.
    pub fn totals(&self) -> Result<InvoiceTotals, DomainError> {
        calculate_totals(&self.line_items, self.tax_rate)
    }

    /// Unpaid and due strictly before `now`.
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.status == InvoiceStatus::Unpaid && self.due_date.is_some_and(|due| due < now)
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Invoice {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub client_id: ClientId,
    pub client_name: String,
    pub line_items: Vec<LineItem>,
    pub payment_terms: String,
    pub tax_rate: Decimal,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Command: ChangeStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub invoice_id: InvoiceId,
    pub status: InvoiceStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    IssueInvoice(IssueInvoice),
    ChangeStatus(ChangeStatus),
}

/// Event: InvoiceIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIssued {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub client_id: ClientId,
    pub client_name: String,
    pub line_items: Vec<LineItem>,
    pub payment_terms: String,
    pub tax_rate: Decimal,
    pub total: Decimal,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Event: InvoiceStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceStatusChanged {
    pub invoice_id: InvoiceId,
    pub from: InvoiceStatus,
    pub to: InvoiceStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceIssued(InvoiceIssued),
    InvoiceStatusChanged(InvoiceStatusChanged),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceIssued(_) => "invoicing.invoice.issued",
            InvoiceEvent::InvoiceStatusChanged(_) => "invoicing.invoice.status_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceIssued(e) => e.issue_date,
            InvoiceEvent::InvoiceStatusChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceIssued(e) => {
                self.id = e.invoice_id.clone();
                self.invoice_number = e.invoice_number.clone();
                self.client_id = Some(e.client_id.clone());
                self.client_name = e.client_name.clone();
                self.line_items = e.line_items.clone();
                self.payment_terms = e.payment_terms.clone();
                self.tax_rate = e.tax_rate;
                self.total = e.total;
                self.issue_date = Some(e.issue_date);
                self.due_date = Some(e.due_date);
                self.status = InvoiceStatus::Unpaid;
                self.created = true;
            }
            InvoiceEvent::InvoiceStatusChanged(e) => {
                self.status = e.to;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::IssueInvoice(cmd) => self.handle_issue(cmd),
            InvoiceCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
        }
    }
}

impl Invoice {
    fn ensure_invoice_id(&self, invoice_id: &InvoiceId) -> Result<(), DomainError> {
        if &self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn handle_issue(&self, cmd: &IssueInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }

        if cmd.line_items.is_empty() {
            return Err(DomainError::validation(
                "cannot issue invoice without line items",
            ));
        }
        for (position, item) in cmd.line_items.iter().enumerate() {
            item.check_complete(position)?;
        }
        if cmd.due_date < cmd.issue_date {
            return Err(DomainError::invariant("due date precedes issue date"));
        }

        let totals = calculate_totals(&cmd.line_items, cmd.tax_rate)?;

        Ok(vec![InvoiceEvent::InvoiceIssued(InvoiceIssued {
            invoice_id: cmd.invoice_id.clone(),
            invoice_number: cmd.invoice_number.clone(),
            client_id: cmd.client_id.clone(),
            client_name: cmd.client_name.clone(),
            line_items: cmd.line_items.clone(),
            payment_terms: cmd.payment_terms.clone(),
            tax_rate: cmd.tax_rate,
            total: totals.total,
            issue_date: cmd.issue_date,
            due_date: cmd.due_date,
        })])
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("invoice {}", cmd.invoice_id)));
        }
        self.ensure_invoice_id(&cmd.invoice_id)?;

        if !self.status.can_transition_to(cmd.status) {
            return Err(DomainError::invalid_transition(self.status, cmd.status));
        }

        Ok(vec![InvoiceEvent::InvoiceStatusChanged(InvoiceStatusChanged {
            invoice_id: cmd.invoice_id.clone(),
            from: self.status,
            to: cmd.status,
            occurred_at: cmd.occurred_at,
        })])
    }
}
