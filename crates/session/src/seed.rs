//! Demo session data: three clients and two invoices.

use chrono::Duration;
use rust_decimal::Decimal;

use invotech_clients::{BillingAddress, Client, ClientDetails, register};
use invotech_core::{Aggregate, Clock, DomainResult, Entity, IdGenerator, NotificationSink};
use invotech_invoicing::{
    ChangeStatus, Invoice, InvoiceCommand, InvoiceId, InvoiceStatus, IssueInvoice, LineItem,
    due_date_after, format_invoice_number,
};

use crate::manager::CollectionManager;
use crate::state::AppState;

fn details(
    company_name: &str,
    email: &str,
    contact_person: &str,
    phone: &str,
    address: [&str; 5],
) -> ClientDetails {
    let [street, city, state, postal_code, country] = address;
    ClientDetails {
        company_name: company_name.to_string(),
        email: email.to_string(),
        contact_person: contact_person.to_string(),
        phone: phone.to_string(),
        billing_address: BillingAddress {
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            postal_code: postal_code.to_string(),
            country: country.to_string(),
        },
    }
}

/// Build the demo session through the same aggregates the manager uses.
///
/// Invoices are ordered newest first: `INV-2024-001` (TechCorp, unpaid,
/// issued now) then `INV-2024-002` (Digital Innovations, paid, issued 15
/// days ago). The next invoice created gets number 003.
pub fn demo_state<G, C, N>(manager: &CollectionManager<G, C, N>) -> DomainResult<AppState>
where
    G: IdGenerator,
    C: Clock,
    N: NotificationSink,
{
    let ids = manager.ids();
    let now = manager.clock().now();
    let config = manager.config();

    let clients = vec![
        register(
            ids.next_id(),
            details(
                "TechCorp Solutions",
                "billing@techcorp.com",
                "John Smith",
                "+1 (555) 123-4567",
                ["123 Technology Drive", "San Francisco", "CA", "94105", "United States"],
            ),
            now,
        )?,
        register(
            ids.next_id(),
            details(
                "Digital Innovations LLC",
                "accounts@diginnovate.com",
                "Sarah Johnson",
                "+1 (555) 987-6543",
                ["456 Innovation Boulevard", "Austin", "TX", "73301", "United States"],
            ),
            now,
        )?,
        register(
            ids.next_id(),
            details(
                "CloudFirst Systems",
                "finance@cloudfirst.io",
                "Mike Chen",
                "+1 (555) 555-0123",
                ["789 Cloud Street", "Seattle", "WA", "98101", "United States"],
            ),
            now,
        )?,
    ];

    let issue = |sequence: usize, client: &Client, lines: &[(&str, i64, i64)], days_ago: i64| {
        let invoice_id = InvoiceId::new(ids.next_id());
        let issue_date = now - Duration::days(days_ago);
        let line_items = lines
            .iter()
            .map(|(description, hours, rate)| {
                LineItem::new(
                    ids.next_id(),
                    *description,
                    Decimal::from(*hours),
                    Decimal::from(*rate),
                )
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let mut invoice = Invoice::empty(invoice_id.clone());
        invoice.execute(&InvoiceCommand::IssueInvoice(IssueInvoice {
            invoice_id,
            invoice_number: format_invoice_number(
                &config.invoice_prefix,
                sequence,
                config.number_width,
            ),
            client_id: client.id().clone(),
            client_name: client.company_name().to_string(),
            line_items,
            payment_terms: config.default_payment_terms.clone(),
            tax_rate: config.default_tax_rate,
            issue_date,
            due_date: due_date_after(issue_date, config.payment_terms_days)?,
        }))?;
        DomainResult::Ok(invoice)
    };

    let first = issue(
        1,
        &clients[0],
        &[("Network Security Audit", 20, 150), ("System Configuration", 8, 125)],
        0,
    )?;
    let mut second = issue(2, &clients[1], &[("Database Optimization", 15, 175)], 15)?;
    second.execute(&InvoiceCommand::ChangeStatus(ChangeStatus {
        invoice_id: second.id().clone(),
        status: InvoiceStatus::Paid,
        occurred_at: now,
    }))?;

    tracing::info!(clients = clients.len(), invoices = 2, "demo session seeded");
    Ok(AppState::from_parts(
        clients,
        vec![first, second],
        manager.fresh_draft(),
    ))
}
