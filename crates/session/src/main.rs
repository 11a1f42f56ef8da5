use anyhow::Context;
use rust_decimal::Decimal;
use serde_json::json;

use invotech_core::Entity;
use invotech_invoicing::{LineItemUpdate, StatusFilter, format_currency};
use invotech_session::{CollectionManager, InvoicingConfig, seed};

/// Demo run: seed the session, issue one invoice, print the invoice list.
///
/// Usage: `invotech [SEARCH] [STATUS]` where STATUS is all|unpaid|paid|overdue.
fn main() -> anyhow::Result<()> {
    invotech_observability::init();

    let config = InvoicingConfig::from_env().context("loading invoicing config")?;
    let manager = CollectionManager::new(config);
    let mut state = seed::demo_state(&manager)?;

    let client_id = state
        .clients()
        .last()
        .map(|client| client.id().clone())
        .context("demo session has no clients")?;
    manager.select_client(&mut state, &client_id)?;
    manager.update_line_item(
        &mut state,
        0,
        LineItemUpdate::Description("Cloud Migration Assessment".to_string()),
    )?;
    manager.update_line_item(&mut state, 0, LineItemUpdate::Hours(Decimal::from(12)))?;
    manager.update_line_item(&mut state, 0, LineItemUpdate::Rate(Decimal::from(160)))?;
    manager.create_invoice(&mut state)?;
    manager.flag_overdue(&mut state);

    let mut args = std::env::args().skip(1);
    let search = args.next().unwrap_or_default();
    let status: StatusFilter = match args.next() {
        Some(raw) => raw.parse()?,
        None => StatusFilter::All,
    };

    let listing: Vec<_> = manager
        .filter_invoices(&state, &search, status)
        .into_iter()
        .map(|invoice| {
            json!({
                "invoiceNumber": invoice.invoice_number(),
                "client": invoice.client_name(),
                "status": invoice.status(),
                "issueDate": invoice.issue_date(),
                "dueDate": invoice.due_date(),
                "total": format_currency(invoice.total()),
            })
        })
        .collect();

    let summary = manager.summary(&state)?;
    let output = json!({
        "invoices": listing,
        "summary": {
            "invoiceCount": summary.invoice_count,
            "clientCount": summary.client_count,
            "pending": format_currency(summary.pending_amount),
            "paid": format_currency(summary.paid_amount),
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
