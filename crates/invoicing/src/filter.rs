//! Invoice list filtering.

use invotech_core::DomainError;

use crate::invoice::{Invoice, InvoiceStatus};

/// Status filter for the invoice list: everything, or one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(InvoiceStatus),
}

impl StatusFilter {
    pub fn matches(self, status: InvoiceStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl From<InvoiceStatus> for StatusFilter {
    fn from(value: InvoiceStatus) -> Self {
        StatusFilter::Only(value)
    }
}

impl core::str::FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<InvoiceStatus>().map(StatusFilter::Only)
    }
}

/// Invoices whose client name or invoice number contains `search_term`
/// (case-insensitive) and whose status passes `status_filter`.
///
/// Order-preserving. An empty search term matches every invoice.
pub fn filter_invoices<'a>(
    invoices: &'a [Invoice],
    search_term: &str,
    status_filter: StatusFilter,
) -> Vec<&'a Invoice> {
    let needle = search_term.to_lowercase();
    invoices
        .iter()
        .filter(|invoice| {
            let matches_search = invoice.client_name().to_lowercase().contains(&needle)
                || invoice.invoice_number().to_lowercase().contains(&needle);
            matches_search && status_filter.matches(invoice.status())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use invotech_clients::ClientId;
    use invotech_core::{Aggregate, EntityId};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use crate::invoice::{ChangeStatus, InvoiceCommand, InvoiceId, IssueInvoice, format_invoice_number};
    use crate::line_item::LineItem;

    fn invoice(seq: usize, client: &str, status: InvoiceStatus) -> Invoice {
        let id = InvoiceId::new(EntityId::from_raw(format!("inv-{seq}")));
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut invoice = Invoice::empty(id.clone());
        invoice
            .execute(&InvoiceCommand::IssueInvoice(IssueInvoice {
                invoice_id: id.clone(),
                invoice_number: format_invoice_number("INV-2024-", seq, 3),
                client_id: ClientId::new(EntityId::from_raw("c")),
                client_name: client.to_string(),
                line_items: vec![LineItem::new(
                    EntityId::from_raw("1"),
                    "Work",
                    Decimal::ONE,
                    Decimal::TEN,
                )
                .unwrap()],
                payment_terms: "Net 30".to_string(),
                tax_rate: Decimal::ZERO,
                issue_date: at,
                due_date: at + Duration::days(30),
            }))
            .unwrap();
        if status != InvoiceStatus::Unpaid {
            invoice
                .execute(&InvoiceCommand::ChangeStatus(ChangeStatus {
                    invoice_id: id,
                    status,
                    occurred_at: at,
                }))
                .unwrap();
        }
        invoice
    }

    fn sample() -> Vec<Invoice> {
        vec![
            invoice(3, "TechCorp Solutions", InvoiceStatus::Unpaid),
            invoice(2, "Digital Innovations LLC", InvoiceStatus::Paid),
            invoice(1, "TechCorp Solutions", InvoiceStatus::Paid),
        ]
    }

    fn numbers(found: &[&Invoice]) -> Vec<String> {
        found.iter().map(|i| i.invoice_number().to_string()).collect()
    }

    #[test]
    fn search_is_case_insensitive_and_order_preserving() {
        let invoices = sample();
        let found = filter_invoices(&invoices, "techcorp", StatusFilter::All);
        assert_eq!(numbers(&found), vec!["INV-2024-003", "INV-2024-001"]);
    }

    #[test]
    fn search_matches_invoice_number() {
        let invoices = sample();
        let found = filter_invoices(&invoices, "inv-2024-002", StatusFilter::All);
        assert_eq!(numbers(&found), vec!["INV-2024-002"]);
    }

    #[test]
    fn status_filter_combines_with_search() {
        let invoices = sample();
        let found = filter_invoices(&invoices, "TECH", StatusFilter::Only(InvoiceStatus::Paid));
        assert_eq!(numbers(&found), vec!["INV-2024-001"]);

        let found = filter_invoices(&invoices, "", "overdue".parse().unwrap());
        assert!(found.is_empty());
    }

    #[test]
    fn empty_search_with_all_returns_everything() {
        let invoices = sample();
        assert_eq!(filter_invoices(&invoices, "", StatusFilter::All).len(), 3);
    }

    #[test]
    fn status_filter_parses() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "unpaid".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(InvoiceStatus::Unpaid)
        );
        assert!("pending".parse::<StatusFilter>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: the result is a subsequence of the input in original order.
        #[test]
        fn result_is_an_ordered_subsequence(term in "[a-zA-Z0-9 -]{0,6}") {
            let invoices = sample();
            let found = filter_invoices(&invoices, &term, StatusFilter::All);

            let mut cursor = 0;
            for hit in &found {
                let pos = invoices[cursor..]
                    .iter()
                    .position(|inv| inv.invoice_number() == hit.invoice_number());
                prop_assert!(pos.is_some());
                cursor += pos.unwrap_or(0) + 1;
            }
        }
    }
}
