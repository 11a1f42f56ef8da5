//! Draft invoice: the in-progress invoice being composed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invotech_clients::ClientId;
use invotech_core::{DomainError, EntityId};

use crate::line_item::{LineItem, LineItemUpdate};
use crate::totals::{InvoiceTotals, calculate_totals};

/// Working state for a new invoice. Always holds at least one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftInvoice {
    pub client_id: Option<ClientId>,
    line_items: Vec<LineItem>,
    pub payment_terms: String,
    pub tax_rate: Decimal,
}

impl DraftInvoice {
    /// A fresh draft: no client, one blank line item.
    pub fn new(first_item_id: EntityId, payment_terms: impl Into<String>, tax_rate: Decimal) -> Self {
        Self {
            client_id: None,
            line_items: vec![LineItem::blank(first_item_id)],
            payment_terms: payment_terms.into(),
            tax_rate,
        }
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Days until due when the payment terms read "Net N" (case-insensitive).
    pub fn net_days(&self) -> Option<i64> {
        let terms = self.payment_terms.trim();
        let (word, days) = terms.split_once(char::is_whitespace)?;
        if !word.eq_ignore_ascii_case("net") {
            return None;
        }
        days.trim().parse::<i64>().ok().filter(|d| *d >= 0)
    }

    /// Live totals for the draft as it stands.
    pub fn totals(&self) -> Result<InvoiceTotals, DomainError> {
        calculate_totals(&self.line_items, self.tax_rate)
    }

    pub fn add_line_item(&mut self, id: EntityId) -> &LineItem {
        self.line_items.push(LineItem::blank(id));
        let last = self.line_items.len() - 1;
        &self.line_items[last]
    }

    pub fn update_line_item(
        &mut self,
        index: usize,
        update: LineItemUpdate,
    ) -> Result<&LineItem, DomainError> {
        let len = self.line_items.len();
        let item = self
            .line_items
            .get_mut(index)
            .ok_or_else(|| DomainError::index_out_of_range(index, len))?;
        item.apply(update)?;
        Ok(&*item)
    }

    /// Removes the item at `index` unless it is the last one left.
    ///
    /// Returns whether an item was removed.
    pub fn remove_line_item(&mut self, index: usize) -> Result<bool, DomainError> {
        let len = self.line_items.len();
        if index >= len {
            return Err(DomainError::index_out_of_range(index, len));
        }
        if len <= 1 {
            return Ok(false);
        }
        self.line_items.remove(index);
        Ok(true)
    }

    /// Checks the draft can become an invoice, returning the selected client.
    ///
    /// Client selection is checked before any line item.
    pub fn validate(&self) -> Result<&ClientId, DomainError> {
        let client_id = self
            .client_id
            .as_ref()
            .ok_or_else(|| DomainError::validation("client required"))?;

        for (position, item) in self.line_items.iter().enumerate() {
            item.check_complete(position)?;
        }

        Ok(client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invotech_core::Entity;

    use crate::totals::DEFAULT_TAX_RATE;

    fn draft() -> DraftInvoice {
        DraftInvoice::new(EntityId::from_raw("1"), "Net 30", DEFAULT_TAX_RATE)
    }

    #[test]
    fn new_draft_has_one_blank_item() {
        let draft = draft();
        assert_eq!(draft.line_items().len(), 1);
        assert_eq!(draft.line_items()[0].subtotal(), Decimal::ZERO);
        assert_eq!(draft.client_id, None);
        assert_eq!(draft.payment_terms, "Net 30");
        assert_eq!(draft.tax_rate, Decimal::new(85, 1));
    }

    #[test]
    fn net_days_reads_payment_terms() {
        let mut draft = draft();
        assert_eq!(draft.net_days(), Some(30));
        draft.payment_terms = "net  45".to_string();
        assert_eq!(draft.net_days(), Some(45));
        draft.payment_terms = "Due on receipt".to_string();
        assert_eq!(draft.net_days(), None);
        draft.payment_terms = "Net -5".to_string();
        assert_eq!(draft.net_days(), None);
    }

    #[test]
    fn add_appends_blank_item_with_given_id() {
        let mut draft = draft();
        let added = draft.add_line_item(EntityId::from_raw("2")).clone();
        assert_eq!(added.id().as_str(), "2");
        assert_eq!(draft.line_items().len(), 2);
        assert_eq!(draft.line_items()[1], added);
    }

    #[test]
    fn update_out_of_range_is_an_error() {
        let mut draft = draft();
        let before = draft.clone();
        let err = draft
            .update_line_item(3, LineItemUpdate::Hours(Decimal::ONE))
            .unwrap_err();
        assert_eq!(err, DomainError::index_out_of_range(3, 1));
        assert_eq!(draft, before);
    }

    #[test]
    fn update_recomputes_subtotal() {
        let mut draft = draft();
        draft
            .update_line_item(0, LineItemUpdate::Hours(Decimal::from(20)))
            .unwrap();
        let item = draft
            .update_line_item(0, LineItemUpdate::Rate(Decimal::from(150)))
            .unwrap();
        assert_eq!(item.subtotal(), Decimal::from(3000));
        assert_eq!(draft.totals().unwrap().total, Decimal::from(3255));
    }

    #[test]
    fn remove_keeps_at_least_one_item() {
        let mut draft = draft();
        assert!(!draft.remove_line_item(0).unwrap());
        assert_eq!(draft.line_items().len(), 1);

        draft.add_line_item(EntityId::from_raw("2"));
        assert!(draft.remove_line_item(0).unwrap());
        assert_eq!(draft.line_items().len(), 1);
        assert_eq!(draft.line_items()[0].id().as_str(), "2");
    }

    #[test]
    fn remove_out_of_range_is_an_error() {
        let mut draft = draft();
        draft.add_line_item(EntityId::from_raw("2"));
        let err = draft.remove_line_item(2).unwrap_err();
        assert!(matches!(err, DomainError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(draft.line_items().len(), 2);
    }

    #[test]
    fn validate_checks_client_before_items() {
        let draft = draft();
        let err = draft.validate().unwrap_err();
        assert_eq!(err, DomainError::validation("client required"));
    }

    #[test]
    fn validate_rejects_incomplete_items() {
        let mut draft = draft();
        draft.client_id = Some(ClientId::new(EntityId::from_raw("c1")));
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.starts_with("incomplete line item")));

        draft
            .update_line_item(0, LineItemUpdate::Description("Audit".into()))
            .unwrap();
        draft
            .update_line_item(0, LineItemUpdate::Hours(Decimal::from(20)))
            .unwrap();
        draft
            .update_line_item(0, LineItemUpdate::Rate(Decimal::from(150)))
            .unwrap();
        assert_eq!(draft.validate().unwrap().as_str(), "c1");
    }
}
