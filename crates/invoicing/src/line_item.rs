use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invotech_core::{DomainError, Entity, EntityId, entity_id};

entity_id!(
    /// Line item identifier.
    LineItemId
);

/// One billable unit: `hours × rate`.
///
/// `subtotal` is derived. Fields are private so every hours/rate change goes
/// through [`LineItem::apply`], which recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    id: LineItemId,
    description: String,
    hours: Decimal,
    rate: Decimal,
    subtotal: Decimal,
}

/// A single-field edit to a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "lowercase")]
pub enum LineItemUpdate {
    Description(String),
    Hours(Decimal),
    Rate(Decimal),
}

impl LineItem {
    /// Zero hours, zero rate, empty description.
    pub fn blank(id: EntityId) -> Self {
        Self {
            id: LineItemId::new(id),
            description: String::new(),
            hours: Decimal::ZERO,
            rate: Decimal::ZERO,
            subtotal: Decimal::ZERO,
        }
    }

    /// Fails when `hours × rate` does not fit in a `Decimal`.
    pub fn new(
        id: EntityId,
        description: impl Into<String>,
        hours: Decimal,
        rate: Decimal,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: LineItemId::new(id),
            description: description.into(),
            hours,
            rate,
            subtotal: line_subtotal(hours, rate)?,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn hours(&self) -> Decimal {
        self.hours
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Apply one edit. An hours/rate edit whose subtotal would overflow is
    /// rejected and the item is left as it was.
    pub fn apply(&mut self, update: LineItemUpdate) -> Result<(), DomainError> {
        match update {
            LineItemUpdate::Description(description) => self.description = description,
            LineItemUpdate::Hours(hours) => {
                self.subtotal = line_subtotal(hours, self.rate)?;
                self.hours = hours;
            }
            LineItemUpdate::Rate(rate) => {
                self.subtotal = line_subtotal(self.hours, rate)?;
                self.rate = rate;
            }
        }
        Ok(())
    }

    /// Ready to be invoiced: non-blank description, positive hours and rate.
    ///
    /// `position` is 0-based; the error reports it 1-based.
    pub fn check_complete(&self, position: usize) -> Result<(), DomainError> {
        let missing = if self.description.trim().is_empty() {
            Some("description")
        } else if self.hours <= Decimal::ZERO {
            Some("hours")
        } else if self.rate <= Decimal::ZERO {
            Some("rate")
        } else {
            None
        };

        match missing {
            None => Ok(()),
            Some(field) => Err(DomainError::validation(format!(
                "incomplete line item: line {} needs a {}",
                position + 1,
                field
            ))),
        }
    }
}

fn line_subtotal(hours: Decimal, rate: Decimal) -> Result<Decimal, DomainError> {
    hours
        .checked_mul(rate)
        .ok_or_else(|| DomainError::validation("line item amount out of range"))
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
