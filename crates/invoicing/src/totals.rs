//! Invoice calculator.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use invotech_core::DomainError;

use crate::line_item::LineItem;

/// Tax rate applied when none is configured: 8.5%.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(85, 0, 0, false, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// `subtotal = Σ hours × rate`, `tax = subtotal × rate / 100`, `total = subtotal + tax`.
///
/// Inputs are not validated and nothing is rounded; see [`format_currency`].
/// The only failure is an amount too large for a `Decimal`.
pub fn calculate_totals(
    line_items: &[LineItem],
    tax_rate: Decimal,
) -> Result<InvoiceTotals, DomainError> {
    let subtotal = line_items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.subtotal()))
        .ok_or_else(out_of_range)?;
    let tax_amount = tax_rate
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|rate| subtotal.checked_mul(rate))
        .ok_or_else(out_of_range)?;
    let total = subtotal.checked_add(tax_amount).ok_or_else(out_of_range)?;

    Ok(InvoiceTotals {
        subtotal,
        tax_amount,
        total,
    })
}

fn out_of_range() -> DomainError {
    DomainError::validation("invoice amount out of range")
}

/// Two decimal places, midpoint away from zero (`3255` -> `"3255.00"`).
pub fn format_currency(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}
