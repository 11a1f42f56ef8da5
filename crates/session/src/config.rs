//! Invoicing configuration (numbering, tax, payment terms).

use core::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use invotech_invoicing::{DEFAULT_TAX_RATE, MAX_PAYMENT_TERMS_DAYS};

pub const ENV_INVOICE_PREFIX: &str = "INVOTECH_INVOICE_PREFIX";
pub const ENV_TAX_RATE: &str = "INVOTECH_TAX_RATE";
pub const ENV_PAYMENT_TERMS: &str = "INVOTECH_PAYMENT_TERMS";
pub const ENV_PAYMENT_TERMS_DAYS: &str = "INVOTECH_PAYMENT_TERMS_DAYS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoicingConfig {
    /// Text before the running number, e.g. `"INV-2024-"`.
    pub invoice_prefix: String,
    /// Zero-padding width of the running number.
    pub number_width: usize,
    /// Tax rate (percent) for new drafts.
    pub default_tax_rate: Decimal,
    /// Payment terms label for new drafts.
    pub default_payment_terms: String,
    /// Days from issue to due date when the terms don't say otherwise.
    pub payment_terms_days: i64,
}

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self {
            invoice_prefix: "INV-2024-".to_string(),
            number_width: 3,
            default_tax_rate: DEFAULT_TAX_RATE,
            default_payment_terms: "Net 30".to_string(),
            payment_terms_days: 30,
        }
    }
}

impl InvoicingConfig {
    /// Load from `INVOTECH_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (environment, test fixtures, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let invoice_prefix = lookup(ENV_INVOICE_PREFIX).unwrap_or_else(|| {
            tracing::debug!("{ENV_INVOICE_PREFIX} not set; using {:?}", defaults.invoice_prefix);
            defaults.invoice_prefix.clone()
        });

        let default_tax_rate = match lookup(ENV_TAX_RATE) {
            Some(raw) => {
                let rate = parse::<Decimal>(ENV_TAX_RATE, &raw)?;
                if rate.is_sign_negative() {
                    return Err(invalid(ENV_TAX_RATE, &raw, "must not be negative"));
                }
                rate
            }
            None => defaults.default_tax_rate,
        };

        let default_payment_terms = lookup(ENV_PAYMENT_TERMS)
            .map(|terms| terms.trim().to_string())
            .filter(|terms| !terms.is_empty())
            .unwrap_or(defaults.default_payment_terms);

        let payment_terms_days = match lookup(ENV_PAYMENT_TERMS_DAYS) {
            Some(raw) => {
                let days = parse::<i64>(ENV_PAYMENT_TERMS_DAYS, &raw)?;
                if days < 0 {
                    return Err(invalid(ENV_PAYMENT_TERMS_DAYS, &raw, "must not be negative"));
                }
                if days > MAX_PAYMENT_TERMS_DAYS {
                    return Err(invalid(
                        ENV_PAYMENT_TERMS_DAYS,
                        &raw,
                        &format!("must be at most {MAX_PAYMENT_TERMS_DAYS}"),
                    ));
                }
                days
            }
            None => defaults.payment_terms_days,
        };

        Ok(Self {
            invoice_prefix,
            number_width: defaults.number_width,
            default_tax_rate,
            default_payment_terms,
            payment_terms_days,
        })
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| invalid(key, raw, &e.to_string()))
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = InvoicingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, InvoicingConfig::default());
        assert_eq!(config.default_tax_rate, Decimal::new(85, 1));
        assert_eq!(config.payment_terms_days, 30);
    }

    #[test]
    fn overrides_are_applied() {
        let config = InvoicingConfig::from_lookup(lookup(&[
            (ENV_INVOICE_PREFIX, "ACME-"),
            (ENV_TAX_RATE, " 20 "),
            (ENV_PAYMENT_TERMS, "Net 14"),
            (ENV_PAYMENT_TERMS_DAYS, "14"),
        ]))
        .unwrap();
        assert_eq!(config.invoice_prefix, "ACME-");
        assert_eq!(config.default_tax_rate, Decimal::from(20));
        assert_eq!(config.default_payment_terms, "Net 14");
        assert_eq!(config.payment_terms_days, 14);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = InvoicingConfig::from_lookup(lookup(&[(ENV_TAX_RATE, "eight")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_TAX_RATE, .. }));

        let err =
            InvoicingConfig::from_lookup(lookup(&[(ENV_PAYMENT_TERMS_DAYS, "-1")])).unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn payment_terms_days_are_bounded() {
        let err = InvoicingConfig::from_lookup(lookup(&[(ENV_PAYMENT_TERMS_DAYS, "100000000")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_PAYMENT_TERMS_DAYS, .. }));

        let config =
            InvoicingConfig::from_lookup(lookup(&[(ENV_PAYMENT_TERMS_DAYS, "3650")])).unwrap();
        assert_eq!(config.payment_terms_days, MAX_PAYMENT_TERMS_DAYS);
    }
}
