//! Exchange rate abstractions

use super::cost::Currency;
use async_trait::async_trait;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Rates used when the live endpoint cannot be reached.
pub const FALLBACK_RATES: [(&str, f64); 4] =
    [("USD", 1.0), ("GBP", 0.6), ("EURO", 0.7), ("ILS", 3.4)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    Fallback,
}

impl Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateSource::Live => write!(f, "live"),
            RateSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Units of each currency per 1 USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
    pub source: RateSource,
}

impl RateTable {
    /// Builds a table, dropping entries that cannot be used as a divisor.
    pub fn new<I, S>(rates: I, source: RateSource) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let rates = rates
            .into_iter()
            .map(|(code, rate)| (code.into(), rate))
            .filter(|(code, rate)| {
                let usable = rate.is_finite() && *rate > 0.0;
                if !usable {
                    tracing::warn!(%code, rate, "Ignoring unusable exchange rate");
                }
                usable
            })
            .collect();
        Self { rates, source }
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_RATES, RateSource::Fallback)
    }

    pub fn is_live(&self) -> bool {
        self.source == RateSource::Live
    }

    /// Rate for `code`, or 1 when the table has no entry.
    pub fn rate_for_code(&self, code: &str) -> f64 {
        self.rates.get(code).copied().unwrap_or(1.0)
    }

    pub fn rate(&self, currency: Currency) -> f64 {
        self.rate_for_code(currency.code())
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Converts through USD without rounding.
    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> f64 {
        let amount_in_usd = amount / self.rate(from);
        amount_in_usd * self.rate(to)
    }
}

/// Rounds half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Never fails; provenance is reported through [`RateTable::source`].
    async fn fetch_rates(&self) -> RateTable;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_table() {
        let table = RateTable::fallback();
        assert_eq!(table.source, RateSource::Fallback);
        assert_eq!(table.len(), 4);
        assert_eq!(table.get("USD"), Some(1.0));
        assert_eq!(table.get("GBP"), Some(0.6));
        assert_eq!(table.get("EURO"), Some(0.7));
        assert_eq!(table.get("ILS"), Some(3.4));
    }

    #[test]
    fn test_missing_rate_is_identity() {
        let table = RateTable::new([("USD", 1.0)], RateSource::Live);
        assert_eq!(table.rate(Currency::Gbp), 1.0);
        assert_eq!(table.convert(10.0, Currency::Gbp, Currency::Usd), 10.0);
    }

    #[test]
    fn test_unusable_rates_are_dropped() {
        let table = RateTable::new(
            [("USD", 1.0), ("ILS", 0.0), ("GBP", f64::NAN), ("EURO", -2.0)],
            RateSource::Live,
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.rate(Currency::Ils), 1.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(14.705882352941176), 14.71);
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(-1.005), -1.01);
        assert_eq!(round2(3.0), 3.0);
    }

    #[test]
    fn test_currency_round_trip() {
        let table = RateTable::fallback();
        for from in Currency::ALL {
            for to in Currency::ALL {
                for amount in [0.01, 1.0, 19.99, 250.0, 12345.67] {
                    let there = table.convert(amount, from, to);
                    let back = round2(table.convert(there, to, from));
                    assert!(
                        (back - amount).abs() <= 0.01,
                        "{amount} {from}->{to}->{from} gave {back}"
                    );
                }
            }
        }
    }
}
