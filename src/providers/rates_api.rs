use super::util::with_retry;
use crate::core::rates::{RateProvider, RateSource, RateTable};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

pub const DEFAULT_RATES_URL: &str = "https://currency-rates-api.onrender.com/rates.json";

/// Fetches a `{ "<CODE>": <units per USD>, ... }` rate table over HTTP.
///
/// Any failure yields [`RateTable::fallback`]; callers tell the two apart by
/// [`RateTable::source`].
pub struct HttpRateProvider {
    url: String,
    retries: usize,
    retry_delay_ms: u64,
}

impl HttpRateProvider {
    pub fn new(url: &str) -> Self {
        HttpRateProvider {
            url: url.to_string(),
            retries: 2,
            retry_delay_ms: 500,
        }
    }

    pub fn with_retries(mut self, retries: usize, retry_delay_ms: u64) -> Self {
        self.retries = retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_live(&self) -> Result<RateTable> {
        let response = with_retry(
            || async { reqwest::get(&self.url).await },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .context("Rates request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {status} for rates url: {}", self.url));
        }

        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;
        parse_rates(&response_text)
            .with_context(|| format!("Failed to parse JSON response from {}", self.url))
    }
}

/// Keeps the numeric members of a JSON object.
fn parse_rates(body: &str) -> Result<RateTable> {
    let value: Value = serde_json::from_str(body)?;
    let Value::Object(members) = value else {
        return Err(anyhow!("Expected a JSON object of rates"));
    };

    let rates = members.into_iter().filter_map(|(code, rate)| match rate.as_f64() {
        Some(rate) => Some((code, rate)),
        None => {
            debug!(%code, %rate, "Skipping non-numeric rate entry");
            None
        }
    });
    Ok(RateTable::new(rates, RateSource::Live))
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    #[instrument(name = "RatesFetch", skip(self), fields(url = %self.url))]
    async fn fetch_rates(&self) -> RateTable {
        match self.fetch_live().await {
            Ok(table) => {
                if table.is_empty() {
                    warn!("Rates endpoint returned no usable rates");
                }
                debug!(count = table.len(), "Fetched live rates");
                table
            }
            Err(e) => {
                error!(error = ?e, "Failed to fetch rates, using fallback table");
                RateTable::fallback()
            }
        }
    }
}

/// Fetches rates from `url`, or from [`DEFAULT_RATES_URL`] when `None`.
pub async fn fetch_rates(url: Option<&str>) -> RateTable {
    HttpRateProvider::new(url.unwrap_or(DEFAULT_RATES_URL))
        .fetch_rates()
        .await
}
