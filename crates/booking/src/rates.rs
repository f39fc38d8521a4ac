//! Exchange-rate lookup with graceful degradation.
//!
//! Quotes store a snapshot of the rate at save time, so a rate lookup must
//! never block a save: a failed or malformed live fetch falls back to the
//! static table from configuration with a warning.

use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use banquet_core::config::RatesConfig;
use banquet_core::finance::currency::is_base_currency;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateSource {
    Live,
    Fallback,
}

/// Base-units-per-foreign-unit rate plus where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct RateQuote {
    pub rate: Decimal,
    pub source: RateSource,
}

#[derive(Debug, Error)]
enum RateFetchError {
    #[error("rate request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate response carried no datum")]
    MissingDatum,
    #[error("rate datum `{0}` is not a decimal")]
    MalformedDatum(String),
}

// Banxico SIE response shape: bmx.series[].datos[].dato.
#[derive(Debug, Deserialize)]
struct SieResponse {
    bmx: SieBody,
}

#[derive(Debug, Deserialize)]
struct SieBody {
    series: Vec<SieSeries>,
}

#[derive(Debug, Deserialize)]
struct SieSeries {
    #[serde(default)]
    datos: Vec<SieDatum>,
}

#[derive(Debug, Deserialize)]
struct SieDatum {
    dato: String,
}

pub struct RateService {
    client: Client,
    config: RatesConfig,
}

impl RateService {
    pub fn new(config: RatesConfig) -> Result<Self, reqwest::Error> {
        let client =
            Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, config })
    }

    /// Quotes a rate for `currency`. The base currency always quotes 1
    /// without a network call.
    pub async fn quote_rate(&self, currency: &str) -> RateQuote {
        if is_base_currency(currency) {
            return RateQuote { rate: Decimal::ONE, source: RateSource::Fallback };
        }

        match self.fetch_live(currency).await {
            Ok(rate) => {
                debug!(
                    event_name = "rates.live_quote",
                    currency = %currency,
                    rate = %rate,
                    "fetched live exchange rate"
                );
                RateQuote { rate, source: RateSource::Live }
            }
            Err(error) => {
                warn!(
                    event_name = "rates.live_fetch_failed",
                    currency = %currency,
                    error = %error,
                    "live rate fetch failed, using fallback table"
                );
                self.fallback_quote(currency)
            }
        }
    }

    fn fallback_quote(&self, currency: &str) -> RateQuote {
        let rate = match self.config.fallback.get(currency) {
            Some(rate) => *rate,
            None => {
                warn!(
                    event_name = "rates.fallback_missing",
                    currency = %currency,
                    "no fallback rate configured, defaulting to 1"
                );
                Decimal::ONE
            }
        };
        RateQuote { rate, source: RateSource::Fallback }
    }

    async fn fetch_live(&self, currency: &str) -> Result<Decimal, RateFetchError> {
        let mut request = self.client.get(&self.config.endpoint).query(&[("moneda", currency)]);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Bmx-Token", api_key.expose_secret());
        }

        let response = request.send().await?.error_for_status()?;
        let body: SieResponse = response.json().await?;

        let datum = body
            .bmx
            .series
            .into_iter()
            .flat_map(|series| series.datos)
            .next_back()
            .ok_or(RateFetchError::MissingDatum)?;

        datum.dato.parse::<Decimal>().map_err(|_| RateFetchError::MalformedDatum(datum.dato))
    }
}
