//! Currency-rate adapter: per-base rate tables cached for one hour, and a
//! conversion operation with a single forced refetch when a rate looks
//! implausible.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use trip_storage::{CacheDomain, CacheStore};
use tripbot_core::ProviderError;

pub const CURRENCY_SOURCE: &str = "exchangerate-api";

/// A rate below this magnitude suggests a unit or parsing error upstream.
const SUSPECT_RATE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct CurrencyApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CurrencyApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.exchangerate.host".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// Normalized rate table for one base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

/// Result of a conversion: `converted = amount * rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub from_currency: String,
    pub to_currency: String,
    pub amount: f64,
    pub rate: f64,
    pub converted: f64,
}

/// Provider-side response contract.
#[derive(Debug, Deserialize)]
struct RatesApiResponse {
    base: String,
    rates: HashMap<String, f64>,
}

#[async_trait]
pub trait CurrencyProvider: Send + Sync {
    /// The full rate table for a base currency.
    async fn rates(&self, base: &str) -> Result<RateTable, ProviderError>;

    /// Converts `amount` from one currency to another.
    async fn convert(
        &self,
        from_currency: &str,
        to_currency: &str,
        amount: f64,
    ) -> Result<Conversion, ProviderError>;
}

/// HTTP currency adapter with cache-aside through [`CacheStore`].
pub struct HttpCurrencyProvider {
    client: reqwest::Client,
    config: CurrencyApiConfig,
    cache: CacheStore,
}

impl HttpCurrencyProvider {
    pub fn new(config: CurrencyApiConfig, cache: CacheStore) -> Result<Self, ProviderError> {
        Ok(Self {
            client: crate::http_client(config.timeout_secs)?,
            config,
            cache,
        })
    }

    async fn fetch_from_api(&self, base: &str) -> Result<RateTable, ProviderError> {
        let url = format!("{}/v1/latest", self.config.base_url);
        let mut request = self.client.get(&url).query(&[("base", base)]);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("access_key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        let raw: RatesApiResponse = crate::read_json(response).await?;

        if raw.base.trim().is_empty() || raw.rates.is_empty() {
            return Err(ProviderError::Malformed(
                "rate table was empty".to_string(),
            ));
        }
        if raw.rates.values().any(|rate| !rate.is_finite()) {
            return Err(ProviderError::Malformed(
                "rate table contained non-numeric rates".to_string(),
            ));
        }

        Ok(RateTable {
            base: raw.base.to_uppercase(),
            rates: raw
                .rates
                .into_iter()
                .map(|(code, rate)| (code.to_uppercase(), rate))
                .collect(),
            fetched_at: Utc::now(),
        })
    }

    /// Network fetch that also refreshes the cache. Used both on a plain
    /// cache miss and for the forced cache-bypassing refetch.
    async fn fetch_and_store(&self, base: &str) -> Result<RateTable, ProviderError> {
        let table = self.fetch_from_api(base).await?;
        if let Ok(payload) = serde_json::to_value(&table) {
            self.cache
                .set(
                    CacheDomain::Currency,
                    &base.to_lowercase(),
                    CURRENCY_SOURCE,
                    &payload,
                    None,
                )
                .await;
        }
        Ok(table)
    }
}

#[async_trait]
impl CurrencyProvider for HttpCurrencyProvider {
    #[instrument(skip(self))]
    async fn rates(&self, base: &str) -> Result<RateTable, ProviderError> {
        let base = base.trim().to_uppercase();
        let key = base.to_lowercase();

        if let Some(cached) = self.cache.get(CacheDomain::Currency, &key, CURRENCY_SOURCE).await {
            match serde_json::from_value::<RateTable>(cached) {
                Ok(table) => {
                    debug!(base = %base, "Rates served from cache");
                    return Ok(table);
                }
                Err(e) => {
                    warn!(base = %base, error = %e, "Cached rate table unusable, refetching");
                }
            }
        }

        self.fetch_and_store(&base).await
    }

    #[instrument(skip(self))]
    async fn convert(
        &self,
        from_currency: &str,
        to_currency: &str,
        amount: f64,
    ) -> Result<Conversion, ProviderError> {
        let from = from_currency.trim().to_uppercase();
        let to = to_currency.trim().to_uppercase();

        let table = self.rates(&from).await?;
        let mut rate = *table.rates.get(&to).ok_or_else(|| {
            ProviderError::Malformed(format!("no rate for {to} with base {from}"))
        })?;

        // An implausibly small rate usually means a unit or parsing error
        // upstream (or a poisoned cache entry). One forced refetch, bypassing
        // the cache; if the refreshed table still lacks the target currency we
        // keep the original rate and flag it in the logs rather than failing
        // the whole conversion.
        if rate.abs() < SUSPECT_RATE_EPSILON {
            warn!(from = %from, to = %to, rate, "Suspicious rate, forcing refetch");
            match self.fetch_and_store(&from).await {
                Ok(refreshed) => match refreshed.rates.get(&to) {
                    Some(fresh) => rate = *fresh,
                    None => {
                        warn!(from = %from, to = %to, rate_suspect = true, "Refreshed table lacks target, keeping original rate");
                    }
                },
                Err(e) => {
                    warn!(from = %from, to = %to, error = %e, rate_suspect = true, "Refetch failed, keeping original rate");
                }
            }
        }

        Ok(Conversion {
            converted: amount * rate,
            from_currency: from,
            to_currency: to,
            amount,
            rate,
        })
    }
}
