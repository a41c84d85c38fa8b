//! External provider adapters. Each adapter normalizes its input into a cache
//! key, consults the [`trip_storage::CacheStore`] first, calls the upstream
//! HTTP API with a bounded timeout on a miss, validates the response shape
//! into a typed struct, writes through, and returns the normalized payload.
//!
//! Routine failures (network, timeout, non-2xx, malformed body) surface as
//! [`tripbot_core::ProviderError`]; nothing here panics or retries.

use std::time::Duration;
use tripbot_core::ProviderError;

pub mod cultural;
pub mod currency;
pub mod weather;

pub use cultural::{CulturalApiConfig, CulturalContext, CulturalProvider, HttpCulturalProvider};
pub use currency::{
    Conversion, CurrencyApiConfig, CurrencyProvider, HttpCurrencyProvider, RateTable,
};
pub use weather::{DailyForecast, HttpWeatherProvider, WeatherApiConfig, WeatherContext, WeatherProvider};

/// Builds a reqwest client with a whole-request timeout.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::Unexpected(e.to_string()))
}

/// Reads the response body as JSON after checking the status code.
/// Non-2xx is `Unavailable`; an undecodable body is `Malformed`.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Unavailable(format!(
            "upstream returned {status}: {body}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Malformed(e.to_string()))
}
