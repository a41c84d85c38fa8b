//! Weather adapter: normalized current conditions plus a short daily
//! forecast, cached for one hour per destination.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use trip_storage::{CacheDomain, CacheStore};
use tripbot_core::ProviderError;

pub const WEATHER_SOURCE: &str = "openweather";

/// Weather API connection settings.
#[derive(Debug, Clone)]
pub struct WeatherApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// Normalized weather payload handlers consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherContext {
    pub destination: String,
    pub temperature_c: f64,
    pub conditions: String,
    pub humidity: Option<f64>,
    pub wind_kmh: Option<f64>,
    pub forecast: Vec<DailyForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: String,
    pub high_c: f64,
    pub low_c: f64,
    pub conditions: String,
}

/// Provider-side response contract, validated at the adapter boundary.
#[derive(Debug, Deserialize)]
struct WeatherApiResponse {
    current: RawCurrent,
    #[serde(default)]
    daily: Vec<RawDaily>,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    temp: f64,
    humidity: Option<f64>,
    /// Metres per second, as the upstream reports it.
    wind_speed: Option<f64>,
    conditions: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    date: String,
    temp_max: f64,
    temp_min: f64,
    conditions: Option<String>,
}

const MS_TO_KMH: f64 = 3.6;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions and forecast for a destination.
    async fn forecast(&self, destination: &str) -> Result<WeatherContext, ProviderError>;
}

/// HTTP weather adapter with cache-aside through [`CacheStore`].
pub struct HttpWeatherProvider {
    client: reqwest::Client,
    config: WeatherApiConfig,
    cache: CacheStore,
}

impl HttpWeatherProvider {
    pub fn new(config: WeatherApiConfig, cache: CacheStore) -> Result<Self, ProviderError> {
        Ok(Self {
            client: crate::http_client(config.timeout_secs)?,
            config,
            cache,
        })
    }

    fn cache_key(destination: &str) -> String {
        destination.trim().to_lowercase()
    }

    async fn fetch_from_api(&self, destination: &str) -> Result<WeatherContext, ProviderError> {
        let url = format!("{}/v1/forecast", self.config.base_url);
        let mut request = self
            .client
            .get(&url)
            .query(&[("location", destination), ("units", "metric")]);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("appid", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        let raw: WeatherApiResponse = crate::read_json(response).await?;

        normalize(destination, raw)
    }
}

fn normalize(destination: &str, raw: WeatherApiResponse) -> Result<WeatherContext, ProviderError> {
    if !raw.current.temp.is_finite() {
        return Err(ProviderError::Malformed(
            "current temperature is not a number".to_string(),
        ));
    }
    Ok(WeatherContext {
        destination: destination.trim().to_string(),
        temperature_c: raw.current.temp,
        conditions: raw
            .current
            .conditions
            .unwrap_or_else(|| "clear".to_string()),
        humidity: raw.current.humidity,
        wind_kmh: raw.current.wind_speed.map(|ws| ws * MS_TO_KMH),
        forecast: raw
            .daily
            .into_iter()
            .map(|day| DailyForecast {
                date: day.date,
                high_c: day.temp_max,
                low_c: day.temp_min,
                conditions: day.conditions.unwrap_or_else(|| "clear".to_string()),
            })
            .collect(),
    })
}

#[async_trait]
impl WeatherProvider for HttpWeatherProvider {
    #[instrument(skip(self))]
    async fn forecast(&self, destination: &str) -> Result<WeatherContext, ProviderError> {
        let key = Self::cache_key(destination);

        if let Some(cached) = self.cache.get(CacheDomain::Weather, &key, WEATHER_SOURCE).await {
            match serde_json::from_value::<WeatherContext>(cached) {
                Ok(context) => {
                    debug!(destination = %key, "Weather served from cache");
                    return Ok(context);
                }
                Err(e) => {
                    warn!(destination = %key, error = %e, "Cached weather payload unusable, refetching");
                }
            }
        }

        let context = self.fetch_from_api(destination).await?;

        if let Ok(payload) = serde_json::to_value(&context) {
            self.cache
                .set(CacheDomain::Weather, &key, WEATHER_SOURCE, &payload, None)
                .await;
        }
        Ok(context)
    }
}
