//! Cultural-insight adapter: etiquette, dress, and customs notes per
//! destination and trip purpose, cached for 24 hours.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use trip_storage::{CacheDomain, CacheStore};
use tripbot_core::ProviderError;

pub const CULTURAL_SOURCE: &str = "insights-api";

#[derive(Debug, Clone)]
pub struct CulturalApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CulturalApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cultural-insights.example.com".to_string(),
            api_key: None,
            timeout_secs: 15,
        }
    }
}

/// Normalized cultural payload handlers consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalContext {
    pub destination: String,
    pub trip_purpose: Option<String>,
    pub etiquette: Vec<String>,
    pub dress_code: Option<String>,
    pub customs: Vec<String>,
    pub summary: Option<String>,
}

/// Provider-side response contract.
#[derive(Debug, Deserialize)]
struct CulturalApiResponse {
    #[serde(default)]
    etiquette: Vec<String>,
    dress_code: Option<String>,
    #[serde(default)]
    customs: Vec<String>,
    summary: Option<String>,
}

#[async_trait]
pub trait CulturalProvider: Send + Sync {
    async fn insights(
        &self,
        destination: &str,
        trip_purpose: Option<&str>,
    ) -> Result<CulturalContext, ProviderError>;
}

/// HTTP cultural-insight adapter with cache-aside through [`CacheStore`].
pub struct HttpCulturalProvider {
    client: reqwest::Client,
    config: CulturalApiConfig,
    cache: CacheStore,
}

impl HttpCulturalProvider {
    pub fn new(config: CulturalApiConfig, cache: CacheStore) -> Result<Self, ProviderError> {
        Ok(Self {
            client: crate::http_client(config.timeout_secs)?,
            config,
            cache,
        })
    }

    fn cache_key(destination: &str, trip_purpose: Option<&str>) -> String {
        let purpose = trip_purpose.unwrap_or("general").trim().to_lowercase();
        format!("{}:{}", destination.trim().to_lowercase(), purpose)
    }

    async fn fetch_from_api(
        &self,
        destination: &str,
        trip_purpose: Option<&str>,
    ) -> Result<CulturalContext, ProviderError> {
        let url = format!("{}/v1/insights", self.config.base_url);
        let mut request = self.client.get(&url).query(&[
            ("destination", destination),
            ("purpose", trip_purpose.unwrap_or("general")),
        ]);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        let raw: CulturalApiResponse = crate::read_json(response).await?;

        if raw.etiquette.is_empty() && raw.customs.is_empty() && raw.summary.is_none() {
            return Err(ProviderError::Malformed(
                "insight response carried no usable fields".to_string(),
            ));
        }

        Ok(CulturalContext {
            destination: destination.trim().to_string(),
            trip_purpose: trip_purpose.map(|p| p.trim().to_lowercase()),
            etiquette: raw.etiquette,
            dress_code: raw.dress_code,
            customs: raw.customs,
            summary: raw.summary,
        })
    }
}

#[async_trait]
impl CulturalProvider for HttpCulturalProvider {
    #[instrument(skip(self))]
    async fn insights(
        &self,
        destination: &str,
        trip_purpose: Option<&str>,
    ) -> Result<CulturalContext, ProviderError> {
        let key = Self::cache_key(destination, trip_purpose);

        if let Some(cached) = self
            .cache
            .get(CacheDomain::Cultural, &key, CULTURAL_SOURCE)
            .await
        {
            match serde_json::from_value::<CulturalContext>(cached) {
                Ok(context) => {
                    debug!(key = %key, "Cultural insights served from cache");
                    return Ok(context);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Cached cultural payload unusable, refetching");
                }
            }
        }

        let context = self.fetch_from_api(destination, trip_purpose).await?;

        if let Ok(payload) = serde_json::to_value(&context) {
            self.cache
                .set(CacheDomain::Cultural, &key, CULTURAL_SOURCE, &payload, None)
                .await;
        }
        Ok(context)
    }
}
