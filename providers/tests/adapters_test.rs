//! Adapter integration tests against a mockito HTTP server and an in-memory
//! cache store. No real upstream API is contacted.

use mockito::Matcher;
use providers::{
    CulturalApiConfig, CulturalProvider, CurrencyApiConfig, CurrencyProvider, HttpCulturalProvider,
    HttpCurrencyProvider, HttpWeatherProvider, WeatherApiConfig, WeatherProvider,
};
use serde_json::json;
use trip_storage::{CacheStore, RateLimiter};
use tripbot_core::ProviderError;

async fn cache() -> CacheStore {
    CacheStore::new("sqlite::memory:", RateLimiter::default())
        .await
        .expect("in-memory cache store")
}

fn weather_config(base_url: String) -> WeatherApiConfig {
    WeatherApiConfig {
        base_url,
        api_key: None,
        timeout_secs: 2,
    }
}

#[tokio::test]
async fn weather_fetch_normalizes_and_caches() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/forecast")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "current": {
                    "temp": 21.5,
                    "humidity": 55.0,
                    "wind_speed": 3.0,
                    "conditions": "partly cloudy"
                },
                "daily": [
                    {"date": "2025-09-02", "temp_max": 24.0, "temp_min": 17.0, "conditions": "sunny"}
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let provider = HttpWeatherProvider::new(weather_config(server.url()), cache().await).unwrap();

    let first = provider.forecast("Tokyo").await.unwrap();
    assert_eq!(first.destination, "Tokyo");
    assert_eq!(first.temperature_c, 21.5);
    assert_eq!(first.wind_kmh, Some(10.8));
    assert_eq!(first.forecast.len(), 1);

    // Second call must come from the cache; the mock allows exactly one hit.
    let second = provider.forecast("  tokyo ").await.unwrap();
    assert_eq!(second.temperature_c, 21.5);
    mock.assert_async().await;
}

#[tokio::test]
async fn weather_malformed_body_is_typed_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/forecast")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;

    let provider = HttpWeatherProvider::new(weather_config(server.url()), cache().await).unwrap();
    assert!(matches!(
        provider.forecast("Tokyo").await,
        Err(ProviderError::Malformed(_))
    ));
}

#[tokio::test]
async fn weather_non_2xx_is_unavailable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/forecast")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("upstream down")
        .create_async()
        .await;

    let provider = HttpWeatherProvider::new(weather_config(server.url()), cache().await).unwrap();
    assert!(matches!(
        provider.forecast("Tokyo").await,
        Err(ProviderError::Unavailable(_))
    ));
}

#[tokio::test]
async fn cultural_insights_validate_and_cache() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/insights")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "etiquette": ["Bow when greeting"],
                "dress_code": "smart casual",
                "customs": ["Remove shoes indoors"],
                "summary": "Politeness is highly valued."
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let provider = HttpCulturalProvider::new(
        CulturalApiConfig {
            base_url: server.url(),
            api_key: None,
            timeout_secs: 2,
        },
        cache().await,
    )
    .unwrap();

    let first = provider.insights("Tokyo", Some("business")).await.unwrap();
    assert_eq!(first.etiquette, vec!["Bow when greeting".to_string()]);
    assert_eq!(first.trip_purpose.as_deref(), Some("business"));

    let second = provider.insights("tokyo", Some("Business")).await.unwrap();
    assert_eq!(second.customs, first.customs);
    mock.assert_async().await;
}

#[tokio::test]
async fn cultural_empty_payload_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/insights")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let provider = HttpCulturalProvider::new(
        CulturalApiConfig {
            base_url: server.url(),
            api_key: None,
            timeout_secs: 2,
        },
        cache().await,
    )
    .unwrap();

    assert!(matches!(
        provider.insights("Tokyo", None).await,
        Err(ProviderError::Malformed(_))
    ));
}

fn currency_provider(base_url: String, cache: CacheStore) -> HttpCurrencyProvider {
    HttpCurrencyProvider::new(
        CurrencyApiConfig {
            base_url,
            api_key: None,
            timeout_secs: 2,
        },
        cache,
    )
    .unwrap()
}

#[tokio::test]
async fn currency_convert_uses_cached_table() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/latest")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"base": "USD", "rates": {"EUR": 0.85, "GBP": 0.75}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let provider = currency_provider(server.url(), cache().await);

    let conversion = provider.convert("usd", "eur", 100.0).await.unwrap();
    assert_eq!(conversion.rate, 0.85);
    assert_eq!(conversion.converted, 85.0);
    assert_eq!(conversion.from_currency, "USD");
    assert_eq!(conversion.to_currency, "EUR");

    // Table is cached, so a second conversion must not refetch.
    let again = provider.convert("USD", "GBP", 10.0).await.unwrap();
    assert_eq!(again.rate, 0.75);
    mock.assert_async().await;
}

#[tokio::test]
async fn currency_missing_target_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/latest")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"base": "USD", "rates": {"EUR": 0.85}}).to_string())
        .create_async()
        .await;

    let provider = currency_provider(server.url(), cache().await);
    assert!(matches!(
        provider.convert("USD", "THB", 5.0).await,
        Err(ProviderError::Malformed(_))
    ));
}

#[tokio::test]
async fn suspicious_rate_forces_one_refetch() {
    let mut server = mockito::Server::new_async().await;
    // The same implausible table is served on both calls: the adapter must
    // refetch exactly once and then accept the refreshed (still tiny) rate.
    let mock = server
        .mock("GET", "/v1/latest")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"base": "USD", "rates": {"EUR": 1e-9}}).to_string())
        .expect(2)
        .create_async()
        .await;

    let provider = currency_provider(server.url(), cache().await);
    let conversion = provider.convert("USD", "EUR", 100.0).await.unwrap();
    assert_eq!(conversion.rate, 1e-9);
    mock.assert_async().await;
}
