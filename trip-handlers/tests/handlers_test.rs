//! Handler and classifier tests with mock providers and a mock LLM; nothing
//! here touches the network or a database.

use async_trait::async_trait;
use llm_client::{ChatMessage, CompletionOptions, LlmClient};
use providers::{
    Conversion, CulturalContext, CulturalProvider, CurrencyProvider, RateTable, WeatherContext,
    WeatherProvider,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trip_handlers::{
    CulturalHandler, CurrencyHandler, DestinationHandler, GeneralHandler, IntentClassifier,
    LogisticsHandler, StyleHandler, WardrobeHandler, WeatherHandler,
};
use tripbot_core::{
    Action, ChatRequest, ConversationContext, Intent, IntentHandler, ProviderError, UserProfile,
};

struct MockLlm {
    reply: Option<String>,
}

impl MockLlm {
    fn replying(reply: &str) -> Arc<dyn LlmClient> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
        })
    }

    fn failing() -> Arc<dyn LlmClient> {
        Arc::new(Self { reply: None })
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<String, ProviderError> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError::Unavailable("mock llm down".to_string())),
        }
    }
}

struct MockCurrency {
    rate: f64,
    available: bool,
}

#[async_trait]
impl CurrencyProvider for MockCurrency {
    async fn rates(&self, base: &str) -> Result<RateTable, ProviderError> {
        if !self.available {
            return Err(ProviderError::Unavailable("mock rates down".to_string()));
        }
        Ok(RateTable {
            base: base.to_uppercase(),
            rates: HashMap::from([("EUR".to_string(), self.rate)]),
            fetched_at: chrono::Utc::now(),
        })
    }

    async fn convert(
        &self,
        from_currency: &str,
        to_currency: &str,
        amount: f64,
    ) -> Result<Conversion, ProviderError> {
        if !self.available {
            return Err(ProviderError::Unavailable("mock rates down".to_string()));
        }
        Ok(Conversion {
            from_currency: from_currency.to_uppercase(),
            to_currency: to_currency.to_uppercase(),
            amount,
            rate: self.rate,
            converted: amount * self.rate,
        })
    }
}

struct MockWeather {
    available: bool,
}

#[async_trait]
impl WeatherProvider for MockWeather {
    async fn forecast(&self, destination: &str) -> Result<WeatherContext, ProviderError> {
        if !self.available {
            return Err(ProviderError::Unavailable("mock weather down".to_string()));
        }
        Ok(WeatherContext {
            destination: destination.to_string(),
            temperature_c: 21.0,
            conditions: "clear".to_string(),
            humidity: Some(50.0),
            wind_kmh: Some(10.0),
            forecast: vec![],
        })
    }
}

struct MockCultural {
    available: bool,
}

#[async_trait]
impl CulturalProvider for MockCultural {
    async fn insights(
        &self,
        destination: &str,
        trip_purpose: Option<&str>,
    ) -> Result<CulturalContext, ProviderError> {
        if !self.available {
            return Err(ProviderError::Unavailable("mock insights down".to_string()));
        }
        Ok(CulturalContext {
            destination: destination.to_string(),
            trip_purpose: trip_purpose.map(str::to_string),
            etiquette: vec!["Greet with a handshake".to_string()],
            dress_code: Some("smart casual".to_string()),
            customs: vec![],
            summary: None,
        })
    }
}

struct CountingWeather {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl WeatherProvider for CountingWeather {
    async fn forecast(&self, destination: &str) -> Result<WeatherContext, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        MockWeather { available: true }.forecast(destination).await
    }
}

struct CountingCultural {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CulturalProvider for CountingCultural {
    async fn insights(
        &self,
        destination: &str,
        trip_purpose: Option<&str>,
    ) -> Result<CulturalContext, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        MockCultural { available: true }
            .insights(destination, trip_purpose)
            .await
    }
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        context: ConversationContext::new("user-1"),
        history: vec![],
        profile: UserProfile::default(),
    }
}

fn request_with_destination(message: &str, destination: &str) -> ChatRequest {
    let mut req = request(message);
    req.context.destination = Some(destination.to_string());
    req
}

#[tokio::test]
async fn currency_conversion_is_deterministic() {
    let handler = CurrencyHandler::new(Arc::new(MockCurrency {
        rate: 0.85,
        available: true,
    }));

    let response = handler
        .handle(&request("convert 100 USD to EUR"))
        .await
        .unwrap();

    assert_eq!(response.message, "100.00 USD = 85.00 EUR");
    assert_eq!(response.confidence_score, 0.9);
    // An amount was given, so "Show rate only" leads the quick replies.
    assert_eq!(response.quick_replies[0].text, "Show rate only");
    assert_eq!(response.quick_replies[0].action, Action::CurrencyRate);
}

#[tokio::test]
async fn currency_rate_request_formats_rate() {
    let handler = CurrencyHandler::new(Arc::new(MockCurrency {
        rate: 0.85,
        available: true,
    }));

    let response = handler.handle(&request("usd to eur rate")).await.unwrap();
    assert_eq!(response.message, "1 USD = 0.8500 EUR");
    assert_eq!(response.confidence_score, 0.9);
}

#[tokio::test]
async fn currency_help_keywords_short_circuit() {
    let handler = CurrencyHandler::new(Arc::new(MockCurrency {
        rate: 0.85,
        available: true,
    }));

    let response = handler
        .handle(&request("help with currencies please"))
        .await
        .unwrap();
    assert!(response.message.contains("USD"));
    assert_eq!(response.confidence_score, 0.9);
}

#[tokio::test]
async fn currency_unparseable_message_is_low_confidence() {
    let handler = CurrencyHandler::new(Arc::new(MockCurrency {
        rate: 0.85,
        available: true,
    }));

    let response = handler
        .handle(&request("convert my money somewhere"))
        .await
        .unwrap();
    assert_eq!(response.confidence_score, 0.0);
}

#[tokio::test]
async fn currency_provider_failure_degrades() {
    let handler = CurrencyHandler::new(Arc::new(MockCurrency {
        rate: 0.85,
        available: false,
    }));

    let response = handler
        .handle(&request("convert 100 USD to EUR"))
        .await
        .unwrap();
    assert_eq!(response.confidence_score, 0.0);
    assert!(response.message.contains("USD"));
}

#[tokio::test]
async fn weather_without_destination_prompts_with_three_cities() {
    let handler = WeatherHandler::new(
        Arc::new(MockWeather { available: true }),
        MockLlm::replying("Pleasant out."),
    );

    let response = handler
        .handle(&request("what's the forecast looking like"))
        .await
        .unwrap();

    assert_eq!(response.confidence_score, 0.0);
    assert_eq!(response.quick_replies.len(), 3);
    for reply in &response.quick_replies {
        assert_eq!(reply.action, Action::SetDestination);
    }
}

#[tokio::test]
async fn weather_resolves_destination_from_message() {
    let handler = WeatherHandler::new(
        Arc::new(MockWeather { available: true }),
        MockLlm::replying("Bring sunglasses."),
    );

    let response = handler
        .handle(&request("What's the weather like in Tokyo?"))
        .await
        .unwrap();

    assert_eq!(response.confidence_score, 0.8);
    assert!(response.message.contains("Tokyo"));
    assert!(response.message.contains("Bring sunglasses."));
    assert_eq!(response.quick_replies[0].text, "Detailed forecast");
}

#[tokio::test]
async fn weather_keeps_deterministic_headline_when_llm_fails() {
    let handler = WeatherHandler::new(
        Arc::new(MockWeather { available: true }),
        MockLlm::failing(),
    );

    let response = handler
        .handle(&request_with_destination("how is it outside", "Tokyo"))
        .await
        .unwrap();

    assert_eq!(response.confidence_score, 0.8);
    assert!(response.message.contains("Tokyo"));
}

#[tokio::test]
async fn weather_provider_failure_degrades() {
    let handler = WeatherHandler::new(
        Arc::new(MockWeather { available: false }),
        MockLlm::replying("unused"),
    );

    let response = handler
        .handle(&request_with_destination("weather please", "Tokyo"))
        .await
        .unwrap();
    assert_eq!(response.confidence_score, 0.0);
    assert!(response.message.contains("Tokyo"));
}

#[tokio::test]
async fn cultural_llm_failure_is_zero_confidence() {
    let handler = CulturalHandler::new(
        Arc::new(MockCultural { available: true }),
        MockLlm::failing(),
    );

    let response = handler
        .handle(&request_with_destination("local etiquette?", "Tokyo"))
        .await
        .unwrap();
    assert_eq!(response.confidence_score, 0.0);
}

#[tokio::test]
async fn general_appends_enrichment_quick_replies() {
    let handler = GeneralHandler::new(
        Arc::new(MockWeather { available: true }),
        Arc::new(MockCultural { available: true }),
        MockLlm::replying("Rome is lovely this time of year."),
    );

    let response = handler
        .handle(&request_with_destination("tell me something nice", "Rome"))
        .await
        .unwrap();

    let texts: Vec<&str> = response
        .quick_replies
        .iter()
        .map(|r| r.text.as_str())
        .collect();
    assert!(texts.contains(&"More about Rome"));
    assert!(texts.contains(&"Weather details"));
    assert!(texts.contains(&"Cultural tips"));
    assert_eq!(response.suggestions, vec!["Plan a day in Rome".to_string()]);
    assert_eq!(response.confidence_score, 0.85);
}

#[tokio::test]
async fn general_without_context_offers_destination_setup() {
    let handler = GeneralHandler::new(
        Arc::new(MockWeather { available: true }),
        Arc::new(MockCultural { available: true }),
        MockLlm::replying("Happy to help!"),
    );

    let response = handler.handle(&request("hey")).await.unwrap();
    assert_eq!(response.confidence_score, 0.66);
    assert_eq!(response.quick_replies.len(), 1);
    assert_eq!(response.quick_replies[0].action, Action::SetDestination);
    assert!(response.suggestions.is_empty());
}

#[tokio::test]
async fn destination_fetches_weather_and_cultural_once_each() {
    let weather_calls = Arc::new(AtomicUsize::new(0));
    let cultural_calls = Arc::new(AtomicUsize::new(0));
    let handler = DestinationHandler::new(
        Arc::new(CountingWeather {
            calls: weather_calls.clone(),
        }),
        Arc::new(CountingCultural {
            calls: cultural_calls.clone(),
        }),
        MockLlm::replying("Kyoto rewards slow mornings."),
    );

    let response = handler
        .handle(&request_with_destination("tell me about it", "Kyoto"))
        .await
        .unwrap();

    // A known destination means both contexts are gathered, each exactly once.
    assert_eq!(weather_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cultural_calls.load(Ordering::SeqCst), 1);
    assert_eq!(response.confidence_score, 0.85);
}

#[tokio::test]
async fn destination_without_one_prompts_with_three_cities() {
    let handler = DestinationHandler::new(
        Arc::new(MockWeather { available: true }),
        Arc::new(MockCultural { available: true }),
        MockLlm::replying("unused"),
    );

    let response = handler.handle(&request("somewhere fun?")).await.unwrap();
    assert_eq!(response.confidence_score, 0.0);
    assert_eq!(response.quick_replies.len(), 3);
}

#[tokio::test]
async fn wardrobe_gathers_both_contexts_for_known_destination() {
    let weather_calls = Arc::new(AtomicUsize::new(0));
    let cultural_calls = Arc::new(AtomicUsize::new(0));
    let handler = WardrobeHandler::new(
        Arc::new(CountingWeather {
            calls: weather_calls.clone(),
        }),
        Arc::new(CountingCultural {
            calls: cultural_calls.clone(),
        }),
        MockLlm::replying("Pack layers and one smart outfit."),
    );

    let response = handler
        .handle(&request_with_destination("what should I pack", "Oslo"))
        .await
        .unwrap();

    assert_eq!(weather_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cultural_calls.load(Ordering::SeqCst), 1);
    assert_eq!(response.confidence_score, 0.85);
}

#[tokio::test]
async fn wardrobe_without_destination_prompts_with_three_cities() {
    let handler = WardrobeHandler::new(
        Arc::new(MockWeather { available: true }),
        Arc::new(MockCultural { available: true }),
        MockLlm::replying("unused"),
    );

    let response = handler.handle(&request("what should I pack")).await.unwrap();
    assert_eq!(response.confidence_score, 0.0);
    assert_eq!(response.quick_replies.len(), 3);
    for reply in &response.quick_replies {
        assert_eq!(reply.action, Action::SetDestination);
    }
}

#[tokio::test]
async fn style_without_destination_prompts_with_three_cities() {
    let handler = StyleHandler::new(
        Arc::new(MockCultural { available: true }),
        MockLlm::replying("unused"),
    );

    let response = handler
        .handle(&request("will my outfits work there?"))
        .await
        .unwrap();
    assert_eq!(response.confidence_score, 0.0);
    assert_eq!(response.quick_replies.len(), 3);
}

#[tokio::test]
async fn style_uses_cultural_context_and_preference() {
    let handler = StyleHandler::new(
        Arc::new(MockCultural { available: true }),
        MockLlm::replying("Smart casual fits right in."),
    );

    let mut req = request_with_destination("what do people wear out?", "Milan");
    req.profile.style_preference = Some("minimalist".to_string());

    let response = handler.handle(&req).await.unwrap();
    assert_eq!(response.confidence_score, 0.85);
    assert!(response.message.contains("Smart casual"));
}

#[tokio::test]
async fn logistics_extracts_date_range_from_message() {
    let handler = LogisticsHandler::new(MockLlm::replying("Book trains early."));

    let response = handler
        .handle(&request("Trip from 2025-09-02 to 2025-09-09, need an itinerary"))
        .await
        .unwrap();
    // Dates resolved from the message count as gathered context.
    assert_eq!(response.confidence_score, 0.85);
}

#[tokio::test]
async fn classifier_falls_back_to_llm_label() {
    let classifier = IntentClassifier::new(MockLlm::replying(" Wardrobe \n"));
    assert_eq!(
        classifier.classify("hmm, thinking about my trip").await,
        Intent::Wardrobe
    );
}

#[tokio::test]
async fn classifier_rejects_labels_outside_the_set() {
    let classifier = IntentClassifier::new(MockLlm::replying("pirate"));
    assert_eq!(
        classifier.classify("yarr, where be the doubloons").await,
        Intent::General
    );
}

#[tokio::test]
async fn classifier_llm_failure_is_general() {
    let classifier = IntentClassifier::new(MockLlm::failing());
    assert_eq!(classifier.classify("completely unclassifiable").await, Intent::General);
}

#[tokio::test]
async fn classifier_is_total_over_odd_inputs() {
    let classifier = IntentClassifier::new(MockLlm::failing());
    for message in ["", "   ", "日本へ行きたい", "💡🚀", "\0\t\n"] {
        let intent = classifier.classify(message).await;
        assert!(Intent::ALL.contains(&intent));
    }
}
