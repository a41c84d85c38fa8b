//! Weather handler: deterministic headline from the normalized forecast plus
//! optional LLM commentary.

use crate::{missing_destination_response, resolve_destination, safe_provider, synthesize};
use async_trait::async_trait;
use llm_client::LlmClient;
use providers::{WeatherContext, WeatherProvider};
use std::sync::Arc;
use tracing::instrument;
use tripbot_core::{
    Action, ChatRequest, ChatResponse, Intent, IntentHandler, QuickReply, Result,
};

const SYNTHESIS_PROMPT: &str = "You are a travel assistant. Given current weather \
data for a destination, add one or two short sentences of practical advice for a \
visitor. Plain text only.";

pub struct WeatherHandler {
    provider: Arc<dyn WeatherProvider>,
    llm: Arc<dyn LlmClient>,
}

impl WeatherHandler {
    pub fn new(provider: Arc<dyn WeatherProvider>, llm: Arc<dyn LlmClient>) -> Self {
        Self { provider, llm }
    }

    fn quick_replies() -> Vec<QuickReply> {
        vec![
            QuickReply::new("Detailed forecast", Action::WeatherForecast),
            QuickReply::new("Weather for different city", Action::WeatherCity),
        ]
    }

    fn headline(weather: &WeatherContext) -> String {
        format!(
            "Weather in {}: {:.1}°C, {}.",
            weather.destination, weather.temperature_c, weather.conditions
        )
    }

    fn describe(weather: &WeatherContext) -> String {
        let mut parts = vec![format!(
            "{}: {:.1}°C, {}",
            weather.destination, weather.temperature_c, weather.conditions
        )];
        if let Some(humidity) = weather.humidity {
            parts.push(format!("humidity {humidity:.0}%"));
        }
        if let Some(wind) = weather.wind_kmh {
            parts.push(format!("wind {wind:.0} km/h"));
        }
        for day in weather.forecast.iter().take(3) {
            parts.push(format!(
                "{}: {:.0}-{:.0}°C, {}",
                day.date, day.low_c, day.high_c, day.conditions
            ));
        }
        parts.join("; ")
    }
}

#[async_trait]
impl IntentHandler for WeatherHandler {
    fn intent(&self) -> Intent {
        Intent::Weather
    }

    #[instrument(skip(self, request))]
    async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let Some(destination) = resolve_destination(request) else {
            return Ok(missing_destination_response(
                "Which city would you like the weather for?",
            ));
        };

        let weather = safe_provider("weather", self.provider.forecast(&destination)).await;

        let Some(weather) = weather else {
            return Ok(ChatResponse::degraded(format!(
                "Sorry, I couldn't fetch the weather for {destination} right now."
            ))
            .with_quick_replies(Self::quick_replies()));
        };

        let mut message = Self::headline(&weather);
        let sections = vec![format!("Weather data: {}", Self::describe(&weather))];
        if let Some(commentary) = synthesize(&self.llm, SYNTHESIS_PROMPT, request, &sections).await
        {
            message.push(' ');
            message.push_str(&commentary);
        }

        Ok(ChatResponse::new(message, 0.8)
            .with_quick_replies(Self::quick_replies())
            .with_suggestions(vec![format!("What should I pack for {destination}?")]))
    }
}
