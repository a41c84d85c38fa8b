//! Destination handler: an overview of a place, always backed by both the
//! weather and cultural contexts when the destination is known.

use crate::{
    llm_failure_response, missing_destination_response, resolve_destination, safe_provider,
    synthesize,
};
use async_trait::async_trait;
use llm_client::LlmClient;
use providers::{CulturalProvider, WeatherProvider};
use std::sync::Arc;
use tracing::instrument;
use tripbot_core::{
    Action, ChatRequest, ChatResponse, Intent, IntentHandler, QuickReply, Result,
};

const SYNTHESIS_PROMPT: &str = "You are a travel assistant. Give a short, inviting \
overview of the destination for a visitor, touching on what the current weather \
means for their plans and one or two cultural pointers. Plain text only.";

pub struct DestinationHandler {
    weather: Arc<dyn WeatherProvider>,
    cultural: Arc<dyn CulturalProvider>,
    llm: Arc<dyn LlmClient>,
}

impl DestinationHandler {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        cultural: Arc<dyn CulturalProvider>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            weather,
            cultural,
            llm,
        }
    }

    fn quick_replies() -> Vec<QuickReply> {
        vec![
            QuickReply::new("Weather details", Action::WeatherForecast),
            QuickReply::new("Cultural tips", Action::CulturalTips),
            QuickReply::new("Trip logistics", Action::LogisticsInfo),
        ]
    }
}

#[async_trait]
impl IntentHandler for DestinationHandler {
    fn intent(&self) -> Intent {
        Intent::Destination
    }

    #[instrument(skip(self, request))]
    async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let Some(destination) = resolve_destination(request) else {
            return Ok(missing_destination_response(
                "Which destination are you curious about?",
            ));
        };

        // Both contexts are fetched unconditionally once a destination is known.
        let weather = safe_provider("weather", self.weather.forecast(&destination)).await;
        let cultural = safe_provider(
            "cultural",
            self.cultural
                .insights(&destination, request.context.trip_purpose.as_deref()),
        )
        .await;

        let mut sections = Vec::new();
        if let Some(w) = &weather {
            sections.push(format!(
                "Current weather in {}: {:.1}°C, {}",
                w.destination, w.temperature_c, w.conditions
            ));
        }
        if let Some(c) = &cultural {
            sections.push(format!(
                "Cultural notes: {}",
                crate::cultural::CulturalHandler::describe(c)
            ));
        }

        let Some(message) = synthesize(&self.llm, SYNTHESIS_PROMPT, request, &sections).await
        else {
            return Ok(llm_failure_response());
        };

        let confidence = if weather.is_some() || cultural.is_some() {
            0.85
        } else {
            0.66
        };
        Ok(ChatResponse::new(message, confidence)
            .with_quick_replies(Self::quick_replies())
            .with_suggestions(vec![
                format!("Best time to visit {destination}"),
                format!("What to pack for {destination}"),
            ]))
    }
}
