//! Wardrobe handler: packing advice from weather plus cultural dress norms.

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

const SYNTHESIS_PROMPT: &str = "You are a travel assistant helping someone pack. \
Use the weather and cultural notes provided to suggest what to bring and wear, \
in a short practical list. Plain text only.";

pub struct WardrobeHandler {
    weather: Arc<dyn WeatherProvider>,
    cultural: Arc<dyn CulturalProvider>,
    llm: Arc<dyn LlmClient>,
}

impl WardrobeHandler {
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
            QuickReply::new("Detailed forecast", Action::WeatherForecast),
            QuickReply::new("Style tips", Action::StyleTips),
            QuickReply::new("Cultural tips", Action::CulturalTips),
        ]
    }
}

#[async_trait]
impl IntentHandler for WardrobeHandler {
    fn intent(&self) -> Intent {
        Intent::Wardrobe
    }

    #[instrument(skip(self, request))]
    async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let Some(destination) = resolve_destination(request) else {
            return Ok(missing_destination_response(
                "Where are you headed? I'll tailor the packing list.",
            ));
        };

        // Weather first, then cultural; both optional.
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
                "Weather in {}: {:.1}°C, {}",
                w.destination, w.temperature_c, w.conditions
            ));
        }
        if let Some(c) = &cultural {
            sections.push(format!(
                "Cultural notes: {}",
                crate::cultural::CulturalHandler::describe(c)
            ));
        }
        if let Some(purpose) = &request.context.trip_purpose {
            sections.push(format!("Trip purpose: {purpose}"));
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
            .with_suggestions(vec![format!("Weather outlook for {destination}")]))
    }
}
