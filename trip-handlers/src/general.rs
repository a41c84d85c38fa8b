//! General fallback handler: open conversation enriched with whatever trip
//! context can be resolved from the message.

use crate::{llm_failure_response, resolve_destination, safe_provider, synthesize};
use async_trait::async_trait;
use llm_client::LlmClient;
use providers::{CulturalProvider, WeatherProvider};
use std::sync::Arc;
use tracing::instrument;
use tripbot_core::{
    extract, Action, ChatRequest, ChatResponse, Intent, IntentHandler, QuickReply, Result,
};

const SYNTHESIS_PROMPT: &str = "You are a friendly travel assistant. Answer the \
traveler's message helpfully, drawing on any trip context provided. Plain text \
only.";

pub struct GeneralHandler {
    weather: Arc<dyn WeatherProvider>,
    cultural: Arc<dyn CulturalProvider>,
    llm: Arc<dyn LlmClient>,
}

impl GeneralHandler {
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
}

#[async_trait]
impl IntentHandler for GeneralHandler {
    fn intent(&self) -> Intent {
        Intent::General
    }

    #[instrument(skip(self, request))]
    async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse> {
        // Purpose parsed from the message wins; the stored context is the
        // fallback, not the other way around.
        let purpose = extract::extract_trip_purpose(&request.message)
            .map(str::to_string)
            .or_else(|| request.context.trip_purpose.clone());
        let destination = resolve_destination(request);

        let (weather, cultural) = match &destination {
            Some(dest) => (
                safe_provider("weather", self.weather.forecast(dest)).await,
                safe_provider("cultural", self.cultural.insights(dest, purpose.as_deref())).await,
            ),
            None => (None, None),
        };

        let mut sections = Vec::new();
        if let Some(dest) = &destination {
            sections.push(format!("Destination: {dest}"));
        }
        if let Some(p) = &purpose {
            sections.push(format!("Trip purpose: {p}"));
        }
        if let Some(w) = &weather {
            sections.push(format!(
                "Weather: {:.1}°C, {}",
                w.temperature_c, w.conditions
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

        // Enrichment quick replies for whichever contexts actually resolved.
        let mut quick_replies = Vec::new();
        if let Some(dest) = &destination {
            quick_replies.push(QuickReply::new(
                format!("More about {dest}"),
                Action::DestinationInfo,
            ));
        }
        if weather.is_some() {
            quick_replies.push(QuickReply::new("Weather details", Action::WeatherForecast));
        }
        if cultural.is_some() {
            quick_replies.push(QuickReply::new("Cultural tips", Action::CulturalTips));
        }
        if quick_replies.is_empty() {
            quick_replies.push(QuickReply::new("Set a destination", Action::SetDestination));
        }

        let mut suggestions = Vec::new();
        if let Some(dest) = &destination {
            suggestions.push(format!("Plan a day in {dest}"));
        }

        let confidence = if destination.is_some() { 0.85 } else { 0.66 };
        Ok(ChatResponse::new(message, confidence)
            .with_quick_replies(quick_replies)
            .with_suggestions(suggestions))
    }
}
