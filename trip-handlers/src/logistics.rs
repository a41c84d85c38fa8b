//! Logistics handler: flights, hotels, transport. Extracts a travel-date
//! range from the message when the context has none.

use crate::{llm_failure_response, resolve_destination, synthesize};
use async_trait::async_trait;
use llm_client::LlmClient;
use std::sync::Arc;
use tracing::instrument;
use tripbot_core::{
    extract, Action, ChatRequest, ChatResponse, Intent, IntentHandler, QuickReply, Result,
};

const SYNTHESIS_PROMPT: &str = "You are a travel logistics assistant. Help with \
flights, accommodation, transport, visas, and itineraries using whatever trip \
details are provided. Plain text only.";

pub struct LogisticsHandler {
    llm: Arc<dyn LlmClient>,
}

impl LogisticsHandler {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn quick_replies() -> Vec<QuickReply> {
        vec![
            QuickReply::new("Itinerary help", Action::LogisticsInfo),
            QuickReply::new("More about the destination", Action::DestinationInfo),
        ]
    }
}

#[async_trait]
impl IntentHandler for LogisticsHandler {
    fn intent(&self) -> Intent {
        Intent::Logistics
    }

    #[instrument(skip(self, request))]
    async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let destination = resolve_destination(request);
        let travel_dates = request
            .context
            .travel_dates
            .clone()
            .or_else(|| extract::extract_date_range(&request.message));

        let mut sections = Vec::new();
        if let Some(dest) = &destination {
            sections.push(format!("Destination: {dest}"));
        }
        if let Some((start, end)) = &travel_dates {
            sections.push(format!("Travel dates: {start} to {end}"));
        }

        let Some(message) = synthesize(&self.llm, SYNTHESIS_PROMPT, request, &sections).await
        else {
            return Ok(llm_failure_response());
        };

        let confidence = if destination.is_some() || travel_dates.is_some() {
            0.85
        } else {
            0.66
        };
        Ok(ChatResponse::new(message, confidence).with_quick_replies(Self::quick_replies()))
    }
}
