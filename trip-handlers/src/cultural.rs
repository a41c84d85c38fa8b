//! Cultural handler: etiquette and customs advice synthesized by the LLM
//! from the cultural-insight context.

use crate::{
    llm_failure_response, missing_destination_response, resolve_destination, safe_provider,
    synthesize,
};
use async_trait::async_trait;
use llm_client::LlmClient;
use providers::{CulturalContext, CulturalProvider};
use std::sync::Arc;
use tracing::instrument;
use tripbot_core::{
    Action, ChatRequest, ChatResponse, Intent, IntentHandler, QuickReply, Result,
};

const SYNTHESIS_PROMPT: &str = "You are a travel assistant specializing in local \
culture. Answer the traveler's question using the etiquette notes provided, in a \
few friendly sentences. Plain text only.";

pub struct CulturalHandler {
    provider: Arc<dyn CulturalProvider>,
    llm: Arc<dyn LlmClient>,
}

impl CulturalHandler {
    pub fn new(provider: Arc<dyn CulturalProvider>, llm: Arc<dyn LlmClient>) -> Self {
        Self { provider, llm }
    }

    fn quick_replies() -> Vec<QuickReply> {
        vec![
            QuickReply::new("Dress code", Action::StyleTips),
            QuickReply::new("What to pack", Action::WardrobeAdvice),
            QuickReply::new("More cultural tips", Action::CulturalTips),
        ]
    }

    pub(crate) fn describe(context: &CulturalContext) -> String {
        let mut parts = Vec::new();
        if let Some(summary) = &context.summary {
            parts.push(summary.clone());
        }
        if !context.etiquette.is_empty() {
            parts.push(format!("Etiquette: {}", context.etiquette.join("; ")));
        }
        if let Some(dress) = &context.dress_code {
            parts.push(format!("Dress code: {dress}"));
        }
        if !context.customs.is_empty() {
            parts.push(format!("Customs: {}", context.customs.join("; ")));
        }
        parts.join(" | ")
    }
}

#[async_trait]
impl IntentHandler for CulturalHandler {
    fn intent(&self) -> Intent {
        Intent::Cultural
    }

    #[instrument(skip(self, request))]
    async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let Some(destination) = resolve_destination(request) else {
            return Ok(missing_destination_response(
                "Which destination would you like cultural tips for?",
            ));
        };

        let cultural = safe_provider(
            "cultural",
            self.provider
                .insights(&destination, request.context.trip_purpose.as_deref()),
        )
        .await;

        let mut sections = Vec::new();
        if let Some(context) = &cultural {
            sections.push(format!(
                "Cultural notes for {destination}: {}",
                Self::describe(context)
            ));
        }

        let Some(message) = synthesize(&self.llm, SYNTHESIS_PROMPT, request, &sections).await
        else {
            return Ok(llm_failure_response());
        };

        let confidence = if cultural.is_some() { 0.85 } else { 0.66 };
        Ok(ChatResponse::new(message, confidence)
            .with_quick_replies(Self::quick_replies())
            .with_suggestions(vec![format!("Local customs in {destination}")]))
    }
}
