//! Style handler: fashion and dress-code advice from cultural norms and the
//! traveler's stated preference.

use crate::{
    llm_failure_response, missing_destination_response, resolve_destination, safe_provider,
    synthesize,
};
use async_trait::async_trait;
use llm_client::LlmClient;
use providers::CulturalProvider;
use std::sync::Arc;
use tracing::instrument;
use tripbot_core::{
    Action, ChatRequest, ChatResponse, Intent, IntentHandler, QuickReply, Result,
};

const SYNTHESIS_PROMPT: &str = "You are a travel style advisor. Combine the local \
dress norms provided with the traveler's own style preference to give concrete \
outfit advice in a few sentences. Plain text only.";

pub struct StyleHandler {
    cultural: Arc<dyn CulturalProvider>,
    llm: Arc<dyn LlmClient>,
}

impl StyleHandler {
    pub fn new(cultural: Arc<dyn CulturalProvider>, llm: Arc<dyn LlmClient>) -> Self {
        Self { cultural, llm }
    }

    fn quick_replies() -> Vec<QuickReply> {
        vec![
            QuickReply::new("Wardrobe advice", Action::WardrobeAdvice),
            QuickReply::new("Cultural tips", Action::CulturalTips),
        ]
    }
}

#[async_trait]
impl IntentHandler for StyleHandler {
    fn intent(&self) -> Intent {
        Intent::Style
    }

    #[instrument(skip(self, request))]
    async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let Some(destination) = resolve_destination(request) else {
            return Ok(missing_destination_response(
                "Which destination should I match your style advice to?",
            ));
        };

        let cultural = safe_provider(
            "cultural",
            self.cultural
                .insights(&destination, request.context.trip_purpose.as_deref()),
        )
        .await;

        let mut sections = Vec::new();
        if let Some(c) = &cultural {
            if let Some(dress) = &c.dress_code {
                sections.push(format!("Local dress code in {destination}: {dress}"));
            }
            if !c.etiquette.is_empty() {
                sections.push(format!("Etiquette: {}", c.etiquette.join("; ")));
            }
        }
        if let Some(preference) = &request.profile.style_preference {
            sections.push(format!("Traveler's style preference: {preference}"));
        }

        let Some(message) = synthesize(&self.llm, SYNTHESIS_PROMPT, request, &sections).await
        else {
            return Ok(llm_failure_response());
        };

        let confidence = if cultural.is_some() { 0.85 } else { 0.66 };
        Ok(ChatResponse::new(message, confidence).with_quick_replies(Self::quick_replies()))
    }
}
