//! Two-stage intent classification: a synchronous rule pass over the shared
//! extraction table, then an LLM call constrained to the closed label set.
//! Total by construction: every failure path resolves to `Intent::General`.

use llm_client::{ChatMessage, CompletionOptions, LlmClient};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use tripbot_core::{extract, Intent, ProviderError};

const CLASSIFIER_SYSTEM_PROMPT: &str = "\
You classify one travel-assistant message into exactly one category. \
Reply with a single lowercase word from this list and nothing else:\n\
currency - exchange rates and money conversion\n\
weather - forecasts, temperature, conditions\n\
cultural - local etiquette, customs, traditions\n\
wardrobe - what to pack or wear for a trip\n\
style - fashion and dress-code advice\n\
destination - places to go, sights, recommendations\n\
logistics - flights, hotels, transport, visas, itineraries\n\
general - anything else";

pub struct IntentClassifier {
    llm: Arc<dyn LlmClient>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Stage 1: explicit UI action tokens first, then the keyword table in
    /// fixed priority order. No I/O; used for deterministic button routing.
    pub fn classify_heuristic(message: &str) -> Option<Intent> {
        if let Some(action) = extract::match_action_token(message) {
            return Some(action.intent());
        }
        extract::match_intent_keywords(message)
    }

    /// Full classification: stage 1, then the LLM. Any LLM failure or a
    /// reply outside the closed set resolves to `General`.
    #[instrument(skip(self))]
    pub async fn classify(&self, message: &str) -> Intent {
        if let Some(intent) = Self::classify_heuristic(message) {
            debug!(intent = %intent, "Classified by rule table");
            return intent;
        }
        match self.classify_with_llm(message).await {
            Ok(intent) => {
                debug!(intent = %intent, "Classified by LLM");
                intent
            }
            Err(e) => {
                warn!(error = %e, "LLM classification failed, defaulting to general");
                Intent::General
            }
        }
    }

    async fn classify_with_llm(&self, message: &str) -> Result<Intent, ProviderError> {
        let reply = self
            .llm
            .complete(
                vec![
                    ChatMessage::system(CLASSIFIER_SYSTEM_PROMPT),
                    ChatMessage::user(message),
                ],
                CompletionOptions::classification(),
            )
            .await?;
        Ok(Intent::parse_label(&reply).unwrap_or(Intent::General))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_matches_keywords_in_priority_order() {
        assert_eq!(
            IntentClassifier::classify_heuristic("what's the weather in Oslo"),
            Some(Intent::Weather)
        );
        assert_eq!(
            IntentClassifier::classify_heuristic("help me pack a suitcase"),
            Some(Intent::Wardrobe)
        );
        assert_eq!(IntentClassifier::classify_heuristic("hi there"), None);
    }

    #[test]
    fn heuristic_prefers_action_tokens() {
        assert_eq!(
            IntentClassifier::classify_heuristic("cultural_tips"),
            Some(Intent::Cultural)
        );
        // Token wins even when keywords from another category are present.
        assert_eq!(
            IntentClassifier::classify_heuristic("weather_forecast convert"),
            Some(Intent::Weather)
        );
    }
}
