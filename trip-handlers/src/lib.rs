//! Per-intent chat handlers and the two-stage intent classifier.
//!
//! Every handler is stateless per invocation: it reads the [`ChatRequest`],
//! gathers zero or more contexts through injected provider traits (each call
//! absorbed to `None` on failure), and produces a [`ChatResponse`] with a
//! confidence score and intent-specific quick replies.

use llm_client::{ChatMessage, CompletionOptions, LlmClient};
use std::future::Future;
use std::sync::Arc;
use tracing::warn;
use tripbot_core::{Action, ChatRequest, ChatResponse, ProviderError, QuickReply, TurnRole};

pub mod classifier;
pub mod cultural;
pub mod currency;
pub mod currency_parse;
pub mod destination;
pub mod general;
pub mod logistics;
pub mod style;
pub mod wardrobe;
pub mod weather;

pub use classifier::IntentClassifier;
pub use cultural::CulturalHandler;
pub use currency::CurrencyHandler;
pub use currency_parse::{parse_currency_request, CurrencyRequestType, ParsedCurrencyRequest};
pub use destination::DestinationHandler;
pub use general::GeneralHandler;
pub use logistics::LogisticsHandler;
pub use style::StyleHandler;
pub use wardrobe::WardrobeHandler;
pub use weather::WeatherHandler;

/// How many history turns are folded into a synthesis prompt.
const HISTORY_WINDOW: usize = 6;

/// Awaits a provider call and absorbs any failure to `None`, logging the
/// typed error. Handlers proceed with degraded context instead of aborting.
pub(crate) async fn safe_provider<T, F>(provider: &'static str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(provider, error = %e, "Provider call failed, continuing without context");
            None
        }
    }
}

/// Destination for this turn: prefer the stored conversation context, fall
/// back to regex extraction from the current message.
pub(crate) fn resolve_destination(request: &ChatRequest) -> Option<String> {
    request
        .context
        .destination
        .clone()
        .or_else(|| tripbot_core::extract::extract_destination(&request.message))
}

/// Zero-confidence prompt asking the user for a destination, with three
/// example cities as quick replies.
pub(crate) fn missing_destination_response(question: &str) -> ChatResponse {
    ChatResponse::degraded(question).with_quick_replies(vec![
        QuickReply::new("Paris", Action::SetDestination),
        QuickReply::new("Tokyo", Action::SetDestination),
        QuickReply::new("New York", Action::SetDestination),
    ])
}

/// Fixed apology used whenever an LLM synthesis step fails.
pub(crate) fn llm_failure_response() -> ChatResponse {
    ChatResponse::degraded(
        "I'm sorry, I couldn't put together an answer just now. Please try again in a moment.",
    )
}

/// Runs LLM synthesis: system instruction, a window of conversation history,
/// then the user message with gathered context sections appended. Returns
/// `None` on any LLM failure.
pub(crate) async fn synthesize(
    llm: &Arc<dyn LlmClient>,
    system: &str,
    request: &ChatRequest,
    sections: &[String],
) -> Option<String> {
    let mut messages = vec![ChatMessage::system(system)];

    let start = request.history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &request.history[start..] {
        messages.push(match turn.role {
            TurnRole::User => ChatMessage::user(turn.content.clone()),
            TurnRole::Assistant => ChatMessage::assistant(turn.content.clone()),
        });
    }

    let mut prompt = request.message.clone();
    if let Some(name) = &request.profile.display_name {
        prompt.push_str(&format!("\n\nTraveler name: {name}"));
    }
    if !sections.is_empty() {
        prompt.push_str("\n\nContext:");
        for section in sections {
            prompt.push_str("\n- ");
            prompt.push_str(section);
        }
    }
    messages.push(ChatMessage::user(prompt));

    match llm.complete(messages, CompletionOptions::default()).await {
        Ok(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
        Err(e) => {
            warn!(error = %e, "LLM synthesis failed");
            None
        }
    }
}
