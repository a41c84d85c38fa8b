//! Currency handler: deterministic conversion and rate answers, no LLM.

use crate::currency_parse::{parse_currency_request, CurrencyRequestType};
use crate::safe_provider;
use async_trait::async_trait;
use providers::CurrencyProvider;
use std::sync::Arc;
use tracing::instrument;
use tripbot_core::{
    extract::SUPPORTED_CURRENCIES, Action, ChatRequest, ChatResponse, Intent, IntentHandler,
    QuickReply, Result,
};

const HELP_KEYWORDS: &[&str] = &["help", "which currencies", "how do i", "what can you"];

pub struct CurrencyHandler {
    provider: Arc<dyn CurrencyProvider>,
}

impl CurrencyHandler {
    pub fn new(provider: Arc<dyn CurrencyProvider>) -> Self {
        Self { provider }
    }

    fn help_response() -> ChatResponse {
        let codes = SUPPORTED_CURRENCIES.join(", ");
        ChatResponse::new(
            format!(
                "I can convert amounts or quote exchange rates between these currencies: {codes}. \
                 Try something like \"convert 100 USD to EUR\"."
            ),
            0.9,
        )
        .with_quick_replies(vec![
            QuickReply::new("Convert an amount", Action::CurrencyConvert),
            QuickReply::new("Show a rate", Action::CurrencyRate),
        ])
    }

    fn parse_failure_response() -> ChatResponse {
        ChatResponse::degraded(
            "Sorry, I couldn't work out which currencies you meant. \
             Try something like \"convert 100 USD to EUR\".",
        )
        .with_quick_replies(vec![
            QuickReply::new("Convert an amount", Action::CurrencyConvert),
            QuickReply::new("Currency help", Action::CurrencyHelp),
        ])
    }

    fn quick_replies(include_rate_only: bool) -> Vec<QuickReply> {
        let mut replies = Vec::new();
        if include_rate_only {
            replies.push(QuickReply::new("Show rate only", Action::CurrencyRate));
        }
        replies.push(QuickReply::new("Convert another amount", Action::CurrencyConvert));
        replies.push(QuickReply::new("Currency help", Action::CurrencyHelp));
        replies
    }
}

#[async_trait]
impl IntentHandler for CurrencyHandler {
    fn intent(&self) -> Intent {
        Intent::Currency
    }

    #[instrument(skip(self, request))]
    async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let lowered = request.message.to_lowercase();
        if HELP_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            return Ok(Self::help_response());
        }

        let Some(parsed) = parse_currency_request(&request.message) else {
            return Ok(Self::parse_failure_response());
        };

        let response = match parsed.request_type {
            CurrencyRequestType::Conversion => {
                match safe_provider(
                    "currency",
                    self.provider.convert(
                        &parsed.from_currency,
                        &parsed.to_currency,
                        parsed.amount,
                    ),
                )
                .await
                {
                    Some(conversion) => ChatResponse::new(
                        format!(
                            "{:.2} {} = {:.2} {}",
                            conversion.amount,
                            conversion.from_currency,
                            conversion.converted,
                            conversion.to_currency
                        ),
                        0.9,
                    )
                    .with_quick_replies(Self::quick_replies(parsed.amount > 0.0)),
                    None => ChatResponse::degraded(format!(
                        "Sorry, I couldn't fetch the {} to {} rate right now.",
                        parsed.from_currency, parsed.to_currency
                    ))
                    .with_quick_replies(Self::quick_replies(false)),
                }
            }
            CurrencyRequestType::Rate => {
                match safe_provider(
                    "currency",
                    self.provider
                        .convert(&parsed.from_currency, &parsed.to_currency, 1.0),
                )
                .await
                {
                    Some(conversion) => ChatResponse::new(
                        format!(
                            "1 {} = {:.4} {}",
                            conversion.from_currency, conversion.rate, conversion.to_currency
                        ),
                        0.9,
                    )
                    .with_quick_replies(Self::quick_replies(false)),
                    None => ChatResponse::degraded(format!(
                        "Sorry, I couldn't fetch the {} to {} rate right now.",
                        parsed.from_currency, parsed.to_currency
                    ))
                    .with_quick_replies(Self::quick_replies(false)),
                }
            }
            CurrencyRequestType::Help => Self::help_response(),
        };

        Ok(response)
    }
}
