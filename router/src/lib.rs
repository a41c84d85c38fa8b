//! Total message router. One entry point, [`MessageRouter::route_message`],
//! classifies the turn, dispatches to the registered handler, and contains
//! every failure mode behind it: a handler error, a handler panic, or a
//! missing registration all resolve to a fixed apology response. Callers
//! never see an `Err` or a propagated panic from a routing pass.

use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use trip_handlers::IntentClassifier;
use tripbot_core::{ChatRequest, ChatResponse, Intent, IntentHandler};

const APOLOGY: &str =
    "I'm sorry, something went wrong while handling that. Please try again in a moment.";

pub struct MessageRouter {
    classifier: IntentClassifier,
    handlers: HashMap<Intent, Arc<dyn IntentHandler>>,
    fallback: Arc<dyn IntentHandler>,
}

impl MessageRouter {
    /// Creates a router with the given classifier and the fallback handler
    /// used for `General` and for any intent without a registration.
    pub fn new(classifier: IntentClassifier, fallback: Arc<dyn IntentHandler>) -> Self {
        Self {
            classifier,
            handlers: HashMap::new(),
            fallback,
        }
    }

    /// Registers a handler under the intent it reports. Last registration
    /// for an intent wins.
    pub fn register(mut self, handler: Arc<dyn IntentHandler>) -> Self {
        self.handlers.insert(handler.intent(), handler);
        self
    }

    fn handler_for(&self, intent: Intent) -> &Arc<dyn IntentHandler> {
        match self.handlers.get(&intent) {
            Some(handler) => handler,
            None => {
                if intent != Intent::General {
                    warn!(intent = %intent, "No handler registered, using fallback");
                }
                &self.fallback
            }
        }
    }

    fn apology() -> ChatResponse {
        ChatResponse::degraded(APOLOGY)
    }

    /// Routes one chat turn. Never fails: classification failures resolve to
    /// `General` inside the classifier, and handler errors or panics are
    /// absorbed here into the apology response.
    #[instrument(skip(self, request), fields(user_id = %request.context.user_id))]
    pub async fn route_message(&self, request: &ChatRequest) -> ChatResponse {
        let intent = self.classifier.classify(&request.message).await;
        let handler = self.handler_for(intent);

        let outcome = AssertUnwindSafe(handler.handle(request)).catch_unwind().await;
        match outcome {
            Ok(Ok(response)) => {
                info!(
                    intent = %intent,
                    confidence = response.confidence_score,
                    "Turn handled"
                );
                response
            }
            Ok(Err(e)) => {
                error!(intent = %intent, error = %e, "Handler failed");
                Self::apology()
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<String>()
                    .map(String::as_str)
                    .or_else(|| panic.downcast_ref::<&str>().copied())
                    .unwrap_or("non-string panic payload");
                error!(intent = %intent, detail, "Handler panicked");
                Self::apology()
            }
        }
    }
}
