//! Core types for the tripbot workspace: intents, actions, chat request/response,
//! conversation context, the shared extraction rule table, errors, and logging setup.

pub mod error;
pub mod extract;
pub mod logger;
pub mod types;

pub use error::{ProviderError, Result, TripError};
pub use types::{
    Action, ChatRequest, ChatResponse, ConversationContext, ConversationTurn, Intent,
    IntentHandler, QuickReply, TurnRole, UserProfile,
};
