//! Core chat types: intent labels, quick-reply actions, conversation context,
//! the response envelope, and the IntentHandler trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Classification label for an inbound message. Closed set; every message
/// resolves to exactly one label, `General` on any ambiguity or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Currency,
    Weather,
    Cultural,
    Wardrobe,
    Style,
    Destination,
    Logistics,
    General,
}

impl Intent {
    /// All labels, in the order they are presented to the classifier LLM.
    pub const ALL: [Intent; 8] = [
        Intent::Currency,
        Intent::Weather,
        Intent::Cultural,
        Intent::Wardrobe,
        Intent::Style,
        Intent::Destination,
        Intent::Logistics,
        Intent::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Currency => "currency",
            Intent::Weather => "weather",
            Intent::Cultural => "cultural",
            Intent::Wardrobe => "wardrobe",
            Intent::Style => "style",
            Intent::Destination => "destination",
            Intent::Logistics => "logistics",
            Intent::General => "general",
        }
    }

    /// Parses a trimmed, lowercased label. Returns None for anything outside
    /// the closed set; callers map None to `General`.
    pub fn parse_label(label: &str) -> Option<Intent> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == label.trim().to_lowercase())
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quick-reply action identifier, shared between handlers (which emit them)
/// and the router/UI contract (which understands them). Wire format is the
/// snake_case token, e.g. `currency_convert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CurrencyConvert,
    CurrencyRate,
    CurrencyHelp,
    WeatherForecast,
    WeatherCity,
    CulturalTips,
    WardrobeAdvice,
    StyleTips,
    DestinationInfo,
    LogisticsInfo,
    SetDestination,
    GeneralChat,
}

impl Action {
    pub fn token(self) -> &'static str {
        match self {
            Action::CurrencyConvert => "currency_convert",
            Action::CurrencyRate => "currency_rate",
            Action::CurrencyHelp => "currency_help",
            Action::WeatherForecast => "weather_forecast",
            Action::WeatherCity => "weather_city",
            Action::CulturalTips => "cultural_tips",
            Action::WardrobeAdvice => "wardrobe_advice",
            Action::StyleTips => "style_tips",
            Action::DestinationInfo => "destination_info",
            Action::LogisticsInfo => "logistics_info",
            Action::SetDestination => "set_destination",
            Action::GeneralChat => "general_chat",
        }
    }

    /// The intent a UI-triggered action routes to.
    pub fn intent(self) -> Intent {
        match self {
            Action::CurrencyConvert | Action::CurrencyRate | Action::CurrencyHelp => {
                Intent::Currency
            }
            Action::WeatherForecast | Action::WeatherCity => Intent::Weather,
            Action::CulturalTips => Intent::Cultural,
            Action::WardrobeAdvice => Intent::Wardrobe,
            Action::StyleTips => Intent::Style,
            Action::DestinationInfo | Action::SetDestination => Intent::Destination,
            Action::LogisticsInfo => Intent::Logistics,
            Action::GeneralChat => Intent::General,
        }
    }
}

/// A tappable suggested reply: display text plus the action it triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickReply {
    pub text: String,
    pub action: Action,
}

impl QuickReply {
    pub fn new(text: impl Into<String>, action: Action) -> Self {
        Self {
            text: text.into(),
            action,
        }
    }
}

/// Response envelope returned for every chat turn. `confidence_score` is in
/// [0.0, 1.0]; 0.0 marks a degraded or fallback answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub confidence_score: f64,
    pub quick_replies: Vec<QuickReply>,
    pub suggestions: Vec<String>,
}

impl ChatResponse {
    pub fn new(message: impl Into<String>, confidence_score: f64) -> Self {
        Self {
            message: message.into(),
            confidence_score: confidence_score.clamp(0.0, 1.0),
            quick_replies: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// A zero-confidence response, used for missing preconditions and failures.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(message, 0.0)
    }

    pub fn with_quick_replies(mut self, quick_replies: Vec<QuickReply>) -> Self {
        self.quick_replies = quick_replies;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

/// Per-conversation state carried into each routing pass. Built per request
/// from stored session state plus values parsed from the current message;
/// immutable within a single pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    pub user_id: String,
    pub destination: Option<String>,
    /// Ordered (start, end) pair of ISO dates.
    pub travel_dates: Option<(String, String)>,
    /// Free-text label such as "business", "leisure", "active".
    pub trip_purpose: Option<String>,
}

impl ConversationContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }
}

/// Stored profile fields handlers fold into synthesis prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub home_currency: Option<String>,
    pub style_preference: Option<String>,
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One prior message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Everything a handler reads for one chat turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub context: ConversationContext,
    pub history: Vec<ConversationTurn>,
    pub profile: UserProfile,
}

/// One stateless handler per intent. Handlers read only the request, gather
/// contexts through injected providers, and always produce a well-formed
/// response or a typed error for the router to contain.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    /// The intent this handler serves; the router uses it as a dispatch key.
    fn intent(&self) -> Intent;

    async fn handle(&self, request: &ChatRequest) -> crate::error::Result<ChatResponse>;
}
