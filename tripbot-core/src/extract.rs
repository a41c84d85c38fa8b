//! Shared extraction rule table: intent keywords, UI action tokens, destination
//! and date-range regexes, trip-purpose keyword groups, and the supported
//! currency set. Both the classifier and individual handlers read from here so
//! the rules cannot drift apart.

use crate::types::{Action, Intent};
use once_cell::sync::Lazy;
use regex::Regex;

/// Keyword lists checked by the stage-1 classifier, in fixed priority order.
/// First category with a hit wins.
pub const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Currency,
        &[
            "currency",
            "exchange rate",
            "convert",
            "how much is",
            "usd",
            "eur",
            "gbp",
            "jpy",
        ],
    ),
    (
        Intent::Weather,
        &[
            "weather",
            "forecast",
            "temperature",
            "rain",
            "snow",
            "sunny",
            "humid",
            "degrees",
        ],
    ),
    (
        Intent::Wardrobe,
        &[
            "pack",
            "packing",
            "wardrobe",
            "what to wear",
            "what should i wear",
            "suitcase",
            "clothes",
        ],
    ),
    (
        Intent::Style,
        &["style", "fashion", "outfit", "dress code", "look good"],
    ),
    (
        Intent::Destination,
        &[
            "destination",
            "where should",
            "recommend",
            "things to do",
            "attractions",
            "sightseeing",
        ],
    ),
    (
        Intent::Logistics,
        &[
            "flight", "hotel", "transport", "visa", "itinerary", "booking", "airport", "train",
        ],
    ),
];

/// UI action tokens checked before any keyword, for deterministic
/// button-triggered routing.
pub const ACTION_TOKENS: &[Action] = &[
    Action::CurrencyConvert,
    Action::CurrencyRate,
    Action::CurrencyHelp,
    Action::WeatherForecast,
    Action::WeatherCity,
    Action::CulturalTips,
    Action::WardrobeAdvice,
    Action::StyleTips,
    Action::DestinationInfo,
    Action::LogisticsInfo,
    Action::SetDestination,
    Action::GeneralChat,
];

/// Returns the action whose wire token appears in the message, if any.
pub fn match_action_token(message: &str) -> Option<Action> {
    let lowered = message.to_lowercase();
    ACTION_TOKENS
        .iter()
        .copied()
        .find(|action| lowered.contains(action.token()))
}

/// Stage-1 keyword match over [`INTENT_KEYWORDS`]. First category wins.
pub fn match_intent_keywords(message: &str) -> Option<Intent> {
    let lowered = message.to_lowercase();
    for (intent, keywords) in INTENT_KEYWORDS {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return Some(*intent);
        }
    }
    None
}

/// Destination phrase patterns, tried in order; first match wins. The bare
/// "in X" / "to X" forms require a capitalized place name to avoid matching
/// ordinary prose.
static DESTINATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bgoing to ([A-Za-z][A-Za-z '\-]*)",
        r"(?i)\bvisiting ([A-Za-z][A-Za-z '\-]*)",
        r"(?i)\btrip to ([A-Za-z][A-Za-z '\-]*)",
        r"(?i)\bi'?m in ([A-Za-z][A-Za-z '\-]*)",
        r"\b[Ii]n ([A-Z][A-Za-z'\-]*(?: [A-Z][A-Za-z'\-]*)*)",
        r"\b[Tt]o ([A-Z][A-Za-z'\-]*(?: [A-Z][A-Za-z'\-]*)*)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("destination pattern"))
    .collect()
});

/// Words that terminate a captured place name ("going to Paris for business").
const DESTINATION_STOP_WORDS: &[&str] = &[
    "for", "on", "in", "at", "next", "this", "during", "with", "and", "from", "to", "the",
    "tomorrow", "today", "soon", "because",
];

/// Extracts a destination from free text. Returns None when no pattern
/// matches or the captured name is empty after trimming.
pub fn extract_destination(message: &str) -> Option<String> {
    for pattern in DESTINATION_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(message) {
            if let Some(raw) = caps.get(1) {
                if let Some(place) = clean_destination(raw.as_str()) {
                    return Some(place);
                }
            }
        }
    }
    None
}

fn clean_destination(raw: &str) -> Option<String> {
    let mut words = Vec::new();
    for word in raw.split_whitespace() {
        let trimmed = word.trim_matches(|c: char| c.is_ascii_punctuation());
        if trimmed.is_empty() {
            break;
        }
        if DESTINATION_STOP_WORDS.contains(&trimmed.to_lowercase().as_str()) {
            break;
        }
        words.push(trimmed);
    }
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Travel date-range patterns, tried in order; first match wins.
static DATE_RANGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d{4}-\d{2}-\d{2})\s+until\s+(\d{4}-\d{2}-\d{2})",
        r"from\s+(\d{4}-\d{2}-\d{2})\s+to\s+(\d{4}-\d{2}-\d{2})",
        r"(\d{4}-\d{2}-\d{2})\s+to\s+(\d{4}-\d{2}-\d{2})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("date range pattern"))
    .collect()
});

/// Extracts an ordered (start, end) pair of ISO dates from free text.
pub fn extract_date_range(message: &str) -> Option<(String, String)> {
    for pattern in DATE_RANGE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(message) {
            let start = caps.get(1)?.as_str().to_string();
            let end = caps.get(2)?.as_str().to_string();
            return Some((start, end));
        }
    }
    None
}

/// Trip-purpose keyword groups; the first group with any hit wins (stable
/// iteration order).
pub const PURPOSE_GROUPS: &[(&str, &[&str])] = &[
    (
        "business",
        &["business", "work", "meeting", "conference", "client"],
    ),
    (
        "formal",
        &["formal", "wedding", "gala", "ceremony", "black tie"],
    ),
    (
        "active",
        &["active", "hiking", "hike", "sport", "outdoor", "adventure", "running"],
    ),
];

/// Parses a trip purpose from free text via [`PURPOSE_GROUPS`].
pub fn extract_trip_purpose(message: &str) -> Option<&'static str> {
    let lowered = message.to_lowercase();
    for (purpose, keywords) in PURPOSE_GROUPS {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return Some(purpose);
        }
    }
    None
}

/// Currency codes the currency handler and adapter accept.
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF", "CNY", "SEK", "NOK", "DKK", "INR", "MXN",
    "BRL", "SGD", "HKD", "KRW", "THB", "NZD", "PLN", "TRY", "ZAR",
];

/// Checks a 3-letter code against [`SUPPORTED_CURRENCIES`] (case-insensitive).
pub fn is_supported_currency(code: &str) -> bool {
    let upper = code.trim().to_uppercase();
    SUPPORTED_CURRENCIES.contains(&upper.as_str())
}
