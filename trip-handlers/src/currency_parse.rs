//! In-house parser turning free text into a structured currency request.

use once_cell::sync::Lazy;
use regex::Regex;
use tripbot_core::extract::is_supported_currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyRequestType {
    Conversion,
    Rate,
    Help,
}

/// A parsed currency request. Both codes are members of the supported set.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCurrencyRequest {
    pub from_currency: String,
    pub to_currency: String,
    pub amount: f64,
    pub request_type: CurrencyRequestType,
}

static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z]{3})\b").expect("currency code pattern"));
static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("amount pattern"));

/// Parses a message like "convert 100 USD to EUR". Returns None unless two
/// distinct supported currency codes are present. A positive amount makes a
/// `Conversion`; otherwise the request is for the `Rate` alone.
pub fn parse_currency_request(message: &str) -> Option<ParsedCurrencyRequest> {
    let mut codes = Vec::new();
    for caps in CODE_PATTERN.captures_iter(message) {
        let code = caps.get(1)?.as_str().to_uppercase();
        if is_supported_currency(&code) && !codes.contains(&code) {
            codes.push(code);
        }
    }
    if codes.len() < 2 {
        return None;
    }

    let amount = AMOUNT_PATTERN
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);

    let request_type = if amount > 0.0 {
        CurrencyRequestType::Conversion
    } else {
        CurrencyRequestType::Rate
    };

    Some(ParsedCurrencyRequest {
        from_currency: codes[0].clone(),
        to_currency: codes[1].clone(),
        amount,
        request_type,
    })
}
