//! # LLM client abstraction
//!
//! Defines the object-safe [`LlmClient`] trait and an OpenAI implementation.
//! The classifier and the synthesis paths use different temperature and token
//! budgets, so both travel with the request as [`CompletionOptions`].
//!
//! Failures surface as [`ProviderError`] so callers can degrade uniformly.

use async_trait::async_trait;
use tripbot_core::ProviderError;

mod config;
mod openai_llm;

pub use config::EnvLlmConfig;
pub use openai_llm::OpenAiLlmClient;

/// Role of a message, one-to-one with Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single chat message, one-to-one with one element of the `messages` array.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling and length budget for one completion request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u16,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

impl CompletionOptions {
    /// Deterministic single-word budget, used by the intent classifier.
    pub const fn classification() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 8,
        }
    }
}

/// LLM completion interface. Implementations own transport, model choice,
/// and auth; callers only hand over messages and options.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<String, ProviderError>;
}

/// Masks an API key for safe logging: first 7 bytes + "***" + last 4 bytes,
/// or just "***" when the key is too short to mask partially or the cut
/// points fall inside a multi-byte character.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_char_boundary(7) || !token.is_char_boundary(len - 4) {
        return "***".to_string();
    }
    format!("{}***{}", &token[..7], &token[len - 4..])
}
