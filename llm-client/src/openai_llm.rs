//! OpenAI implementation of [`LlmClient`] over async-openai.

use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};
use tripbot_core::ProviderError;

use crate::{mask_token, ChatMessage, CompletionOptions, LlmClient, MessageRole};

/// Chat completion client for OpenAI-compatible endpoints. The API key is
/// kept only for masked logging.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
    model: String,
    api_key_for_logging: Option<String>,
}

impl OpenAiLlmClient {
    pub fn new(api_key: String) -> Self {
        let api_key_for_logging = Some(api_key.clone());
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "gpt-4o-mini".to_string(),
            api_key_for_logging,
        }
    }

    /// Custom base URL, e.g. for proxies or compatible endpoints.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let api_key_for_logging = Some(api_key.clone());
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "gpt-4o-mini".to_string(),
            api_key_for_logging,
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

fn to_openai_message(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, ProviderError> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| ProviderError::Unexpected(e.to_string()))?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| ProviderError::Unexpected(e.to_string()))?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| ProviderError::Unexpected(e.to_string()))?
            .into(),
    };
    Ok(openai_msg)
}

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    #[instrument(skip(self, messages))]
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<String, ProviderError> {
        let masked = self
            .api_key_for_logging
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "***".to_string());
        info!(
            model = %self.model,
            message_count = messages.len(),
            temperature = options.temperature,
            max_tokens = options.max_tokens,
            api_key = %masked,
            "LLM completion request"
        );

        let openai_messages = messages
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>, _>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(openai_messages)
            .temperature(options.temperature)
            .max_tokens(options.max_tokens)
            .build()
            .map_err(|e| ProviderError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if let Some(ref usage) = response.usage {
            info!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "LLM completion usage"
            );
        }

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ProviderError::Malformed("completion had no choices".to_string()))
    }
}
