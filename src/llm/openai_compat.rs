//! Chat completions backend for Ollama and other OpenAI-compatible servers.

use super::{with_retries, LanguageModel, PromptMessage, Role};
use crate::config::LlmSettings;
use crate::error::{PlanetaryError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

const INITIAL_BACKOFF_MS: u64 = 500;

/// Language model reached through the chat completions API.
pub struct OpenAICompatModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    timeout: Duration,
    max_retries: u32,
}

impl OpenAICompatModel {
    /// Build the model client from settings.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries,
        })
    }

    async fn complete_once(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| PlanetaryError::ModelUnavailable(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PlanetaryError::ModelUnavailable(format!("Chat API error: {}", e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PlanetaryError::ModelUnavailable("No response from model".to_string()))?;

        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for OpenAICompatModel {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
        let request_messages = to_request_messages(messages)?;
        debug!(model = %self.model, messages = request_messages.len(), "sending chat completion");

        with_retries(
            self.max_retries,
            self.timeout,
            Duration::from_millis(INITIAL_BACKOFF_MS),
            || self.complete_once(request_messages.clone()),
        )
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Map prompt messages onto chat completion messages.
///
/// Tool results are sent as user messages: the planner never uses native tool
/// calls, and strict servers reject `tool` messages without a matching call id.
fn to_request_messages(messages: &[PromptMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
    messages
        .iter()
        .map(|m| {
            let built: ChatCompletionRequestMessage = match m.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(m.content.clone())
                    .build()
                    .map_err(|e| PlanetaryError::ModelUnavailable(e.to_string()))?
                    .into(),
                Role::User | Role::Tool => ChatCompletionRequestUserMessageArgs::default()
                    .content(m.content.clone())
                    .build()
                    .map_err(|e| PlanetaryError::ModelUnavailable(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(m.content.clone())
                    .build()
                    .map_err(|e| PlanetaryError::ModelUnavailable(e.to_string()))?
                    .into(),
            };
            Ok(built)
        })
        .collect()
}
