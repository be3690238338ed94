//! Completion service abstraction.
//!
//! Summaries and chat replies both go through a single chat-completion call.
//! The trait keeps the remote API out of the summarizer and responder so they
//! can be exercised without a network.

use crate::config::CompletionSettings;
use crate::error::{RecapError, Result};
use crate::openai::{create_client, ApiKey};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Speaker of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One message of a completion prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }
}

/// A single completion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Trait for remote language-model services.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send one request and return the generated text.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}

/// Completion service backed by an OpenAI-compatible API.
pub struct OpenAICompletion {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompletion {
    pub fn new(client: Client<OpenAIConfig>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    /// Build from settings, optionally overriding the model.
    pub fn from_settings(
        settings: &CompletionSettings,
        key: &ApiKey,
        model: Option<&str>,
    ) -> Result<Self> {
        let client = create_client(settings, key)?;
        Ok(Self::new(client, model.unwrap_or(&settings.model)))
    }
}

fn to_openai(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| RecapError::UpstreamUnavailable(e.to_string()))?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| RecapError::UpstreamUnavailable(e.to_string()))?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| RecapError::UpstreamUnavailable(e.to_string()))?
            .into(),
    };
    Ok(built)
}

#[async_trait]
impl CompletionService for OpenAICompletion {
    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let messages = request
            .messages
            .iter()
            .map(to_openai)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if let Some(temperature) = request.temperature {
            builder.temperature(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder.max_completion_tokens(max_tokens);
        }

        let openai_request = builder
            .build()
            .map_err(|e| RecapError::UpstreamUnavailable(e.to_string()))?;

        let response = self.client.chat().create(openai_request).await.map_err(|e| {
            RecapError::UpstreamUnavailable(format!("Completion request failed: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| {
                RecapError::UpstreamUnavailable("Empty response from completion service".to_string())
            })?
            .clone();

        debug!("Received {} characters", content.len());
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
