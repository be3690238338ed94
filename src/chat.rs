//! Conversational follow-up about a video.

use crate::completion::{CompletionRequest, CompletionService, Message};
use crate::config::Prompts;
use crate::error::{RecapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Who said a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    fn to_message(&self) -> Message {
        match self.role {
            Role::User => Message::user(self.content.clone()),
            Role::Assistant => Message::assistant(self.content.clone()),
        }
    }
}

/// Answers questions about a transcript.
pub struct Responder {
    completion: Arc<dyn CompletionService>,
    prompts: Prompts,
}

impl Responder {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            completion,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Produce the assistant's reply to `question`.
    ///
    /// The request carries the system prompt, every prior turn in order, and a
    /// final user message combining the transcript with the new question. The
    /// history itself is not modified.
    #[instrument(skip(self, transcript, history), fields(turns = history.len()))]
    pub async fn respond(
        &self,
        transcript: &str,
        history: &[ChatTurn],
        question: &str,
    ) -> Result<ChatTurn> {
        if transcript.trim().is_empty() {
            return Err(RecapError::EmptyInput("transcript is empty".to_string()));
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(RecapError::EmptyInput("question is empty".to_string()));
        }

        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), transcript.to_string());
        vars.insert("question".to_string(), question.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.chat.user, &vars);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.prompts.chat.system.clone()));
        messages.extend(history.iter().map(ChatTurn::to_message));
        messages.push(Message::user(prompt));

        debug!("Sending {} messages", messages.len());
        let reply = self.completion.complete(CompletionRequest::new(messages)).await?;

        Ok(ChatTurn::assistant(reply))
    }
}
