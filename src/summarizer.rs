//! Transcript summarization.

use crate::completion::{CompletionRequest, CompletionService, Message};
use crate::config::{language_name, Prompts};
use crate::error::{RecapError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// A generated summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    /// The model's response, verbatim.
    pub text: String,
    /// Language the summary was requested in, if any.
    pub language: Option<String>,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

/// Produces summaries with one completion request per transcript.
///
/// The whole transcript goes into a single prompt; long videos can exceed the
/// model's context window, in which case the provider's error is surfaced.
pub struct Summarizer {
    completion: Arc<dyn CompletionService>,
    prompts: Prompts,
    temperature: f32,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            completion,
            prompts: Prompts::default(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Summarize transcript text, optionally in a target language.
    #[instrument(skip(self, transcript), fields(chars = transcript.len()))]
    pub async fn summarize(&self, transcript: &str, language: Option<&str>) -> Result<SummaryResult> {
        if transcript.trim().is_empty() {
            return Err(RecapError::EmptyInput("transcript is empty".to_string()));
        }

        let request = CompletionRequest::new(vec![
            Message::system(self.prompts.summary.system.clone()),
            Message::user(self.user_prompt(transcript, language)),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        info!("Requesting summary from {}", self.completion.model());
        let text = self.completion.complete(request).await?;

        Ok(SummaryResult {
            text,
            language: language.map(str::to_string),
            model: self.completion.model().to_string(),
            generated_at: Utc::now(),
        })
    }

    fn user_prompt(&self, transcript: &str, language: Option<&str>) -> String {
        let language_instruction = match language {
            Some(code) => {
                let mut vars = HashMap::new();
                vars.insert(
                    "language".to_string(),
                    language_name(code).unwrap_or(code).to_string(),
                );
                Prompts::render(&self.prompts.summary.language_instruction, &vars)
            }
            None => String::new(),
        };

        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), transcript.to_string());
        vars.insert("language_instruction".to_string(), language_instruction);
        self.prompts.render_with_custom(&self.prompts.summary.user, &vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::mock::MockCompletion;
    use crate::completion::MessageRole;

    #[tokio::test]
    async fn test_empty_input_skips_remote_call() {
        let mock = Arc::new(MockCompletion::replying("unused"));
        let summarizer = Summarizer::new(mock.clone());

        for input in ["", "   \n\t"] {
            let err = summarizer.summarize(input, None).await.unwrap_err();
            assert!(matches!(err, RecapError::EmptyInput(_)));
        }
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_summary_returned_verbatim() {
        let mock = Arc::new(MockCompletion::replying("  Summary: rickroll.\nHave a nice day!  "));
        let summarizer = Summarizer::new(mock.clone());

        let summary = summarizer
            .summarize("never gonna give you up", None)
            .await
            .unwrap();

        assert_eq!(summary.text, "  Summary: rickroll.\nHave a nice day!  ");
        assert_eq!(summary.model, "mock-model");
        assert!(summary.language.is_none());
        assert_eq!(mock.calls(), 1);

        let request = mock.last_request();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert!(request.messages[1].content.ends_with("never gonna give you up"));
        assert!(!request.messages[1].content.contains("{{"));
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(2000));
    }

    #[tokio::test]
    async fn test_language_instruction() {
        let mock = Arc::new(MockCompletion::replying("Résumé"));
        let summarizer = Summarizer::new(mock.clone()).with_sampling(0.2, 500);

        let summary = summarizer.summarize("bonjour", Some("fr")).await.unwrap();
        assert_eq!(summary.language.as_deref(), Some("fr"));

        let request = mock.last_request();
        assert!(request.messages[1].content.contains("Write the entire summary in French."));
        assert_eq!(request.max_tokens, Some(500));
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let mock = Arc::new(MockCompletion::failing("503 Service Unavailable"));
        let summarizer = Summarizer::new(mock);

        let err = summarizer.summarize("some text", None).await.unwrap_err();
        assert!(matches!(err, RecapError::UpstreamUnavailable(_)));
    }
}
