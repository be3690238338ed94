//! Request orchestration for Recap.
//!
//! Sequences transcript retrieval, summarization and chat for a `Session`.
//! Each handler makes at most one upstream call and a failure only affects the
//! request that triggered it.

use crate::chat::{ChatTurn, Responder};
use crate::completion::{CompletionService, OpenAICompletion};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::openai::{create_client, ApiKey};
use crate::session::Session;
use crate::summarizer::{Summarizer, SummaryResult};
use crate::transcript::{SpeechTranscriber, Transcript, TranscriptFetcher, YoutubeTranscriptFetcher};
use crate::video::VideoReference;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Typed handlers for the transcript, summary and chat views.
pub struct Orchestrator {
    fetcher: Arc<dyn TranscriptFetcher>,
    summarizer: Summarizer,
    responder: Responder,
    default_language: String,
}

impl Orchestrator {
    /// Create an orchestrator talking to the configured providers.
    pub fn new(settings: &Settings, key: &ApiKey, model: Option<&str>) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let client = create_client(&settings.completion, key)?;
        let model = model.unwrap_or(&settings.completion.model);
        info!("Using {} at {}", model, settings.completion.api_base);

        let completion: Arc<dyn CompletionService> =
            Arc::new(OpenAICompletion::new(client.clone(), model));

        let mut fetcher = YoutubeTranscriptFetcher::new(&settings.transcript)?;
        if settings.transcript.speech_fallback {
            info!("Speech-to-text fallback enabled ({})", settings.transcript.speech_model);
            fetcher = fetcher.with_speech_fallback(SpeechTranscriber::new(
                client,
                &settings.transcript.speech_model,
                settings.temp_dir(),
            ));
        }

        let summarizer = Summarizer::new(completion.clone())
            .with_prompts(prompts.clone())
            .with_sampling(settings.completion.temperature, settings.completion.max_tokens);

        Ok(Self {
            fetcher: Arc::new(fetcher),
            summarizer,
            responder: Responder::new(completion).with_prompts(prompts),
            default_language: settings.transcript.default_language.clone(),
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        fetcher: Arc<dyn TranscriptFetcher>,
        completion: Arc<dyn CompletionService>,
        prompts: Prompts,
        default_language: &str,
    ) -> Self {
        Self {
            fetcher,
            summarizer: Summarizer::new(completion.clone()).with_prompts(prompts.clone()),
            responder: Responder::new(completion).with_prompts(prompts),
            default_language: default_language.to_string(),
        }
    }

    /// Start a session for the video at `url`.
    pub fn open(&self, url: &str) -> Result<Session> {
        Ok(Session::new(VideoReference::parse(url)?))
    }

    /// Transcript in `language` (default language when `None`).
    ///
    /// Fetched once per session and language.
    #[instrument(skip(self, session), fields(video = %session.video))]
    pub async fn transcript<'s>(
        &self,
        session: &'s mut Session,
        language: Option<&str>,
    ) -> Result<&'s Transcript> {
        let language = language.unwrap_or(&self.default_language).to_string();

        if !session.transcripts.contains_key(&language) {
            let transcript = self.fetcher.fetch(&session.video, &language).await?;
            info!(
                "Fetched {} transcript ({} segments, original language {})",
                transcript.origin,
                transcript.segments.len(),
                transcript.original_language
            );
            session.transcripts.insert(language.clone(), transcript);
        }

        Ok(&session.transcripts[&language])
    }

    /// Summarize the video, optionally writing the summary in `language`.
    #[instrument(skip(self, session), fields(video = %session.video))]
    pub async fn summarize<'s>(
        &self,
        session: &'s mut Session,
        language: Option<&str>,
    ) -> Result<&'s SummaryResult> {
        let text = self.transcript(session, None).await?.text();
        let summary = self.summarizer.summarize(&text, language).await?;
        Ok(session.summary.insert(summary))
    }

    /// Ask a question about the video.
    ///
    /// On success the question and the reply are appended to the history, in
    /// that order. On failure the history is left as it was.
    #[instrument(skip(self, session), fields(video = %session.video))]
    pub async fn ask<'s>(&self, session: &'s mut Session, question: &str) -> Result<&'s ChatTurn> {
        let text = self.transcript(session, None).await?.text();
        let question = question.trim();

        let reply = self
            .responder
            .respond(&text, &session.history, question)
            .await?;

        session.history.push(ChatTurn::user(question));
        session.history.push(reply);
        let last = session.history.len() - 1;
        Ok(&session.history[last])
    }

    /// Forget the conversation. Transcripts and the summary are kept.
    pub fn clear_history(&self, session: &mut Session) {
        debug!("Clearing {} chat turns", session.history.len());
        session.clear_history();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::chat::Role;
    use crate::completion::mock::MockCompletion;
    use crate::error::RecapError;
    use crate::transcript::{TranscriptOrigin, TranscriptSegment};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed transcript in the languages it knows.
    pub(crate) struct MockFetcher {
        languages: Vec<&'static str>,
        pub calls: AtomicUsize,
    }

    impl MockFetcher {
        pub(crate) fn with_languages(languages: &[&'static str]) -> Self {
            Self {
                languages: languages.to_vec(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TranscriptFetcher for MockFetcher {
        async fn fetch(&self, video: &VideoReference, language: &str) -> Result<Transcript> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.languages.contains(&language) {
                return Err(RecapError::TranscriptUnavailable(format!(
                    "no '{}' transcript",
                    language
                )));
            }
            Ok(Transcript::new(
                video.id(),
                language,
                language,
                TranscriptOrigin::Manual,
                vec![
                    TranscriptSegment::new(0.0, 2.0, "We're no strangers".to_string()),
                    TranscriptSegment::new(2.0, 4.0, "to love".to_string()),
                ],
            ))
        }
    }

    fn orchestrator(fetcher: Arc<MockFetcher>, completion: Arc<MockCompletion>) -> Orchestrator {
        Orchestrator::with_components(fetcher, completion, Prompts::default(), "en")
    }

    #[test]
    fn test_open_rejects_invalid_url() {
        let orch = orchestrator(
            Arc::new(MockFetcher::with_languages(&["en"])),
            Arc::new(MockCompletion::replying("")),
        );

        let err = orch.open("https://example.com/video").unwrap_err();
        assert!(matches!(err, RecapError::InvalidReference(_)));

        let session = orch.open("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(session.video().id(), "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_transcript_fetched_once_per_language() {
        let fetcher = Arc::new(MockFetcher::with_languages(&["en", "de"]));
        let orch = orchestrator(fetcher.clone(), Arc::new(MockCompletion::replying("")));
        let mut session = orch.open("dQw4w9WgXcQ").unwrap();

        let text = orch.transcript(&mut session, None).await.unwrap().text();
        assert_eq!(text, "We're no strangers to love");
        orch.transcript(&mut session, Some("en")).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let german = orch.transcript(&mut session, Some("de")).await.unwrap();
        assert_eq!(german.language, "de");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert!(session.transcript("de").is_some());
    }

    #[tokio::test]
    async fn test_unavailable_language_leaves_session_usable() {
        let orch = orchestrator(
            Arc::new(MockFetcher::with_languages(&["en"])),
            Arc::new(MockCompletion::replying("Summary")),
        );
        let mut session = orch.open("dQw4w9WgXcQ").unwrap();

        let err = orch.transcript(&mut session, Some("ja")).await.unwrap_err();
        assert!(matches!(err, RecapError::TranscriptUnavailable(_)));
        assert!(session.transcript("ja").is_none());

        let summary = orch.summarize(&mut session, None).await.unwrap();
        assert_eq!(summary.text, "Summary");
        assert!(session.summary().is_some());
    }

    #[tokio::test]
    async fn test_summary_uses_default_language_transcript() {
        let fetcher = Arc::new(MockFetcher::with_languages(&["en"]));
        let completion = Arc::new(MockCompletion::replying("Résumé"));
        let orch = orchestrator(fetcher, completion.clone());
        let mut session = orch.open("dQw4w9WgXcQ").unwrap();

        let summary = orch.summarize(&mut session, Some("fr")).await.unwrap();
        assert_eq!(summary.language.as_deref(), Some("fr"));

        let request = completion.last_request();
        assert!(request.messages[1].content.contains("We're no strangers to love"));
        assert!(request.messages[1].content.contains("French"));
    }

    #[tokio::test]
    async fn test_ask_appends_reply_after_question() {
        let completion = Arc::new(MockCompletion::replying("A love song."));
        let orch = orchestrator(Arc::new(MockFetcher::with_languages(&["en"])), completion.clone());
        let mut session = orch.open("dQw4w9WgXcQ").unwrap();

        let reply = orch.ask(&mut session, " What is it? ").await.unwrap();
        assert_eq!(reply, &ChatTurn::assistant("A love song."));

        orch.ask(&mut session, "Anything else?").await.unwrap();

        let roles: Vec<Role> = session.history().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(session.history()[0].content, "What is it?");
        assert_eq!(session.history()[2].content, "Anything else?");

        // The second request carried the first exchange.
        let request = completion.last_request();
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[1].content, "What is it?");
        assert_eq!(request.messages[2].content, "A love song.");
    }

    #[tokio::test]
    async fn test_failed_ask_keeps_history() {
        let orch = orchestrator(
            Arc::new(MockFetcher::with_languages(&["en"])),
            Arc::new(MockCompletion::failing("rate limited")),
        );
        let mut session = orch
            .open("dQw4w9WgXcQ")
            .unwrap()
            .with_history(vec![ChatTurn::user("q"), ChatTurn::assistant("a")]);

        let err = orch.ask(&mut session, "another").await.unwrap_err();
        assert!(matches!(err, RecapError::UpstreamUnavailable(_)));
        assert_eq!(session.history().len(), 2);

        let err = orch.ask(&mut session, "   ").await.unwrap_err();
        assert!(matches!(err, RecapError::EmptyInput(_)));
        assert_eq!(session.history().len(), 2);

        orch.clear_history(&mut session);
        assert!(session.history().is_empty());
        assert!(session.transcript("en").is_some());
    }

    #[tokio::test]
    async fn test_ask_without_transcript_fails_cleanly() {
        let orch = orchestrator(
            Arc::new(MockFetcher::with_languages(&[])),
            Arc::new(MockCompletion::replying("unused")),
        );
        let mut session = orch.open("dQw4w9WgXcQ").unwrap();

        let err = orch.ask(&mut session, "hello?").await.unwrap_err();
        assert!(matches!(err, RecapError::TranscriptUnavailable(_)));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_new_from_settings() {
        let settings = Settings::default();
        let orch = Orchestrator::new(&settings, &ApiKey::new("gsk_test"), None).unwrap();
        assert_eq!(orch.default_language, "en");
    }
}
