//! Per-session state.
//!
//! Everything a user accumulates while working on one video lives here and is
//! handed to the orchestrator's handlers explicitly. Nothing is persisted.

use crate::chat::ChatTurn;
use crate::summarizer::SummaryResult;
use crate::transcript::Transcript;
use crate::video::VideoReference;
use std::collections::HashMap;

/// Working state for one video.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) video: VideoReference,
    /// Transcripts fetched so far, keyed by requested language.
    pub(crate) transcripts: HashMap<String, Transcript>,
    pub(crate) summary: Option<SummaryResult>,
    pub(crate) history: Vec<ChatTurn>,
}

impl Session {
    pub fn new(video: VideoReference) -> Self {
        Self {
            video,
            transcripts: HashMap::new(),
            summary: None,
            history: Vec::new(),
        }
    }

    /// Resume a conversation whose history is held by the caller.
    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn video(&self) -> &VideoReference {
        &self.video
    }

    /// Conversation so far, oldest first.
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn summary(&self) -> Option<&SummaryResult> {
        self.summary.as_ref()
    }

    /// A transcript already fetched in this session.
    pub fn transcript(&self, language: &str) -> Option<&Transcript> {
        self.transcripts.get(language)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn into_history(self) -> Vec<ChatTurn> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new(VideoReference::parse("dQw4w9WgXcQ").unwrap());
        assert_eq!(session.video().id(), "dQw4w9WgXcQ");
        assert!(session.history().is_empty());
        assert!(session.summary().is_none());
        assert!(session.transcript("en").is_none());
    }

    #[test]
    fn test_history_roundtrip_and_clear() {
        let history = vec![ChatTurn::user("q"), ChatTurn::assistant("a")];
        let mut session = Session::new(VideoReference::parse("dQw4w9WgXcQ").unwrap())
            .with_history(history.clone());
        assert_eq!(session.history(), history.as_slice());

        session.clear_history();
        assert!(session.history().is_empty());
        assert!(session.into_history().is_empty());
    }
}
