//! Transcript retrieval for Recap.
//!
//! Caption tracks are listed with yt-dlp, one track is selected for the
//! requested language (translating when needed), downloaded as WebVTT and
//! flattened into segments. Videos without captions can optionally fall back to
//! speech-to-text.

mod captions;
mod format;
mod speech;
mod vtt;
mod youtube;

pub use captions::{select_track, CaptionCatalog, CaptionKind, CaptionTrack, TrackSelection};
pub use format::{format_transcript, OutputFormat, SegmentExport, TranscriptExport};
pub use speech::SpeechTranscriber;
pub use vtt::parse_vtt;
pub use youtube::YoutubeTranscriptFetcher;

use crate::error::Result;
use crate::video::VideoReference;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where a transcript's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptOrigin {
    /// Captions uploaded by the creator.
    Manual,
    /// YouTube's automatic captions.
    Generated,
    /// A caption track machine-translated by YouTube.
    Translated,
    /// Speech-to-text on the downloaded audio.
    Speech,
}

impl std::fmt::Display for TranscriptOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptOrigin::Manual => write!(f, "manual"),
            TranscriptOrigin::Generated => write!(f, "generated"),
            TranscriptOrigin::Translated => write!(f, "translated"),
            TranscriptOrigin::Speech => write!(f, "speech"),
        }
    }
}

/// A single timed piece of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl TranscriptSegment {
    pub fn new(start_seconds: f64, end_seconds: f64, text: String) -> Self {
        Self {
            text,
            start_seconds,
            end_seconds,
        }
    }
}

/// A video transcript in one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Language of the text.
    pub language: String,
    /// Language of the source track (or detected by speech-to-text).
    pub original_language: String,
    pub origin: TranscriptOrigin,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(
        video_id: impl Into<String>,
        language: impl Into<String>,
        original_language: impl Into<String>,
        origin: TranscriptOrigin,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            language: language.into(),
            original_language: original_language.into(),
            origin,
            segments,
        }
    }

    /// Full text, segments joined by single spaces.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True when no segment carries any text.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }

    /// End of the last segment, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end_seconds).unwrap_or(0.0)
    }

    /// Whether the text is a translation of another language.
    pub fn is_translated(&self) -> bool {
        self.origin == TranscriptOrigin::Translated
    }
}

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch the transcript of `video` in `language`.
    ///
    /// Fails with `TranscriptUnavailable` rather than returning empty text.
    async fn fetch(&self, video: &VideoReference, language: &str) -> Result<Transcript>;
}
