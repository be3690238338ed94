//! YouTube caption fetcher.

use super::captions::{select_track, unavailable, CaptionCatalog, TrackSelection};
use super::{parse_vtt, SpeechTranscriber, Transcript, TranscriptFetcher};
use crate::config::TranscriptSettings;
use crate::error::{RecapError, Result};
use crate::video::VideoReference;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};
use url::Url;

const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Fetches transcripts from YouTube caption tracks.
pub struct YoutubeTranscriptFetcher {
    http: reqwest::Client,
    preferred_languages: Vec<String>,
    translate: bool,
    speech: Option<SpeechTranscriber>,
}

impl YoutubeTranscriptFetcher {
    pub fn new(settings: &TranscriptSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            preferred_languages: settings.preferred_languages.clone(),
            translate: settings.translate,
            speech: None,
        })
    }

    /// Transcribe the audio of videos that have no captions at all.
    pub fn with_speech_fallback(mut self, speech: SpeechTranscriber) -> Self {
        self.speech = Some(speech);
        self
    }

    /// List caption tracks with yt-dlp.
    async fn list_captions(&self, video: &VideoReference) -> Result<CaptionCatalog> {
        let output = Command::new("yt-dlp")
            .args([
                "--dump-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                &video.watch_url(),
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecapError::ToolNotFound("yt-dlp".to_string())
                } else {
                    RecapError::ToolFailed(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_ytdlp_failure(video, &stderr));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        CaptionCatalog::from_ytdlp_json(&json).map_err(|e| {
            RecapError::UpstreamUnavailable(format!("Unexpected yt-dlp output: {}", e))
        })
    }

    async fn download_track(&self, url: &Url) -> Result<String> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RecapError::UpstreamUnavailable(format!("Caption download failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RecapError::TranscriptUnavailable(
                "caption track no longer exists".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(RecapError::UpstreamUnavailable(format!(
                "Caption download returned {}",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| RecapError::UpstreamUnavailable(format!("Caption download failed: {}", e)))
    }
}

/// Map a failed yt-dlp run to an error the user can act on.
fn classify_ytdlp_failure(video: &VideoReference, stderr: &str) -> RecapError {
    let lowered = stderr.to_lowercase();
    if lowered.contains("video unavailable")
        || lowered.contains("private video")
        || lowered.contains("removed")
    {
        RecapError::TranscriptUnavailable(format!("video {} is unavailable", video))
    } else {
        RecapError::UpstreamUnavailable(format!("yt-dlp failed: {}", stderr.trim()))
    }
}

#[async_trait]
impl TranscriptFetcher for YoutubeTranscriptFetcher {
    #[instrument(skip(self), fields(video = %video))]
    async fn fetch(&self, video: &VideoReference, language: &str) -> Result<Transcript> {
        let catalog = self.list_captions(video).await?;
        debug!("Found caption tracks: {:?}", catalog.languages());

        let Some(selection) =
            select_track(&catalog, language, &self.preferred_languages, self.translate)
        else {
            if catalog.is_empty() {
                if let Some(speech) = &self.speech {
                    warn!("No captions for {}, falling back to speech-to-text", video);
                    return speech.transcribe(video, language).await;
                }
            }
            return Err(unavailable(video.id(), language, &catalog));
        };

        info!(
            "Using {:?} '{}' track{}",
            selection.track.kind,
            selection.track.language,
            selection
                .translate_to
                .as_deref()
                .map(|l| format!(" translated to '{}'", l))
                .unwrap_or_default()
        );

        let body = self.download_track(&selection.download_url()).await?;
        let transcript = transcript_from_vtt(video, &selection, &body)?;

        debug!("Fetched {} segments", transcript.segments.len());
        Ok(transcript)
    }
}

/// Build the transcript for a downloaded track. A track without text is
/// `TranscriptUnavailable`.
fn transcript_from_vtt(
    video: &VideoReference,
    selection: &TrackSelection,
    body: &str,
) -> Result<Transcript> {
    let transcript = Transcript::new(
        video.id(),
        selection.language(),
        selection.track.language.clone(),
        selection.origin(),
        parse_vtt(body),
    );

    if transcript.is_empty() {
        return Err(RecapError::TranscriptUnavailable(format!(
            "'{}' transcript for video {} is empty",
            selection.language(),
            video
        )));
    }

    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{CaptionKind, CaptionTrack};

    fn video() -> VideoReference {
        VideoReference::parse("dQw4w9WgXcQ").unwrap()
    }

    #[test]
    fn test_unavailable_video_is_classified() {
        let err = classify_ytdlp_failure(
            &video(),
            "ERROR: [youtube] dQw4w9WgXcQ: Video unavailable. This video has been removed",
        );
        assert!(matches!(err, RecapError::TranscriptUnavailable(_)));
    }

    #[test]
    fn test_other_failures_are_upstream() {
        let err = classify_ytdlp_failure(&video(), "ERROR: unable to download webpage: HTTP 429");
        assert!(matches!(err, RecapError::UpstreamUnavailable(_)));
    }

    fn selection(translate_to: Option<&str>) -> TrackSelection {
        TrackSelection {
            track: CaptionTrack {
                language: "en".to_string(),
                kind: CaptionKind::Manual,
                url: Url::parse("https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en&fmt=vtt").unwrap(),
            },
            translate_to: translate_to.map(str::to_string),
        }
    }

    #[test]
    fn test_blank_track_is_unavailable() {
        for body in [
            "WEBVTT\n\n00:00.000 --> 00:01.000\n \n",
            "WEBVTT\n\n",
            "",
        ] {
            let err = transcript_from_vtt(&video(), &selection(None), body).unwrap_err();
            assert!(matches!(err, RecapError::TranscriptUnavailable(_)), "body {:?}", body);
        }
    }

    #[test]
    fn test_translated_track_transcript() {
        let body = "WEBVTT\n\n00:00.000 --> 00:02.000\nNunca te abandonaré\n";
        let transcript = transcript_from_vtt(&video(), &selection(Some("es")), body).unwrap();

        assert_eq!(transcript.video_id, "dQw4w9WgXcQ");
        assert_eq!(transcript.language, "es");
        assert_eq!(transcript.original_language, "en");
        assert!(transcript.is_translated());
        assert_eq!(transcript.text(), "Nunca te abandonaré");
    }

    #[test]
    fn test_fetcher_takes_settings() {
        let mut settings = TranscriptSettings::default();
        settings.translate = false;
        settings.preferred_languages = vec!["de".to_string()];

        let fetcher = YoutubeTranscriptFetcher::new(&settings).unwrap();
        assert!(!fetcher.translate);
        assert_eq!(fetcher.preferred_languages, vec!["de"]);
        assert!(fetcher.speech.is_none());
    }
}
