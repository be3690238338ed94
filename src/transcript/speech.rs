//! Speech-to-text fallback for videos without captions.

use super::captions::language_matches;
use super::{Transcript, TranscriptOrigin, TranscriptSegment};
use crate::config::SUPPORTED_LANGUAGES;
use crate::error::{RecapError, Result};
use crate::video::VideoReference;
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Downloads a video's audio and transcribes it with a Whisper-compatible endpoint.
pub struct SpeechTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    temp_dir: PathBuf,
}

impl SpeechTranscriber {
    pub fn new(client: Client<OpenAIConfig>, model: &str, temp_dir: PathBuf) -> Self {
        Self {
            client,
            model: model.to_string(),
            temp_dir,
        }
    }

    /// Transcribe the video's audio.
    ///
    /// Speech is transcribed in the language it was spoken in, so a detected
    /// language other than `language` is `TranscriptUnavailable`.
    #[instrument(skip(self), fields(video = %video))]
    pub async fn transcribe(&self, video: &VideoReference, language: &str) -> Result<Transcript> {
        std::fs::create_dir_all(&self.temp_dir)?;
        // Removed on drop, including on error paths.
        let work_dir = tempfile::tempdir_in(&self.temp_dir)?;

        let audio_path = download_audio(video, work_dir.path()).await?;
        let file_bytes = tokio::fs::read(&audio_path).await?;
        info!("Transcribing {} bytes of audio with {}", file_bytes.len(), self.model);

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.m4a")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson)
            .build()
            .map_err(|e| RecapError::UpstreamUnavailable(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| RecapError::UpstreamUnavailable(format!("Speech-to-text failed: {}", e)))?;

        let detected = resolve_detected_language(video, language, &response.language)?;

        let segments: Vec<TranscriptSegment> = match response.segments {
            Some(segments) => segments
                .iter()
                .map(|s| TranscriptSegment::new(s.start as f64, s.end as f64, s.text.trim().to_string()))
                .collect(),
            None => vec![TranscriptSegment::new(
                0.0,
                response.duration as f64,
                response.text.trim().to_string(),
            )],
        };

        let transcript = Transcript::new(
            video.id(),
            detected.clone(),
            detected,
            TranscriptOrigin::Speech,
            segments,
        );

        if transcript.is_empty() {
            return Err(RecapError::TranscriptUnavailable(format!(
                "no speech recognized in video {}",
                video
            )));
        }

        debug!("Transcribed {} segments", transcript.segments.len());
        Ok(transcript)
    }
}

/// Language code for the language a Whisper-compatible endpoint reports.
///
/// Endpoints report either a lowercase English name ("english") or a code.
fn detected_language_code(detected: &str) -> Option<String> {
    let detected = detected.trim();
    if let Some((code, _)) = SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, name)| name.eq_ignore_ascii_case(detected) || code.eq_ignore_ascii_case(detected))
    {
        return Some(code.to_string());
    }

    let is_code = (2..=3).contains(&detected.len())
        || detected.split(['-', '_']).next().map(str::len) == Some(2);
    if is_code && detected.chars().all(|c| c.is_ascii_alphabetic() || c == '-' || c == '_') {
        Some(detected.to_lowercase())
    } else {
        None
    }
}

/// Code of the detected language, if it is the requested one.
fn resolve_detected_language(
    video: &VideoReference,
    requested: &str,
    detected: &str,
) -> Result<String> {
    match detected_language_code(detected) {
        Some(code) if language_matches(&code, requested) => Ok(code),
        _ => Err(RecapError::TranscriptUnavailable(format!(
            "video {} has no captions and its speech is in '{}', not '{}'",
            video, detected, requested
        ))),
    }
}

/// Download the best audio-only stream into `dir`.
async fn download_audio(video: &VideoReference, dir: &Path) -> Result<PathBuf> {
    let template = dir.join(format!("{}.%(ext)s", video.id()));

    let result = Command::new("yt-dlp")
        .arg("--format").arg("bestaudio[ext=m4a]/bestaudio")
        .arg("--output").arg(&template)
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(video.watch_url())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RecapError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => return Err(RecapError::ToolFailed(format!("yt-dlp execution failed: {e}"))),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RecapError::UpstreamUnavailable(format!("Audio download failed: {}", stderr.trim())));
    }

    find_audio_file(dir, video.id())
}

/// Locate the file yt-dlp produced for `video_id`.
fn find_audio_file(dir: &Path, video_id: &str) -> Result<PathBuf> {
    for entry in std::fs::read_dir(dir)?.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(video_id) && !name.ends_with(".part") {
            return Ok(entry.path());
        }
    }

    Err(RecapError::ToolFailed("audio file not found after download".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_language_code() {
        assert_eq!(detected_language_code("english").as_deref(), Some("en"));
        assert_eq!(detected_language_code("Japanese").as_deref(), Some("ja"));
        assert_eq!(detected_language_code("hi").as_deref(), Some("hi"));
        assert_eq!(detected_language_code("pt-BR").as_deref(), Some("pt-br"));
        assert_eq!(detected_language_code("swahili"), None);
        assert_eq!(detected_language_code(""), None);
    }

    #[test]
    fn test_detected_language_must_match_request() {
        let video = VideoReference::parse("dQw4w9WgXcQ").unwrap();

        assert_eq!(resolve_detected_language(&video, "en", "english").unwrap(), "en");
        assert_eq!(resolve_detected_language(&video, "en-US", "english").unwrap(), "en");

        let err = resolve_detected_language(&video, "ja", "english").unwrap_err();
        assert!(matches!(err, RecapError::TranscriptUnavailable(_)));

        let err = resolve_detected_language(&video, "en", "klingon").unwrap_err();
        assert!(matches!(err, RecapError::TranscriptUnavailable(_)));
    }

    #[test]
    fn test_find_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dQw4w9WgXcQ.m4a.part"), b"partial").unwrap();
        assert!(find_audio_file(dir.path(), "dQw4w9WgXcQ").is_err());

        std::fs::write(dir.path().join("dQw4w9WgXcQ.webm"), b"audio").unwrap();
        let found = find_audio_file(dir.path(), "dQw4w9WgXcQ").unwrap();
        assert_eq!(found.file_name().unwrap(), "dQw4w9WgXcQ.webm");
    }
}
