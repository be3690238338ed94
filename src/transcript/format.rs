//! Transcript output formatting (plain text, JSON, SRT, VTT).

use super::{Transcript, TranscriptOrigin};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use text, json, srt, or vtt.", s)),
        }
    }
}

/// JSON-serializable transcript for export.
#[derive(Debug, Serialize)]
pub struct TranscriptExport {
    pub video_id: String,
    pub language: String,
    pub original_language: String,
    pub origin: TranscriptOrigin,
    pub duration_seconds: f64,
    pub text: String,
    pub segments: Vec<SegmentExport>,
}

#[derive(Debug, Serialize)]
pub struct SegmentExport {
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl From<&Transcript> for TranscriptExport {
    fn from(transcript: &Transcript) -> Self {
        Self {
            video_id: transcript.video_id.clone(),
            language: transcript.language.clone(),
            original_language: transcript.original_language.clone(),
            origin: transcript.origin,
            duration_seconds: transcript.duration_seconds(),
            text: transcript.text(),
            segments: transcript
                .segments
                .iter()
                .map(|s| SegmentExport {
                    text: s.text.clone(),
                    start_seconds: s.start_seconds,
                    end_seconds: s.end_seconds,
                })
                .collect(),
        }
    }
}

/// Format a transcript for output.
pub fn format_transcript(transcript: &Transcript, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => transcript.text(),
        OutputFormat::Json => format_json(transcript),
        OutputFormat::Srt => format_srt(transcript),
        OutputFormat::Vtt => format_vtt(transcript),
    }
}

fn format_json(transcript: &Transcript) -> String {
    let export = TranscriptExport::from(transcript);
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// Format as SRT (SubRip).
fn format_srt(transcript: &Transcript) -> String {
    let mut output = String::new();

    for (i, segment) in transcript.segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(segment.start_seconds, ','),
            format_timestamp(segment.end_seconds, ',')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

fn format_vtt(transcript: &Transcript) -> String {
    let mut output = format!("WEBVTT\nLanguage: {}\n\n", transcript.language);

    for segment in &transcript.segments {
        output.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(segment.start_seconds, '.'),
            format_timestamp(segment.end_seconds, '.')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// `00:00:00,000` for SRT, `00:00:00.000` for VTT.
fn format_timestamp(seconds: f64, separator: char) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, ms)
}
