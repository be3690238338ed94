//! Transcript command implementation.

use crate::cli::{format_duration, Output};
use crate::config::{language_name, Settings};
use crate::openai::ApiKey;
use crate::orchestrator::Orchestrator;
use crate::transcript::{format_transcript, OutputFormat};
use anyhow::Result;

/// Run the transcript command.
///
/// Structured formats are written to stdout without decoration so they can be
/// piped.
pub async fn run_transcript(
    url: &str,
    language: Option<&str>,
    format: &str,
    key: &ApiKey,
    settings: &Settings,
) -> Result<()> {
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let orchestrator = Orchestrator::new(settings, key, None)?;
    let mut session = orchestrator.open(url)?;

    let spinner = Output::spinner("Fetching transcript...");
    let transcript = match orchestrator.transcript(&mut session, language).await {
        Ok(transcript) => {
            spinner.finish_and_clear();
            transcript
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to fetch transcript: {}", e));
            return Err(e.into());
        }
    };

    if format == OutputFormat::Text {
        Output::header(&format!("Transcript of {}", transcript.video_id));
        Output::kv(
            "Language",
            language_name(&transcript.language).unwrap_or(transcript.language.as_str()),
        );
        if transcript.is_translated() {
            Output::kv("Translated from", &transcript.original_language);
        }
        Output::kv("Source", &transcript.origin.to_string());
        Output::kv("Duration", &format_duration(transcript.duration_seconds()));
        println!();
    }

    println!("{}", format_transcript(transcript, format));

    Ok(())
}
