//! Summarize command implementation.

use crate::cli::Output;
use crate::config::{language_name, Settings};
use crate::openai::ApiKey;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(
    url: &str,
    language: Option<&str>,
    model: Option<&str>,
    key: &ApiKey,
    settings: &Settings,
) -> Result<()> {
    let orchestrator = Orchestrator::new(settings, key, model)?;
    let mut session = orchestrator.open(url)?;

    let spinner = Output::spinner("Generating summary...");

    match orchestrator.summarize(&mut session, language).await {
        Ok(summary) => {
            spinner.finish_and_clear();

            let title = match summary.language.as_deref() {
                Some(code) => format!("Summary ({})", language_name(code).unwrap_or(code)),
                None => "Summary".to_string(),
            };
            Output::header(&title);
            println!("\n{}\n", summary.text);
            Output::kv("Model", &summary.model);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate summary: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
