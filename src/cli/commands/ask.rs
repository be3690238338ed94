//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::openai::ApiKey;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command: one question, no follow-up.
pub async fn run_ask(
    url: &str,
    question: &str,
    model: Option<&str>,
    key: &ApiKey,
    settings: &Settings,
) -> Result<()> {
    let orchestrator = Orchestrator::new(settings, key, model)?;
    let mut session = orchestrator.open(url)?;

    let spinner = Output::spinner("Thinking...");

    match orchestrator.ask(&mut session, question).await {
        Ok(reply) => {
            spinner.finish_and_clear();
            println!("\n{}\n", reply.content);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
