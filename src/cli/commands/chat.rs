//! Interactive chat about a single video.

use crate::cli::Output;
use crate::config::Settings;
use crate::openai::ApiKey;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// One line of user input.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Empty,
    Exit,
    Clear,
    /// Summarize, optionally in a given language.
    Summary(Option<String>),
    Question(String),
}

fn parse_command(input: &str) -> ReplCommand {
    let input = input.trim();
    let mut words = input.split_whitespace();
    let first = words.next().unwrap_or_default();

    if input.is_empty() {
        ReplCommand::Empty
    } else if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
        ReplCommand::Exit
    } else if input.eq_ignore_ascii_case("clear") {
        ReplCommand::Clear
    } else if first.eq_ignore_ascii_case("summary") {
        match (words.next(), words.next()) {
            (None, _) => ReplCommand::Summary(None),
            (Some(lang), None) => ReplCommand::Summary(Some(lang.to_lowercase())),
            _ => ReplCommand::Question(input.to_string()),
        }
    } else {
        ReplCommand::Question(input.to_string())
    }
}

/// Run the interactive chat command.
pub async fn run_chat(
    url: &str,
    model: Option<&str>,
    key: &ApiKey,
    settings: &Settings,
) -> Result<()> {
    let orchestrator = Orchestrator::new(settings, key, model)?;
    let mut session = orchestrator.open(url)?;

    println!("\n{}", style(format!("Recap Chat: {}", session.video().watch_url())).bold().cyan());
    println!(
        "{}\n",
        style("Ask anything about the video. 'summary [lang]' summarizes it, 'clear' resets the conversation, 'exit' quits.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF
            println!();
            break;
        }

        match parse_command(&input) {
            ReplCommand::Empty => continue,

            ReplCommand::Exit => {
                Output::info("Goodbye!");
                break;
            }

            ReplCommand::Clear => {
                orchestrator.clear_history(&mut session);
                Output::info("Conversation history cleared.");
            }

            ReplCommand::Summary(language) => {
                let spinner = Output::spinner("Generating summary...");
                let result = orchestrator.summarize(&mut session, language.as_deref()).await;
                spinner.finish_and_clear();
                match result {
                    Ok(summary) => Output::reply("Summary", &summary.text),
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }

            ReplCommand::Question(question) => {
                let spinner = Output::spinner("Thinking...");
                let result = orchestrator.ask(&mut session, &question).await;
                spinner.finish_and_clear();
                match result {
                    Ok(reply) => Output::reply("Recap", &reply.content),
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Ok(())
}
