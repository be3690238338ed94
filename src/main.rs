//! Recap CLI entry point.

use anyhow::Result;
use clap::Parser;
use recap::cli::{commands, preflight, Cli, Commands};
use recap::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A .env file is optional
    dotenvy::dotenv().ok();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("recap={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings, config_path.as_ref())?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }

        command => {
            // Fail before any output when the credential or yt-dlp is missing
            let key = preflight::check(&settings)?;
            std::fs::create_dir_all(settings.temp_dir())?;

            match command {
                Commands::Transcript { url, language, format } => {
                    commands::run_transcript(url, language.as_deref(), format, &key, &settings)
                        .await?;
                }
                Commands::Summarize { url, language, model } => {
                    commands::run_summarize(url, language.as_deref(), model.as_deref(), &key, &settings)
                        .await?;
                }
                Commands::Ask { url, question, model } => {
                    commands::run_ask(url, question, model.as_deref(), &key, &settings).await?;
                }
                Commands::Chat { url, model } => {
                    commands::run_chat(url, model.as_deref(), &key, &settings).await?;
                }
                Commands::Serve { host, port } => {
                    commands::run_serve(host.clone(), *port, &key, &settings).await?;
                }
                Commands::Doctor | Commands::Config { .. } => {}
            }
        }
    }

    Ok(())
}
