//! CLI module for Recap.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_duration, Output};

use clap::{Parser, Subcommand};

/// Recap - YouTube transcripts, summaries and chat
///
/// Fetches a video's transcript, summarizes it and answers questions about it
/// using an OpenAI-compatible language model.
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "RECAP_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a video's transcript
    Transcript {
        /// YouTube URL or video ID
        url: String,

        /// Transcript language code (e.g. en, hi, ja)
        #[arg(short, long)]
        language: Option<String>,

        /// Output format (text, json, srt, vtt)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Summarize a video
    Summarize {
        /// YouTube URL or video ID
        url: String,

        /// Language to write the summary in
        #[arg(short, long)]
        language: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question about a video
    Ask {
        /// YouTube URL or video ID
        url: String,

        /// The question to ask
        question: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive chat about a video
    Chat {
        /// YouTube URL or video ID
        url: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
