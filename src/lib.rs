//! Recap - YouTube transcripts, summaries and chat
//!
//! Fetches the transcript of a YouTube video, summarizes it with an
//! OpenAI-compatible language model, and answers follow-up questions about it.
//!
//! # Overview
//!
//! Recap allows you to:
//! - Fetch a video's transcript in a chosen language (translated when needed)
//! - Summarize the transcript, optionally in another language
//! - Ask questions about the video in a running conversation
//! - Expose the same operations over a small HTTP API
//!
//! # Architecture
//!
//! - `video` - Video reference parsing
//! - `transcript` - Caption discovery, download and parsing
//! - `completion` - Chat completion service abstraction
//! - `summarizer` - Transcript summarization
//! - `chat` - Conversational follow-up
//! - `session` - Per-video working state
//! - `orchestrator` - Request handlers tying the pieces together
//! - `config` - Settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::Settings;
//! use recap::openai::ApiKey;
//! use recap::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let key = ApiKey::from_env(&settings.completion.api_key_env)?;
//!     let orchestrator = Orchestrator::new(&settings, &key, None)?;
//!
//!     let mut session = orchestrator.open("https://youtu.be/dQw4w9WgXcQ")?;
//!     let summary = orchestrator.summarize(&mut session, None).await?;
//!     println!("{}", summary.text);
//!
//!     let reply = orchestrator.ask(&mut session, "Who is the singer?").await?;
//!     println!("{}", reply.content);
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod session;
pub mod summarizer;
pub mod transcript;
pub mod video;

pub use error::{RecapError, Result};
