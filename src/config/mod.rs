//! Configuration module for Recap.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ChatPrompts, Prompts, SummaryPrompts};
pub use settings::{
    language_name, CompletionSettings, GeneralSettings, PromptSettings, ServerSettings, Settings,
    TranscriptSettings, SUPPORTED_LANGUAGES,
};
