//! Error types for Recap.

use thiserror::Error;

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Invalid YouTube reference: {0}")]
    InvalidReference(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Nothing to process: {0}")]
    EmptyInput(String),

    #[error("Upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Missing credential: {0} is not set. Export it or add it to a .env file.")]
    MissingCredential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

impl RecapError {
    /// Stable machine-readable label, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RecapError::InvalidReference(_) => "invalid_reference",
            RecapError::TranscriptUnavailable(_) => "transcript_unavailable",
            RecapError::EmptyInput(_) => "empty_input",
            RecapError::UpstreamUnavailable(_) => "upstream_unavailable",
            RecapError::MissingCredential(_) => "missing_credential",
            RecapError::Config(_) | RecapError::TomlParse(_) => "config",
            RecapError::Io(_) => "io",
            RecapError::Json(_) => "json",
            RecapError::Http(_) => "http",
            RecapError::ToolNotFound(_) => "tool_not_found",
            RecapError::ToolFailed(_) => "tool_failed",
        }
    }
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;
