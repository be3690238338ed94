//! Configuration settings for Recap.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Languages offered for transcripts, as (code, display name).
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("hi", "Hindi"),
    ("mr", "Marathi"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ru", "Russian"),
];

/// Display name for a language code, if it is one of the supported languages.
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub completion: CompletionSettings,
    pub transcript: TranscriptSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for temporary files (speech fallback audio).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/recap".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Completion service settings.
///
/// Any OpenAI-compatible endpoint works; the default points at Groq.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Model used for summaries and chat.
    pub model: String,
    /// Sampling temperature for summaries.
    pub temperature: f32,
    /// Maximum completion tokens for summaries.
    pub max_tokens: u32,
    /// HTTP timeout for completion requests.
    pub timeout_seconds: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_seconds: 300,
        }
    }
}

/// Transcript retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Language used for summaries and chat, and for `transcript` when no language is given.
    pub default_language: String,
    /// Source languages to look for, in order, when the requested language has no track.
    pub preferred_languages: Vec<String>,
    /// Translate a track in another language into the requested one.
    pub translate: bool,
    /// Transcribe the audio when a video has no captions at all.
    pub speech_fallback: bool,
    /// Speech-to-text model for the fallback.
    pub speech_model: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            preferred_languages: SUPPORTED_LANGUAGES
                .iter()
                .map(|(code, _)| code.to_string())
                .collect(),
            translate: true,
            speech_fallback: false,
            speech_model: "whisper-large-v3".to_string(),
        }
    }
}

/// HTTP API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RecapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recap")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.completion.api_key_env, "GROQ_API_KEY");
        assert_eq!(settings.completion.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.transcript.default_language, "en");
        assert_eq!(settings.transcript.preferred_languages.len(), 9);
        assert!(!settings.transcript.speech_fallback);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [completion]
            model = "llama-3.1-8b-instant"

            [transcript]
            preferred_languages = ["de", "en"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.completion.model, "llama-3.1-8b-instant");
        assert_eq!(settings.completion.max_tokens, 2000);
        assert_eq!(settings.transcript.preferred_languages, vec!["de", "en"]);
        assert!(settings.transcript.translate);
        assert_eq!(settings.server.port, 8501);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 9000;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 9000);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = PathBuf::from("/nonexistent/recap/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.general.temp_dir, "/tmp/recap");
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("mr"), Some("Marathi"));
        assert_eq!(language_name("EN"), Some("English"));
        assert_eq!(language_name("xx"), None);
    }
}
