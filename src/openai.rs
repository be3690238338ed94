//! OpenAI-compatible client configuration.
//!
//! The completion provider is reached through `async-openai` pointed at a
//! configurable base URL, so Groq, OpenAI or a local gateway all work.

use crate::config::CompletionSettings;
use crate::error::{RecapError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// API credential for the completion provider.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Read the credential from the named environment variable.
    ///
    /// An unset or blank variable is a `MissingCredential` error.
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            _ => Err(RecapError::MissingCredential(var.to_string())),
        }
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form for diagnostics.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() > 12 {
            let head: String = chars[..6].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            "****".to_string()
        }
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey({})", self.masked())
    }
}

/// Create a client for the configured provider.
pub fn create_client(
    settings: &CompletionSettings,
    key: &ApiKey,
) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(settings, key, Duration::from_secs(settings.timeout_seconds))
}

/// Create a client with a custom timeout.
pub fn create_client_with_timeout(
    settings: &CompletionSettings,
    key: &ApiKey,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.api_base.trim_end_matches('/'))
        .with_api_key(key.expose());

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential() {
        let err = ApiKey::from_env("RECAP_TEST_KEY_THAT_IS_NEVER_SET").unwrap_err();
        assert!(matches!(err, RecapError::MissingCredential(ref v) if v == "RECAP_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_masked_key_hides_secret() {
        let key = ApiKey::new("gsk_abcdefghijklmnop1234");
        assert_eq!(key.masked(), "gsk_ab...1234");
        assert!(!format!("{:?}", key).contains("cdefghijklmnop"));
        assert_eq!(ApiKey::new("short").masked(), "****");
    }

    #[test]
    fn test_masked_key_with_multibyte_chars() {
        let key = ApiKey::new("ключ_абвгдежзийклм");
        assert_eq!(key.masked(), "ключ_а...йклм");
        assert_eq!(ApiKey::new("ключ_абвгдеж").masked(), "****");
    }

    #[test]
    fn test_create_client() {
        let settings = CompletionSettings::default();
        assert!(create_client(&settings, &ApiKey::new("gsk_test")).is_ok());
    }
}
