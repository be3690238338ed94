//! Pre-flight checks before any request is made.
//!
//! Validates that the credential and required tools are available before a
//! command starts, so a misconfigured setup fails before any output.

use crate::config::Settings;
use crate::error::{RecapError, Result};
use crate::openai::ApiKey;
use std::process::Command;

/// Run pre-flight checks and return the credential.
pub fn check(settings: &Settings) -> Result<ApiKey> {
    let key = ApiKey::from_env(&settings.completion.api_key_env)?;
    check_tool("yt-dlp")?;
    if settings.transcript.speech_fallback {
        check_tool("ffmpeg")?;
    }
    Ok(key)
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg uses -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(RecapError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RecapError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(RecapError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        let err = check_tool("recap-no-such-tool").unwrap_err();
        assert!(matches!(err, RecapError::ToolNotFound(_)));
    }

    #[test]
    fn test_missing_credential_checked_first() {
        let mut settings = Settings::default();
        settings.completion.api_key_env = "RECAP_TEST_UNSET_KEY".to_string();

        let err = check(&settings).unwrap_err();
        assert!(matches!(err, RecapError::MissingCredential(_)));
    }
}
