//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::openai::ApiKey;
use console::style;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    /// Downgrade an error to a warning for optional requirements.
    fn optional(mut self) -> Self {
        if self.status == CheckStatus::Error {
            self.status = CheckStatus::Warning;
        }
        self
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
///
/// `config_path` is the file given with `--config`, if any.
pub fn run_doctor(settings: &Settings, config_path: Option<&PathBuf>) -> anyhow::Result<()> {
    Output::header("Recap Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let ytdlp = check_tool("yt-dlp", "--version", install_hint_ytdlp());
    let ffmpeg = check_tool("ffmpeg", "-version", install_hint_ffmpeg());
    let ffmpeg = if settings.transcript.speech_fallback {
        ffmpeg
    } else {
        ffmpeg.optional()
    };
    for check in [ytdlp, ffmpeg] {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("API Configuration").bold());
    let api_checks = [
        check_api_key(&settings.completion.api_key_env),
        CheckResult::ok("Endpoint", &settings.completion.api_base),
        CheckResult::ok("Model", &settings.completion.model),
    ];
    for check in api_checks {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Directories").bold());
    let dir_check = check_temp_dir(settings);
    dir_check.print();
    checks.push(dir_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = match config_path {
        Some(path) => check_config_file(path),
        None => check_config_file(&Settings::default_config_path()),
    };
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Recap.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Recap is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_arg: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            // Truncate long version strings
            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check that the completion API key is set.
fn check_api_key(var: &str) -> CheckResult {
    let hint = format!("Set with: export {}='...' (or add it to .env)", var);
    match ApiKey::from_env(var) {
        Ok(key) => CheckResult::ok(var, &format!("configured ({})", key.masked())),
        Err(_) => CheckResult::error(var, "not set", &hint),
    }
}

/// Check the temporary directory used for audio downloads.
fn check_temp_dir(settings: &Settings) -> CheckResult {
    let temp_dir = settings.temp_dir();
    if temp_dir.exists() {
        CheckResult::ok("Temp directory", &format!("{}", temp_dir.display()))
    } else {
        CheckResult::warning(
            "Temp directory",
            &format!("{} (will be created)", temp_dir.display()),
            "Directory will be created on first use",
        )
    }
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: recap config edit",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg (needed for speech fallback)"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (needed for speech fallback)"
    } else {
        "Install from: https://ffmpeg.org/download.html (needed for speech fallback)"
    }
}
