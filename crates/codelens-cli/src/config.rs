//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use codelens_analyzer::AnalyzerConfig;
use codelens_domain::{ExplanationMode, AUTO_DETECT_LANGUAGE, SUPPORTED_LANGUAGES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Session settings
    #[serde(default)]
    pub settings: Settings,

    /// Analysis pipeline settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

/// Session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Default language for analysis
    #[serde(default = "default_language")]
    pub language: String,

    /// Default explanation depth
    #[serde(default)]
    pub mode: ExplanationMode,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Number of analyses kept in history
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".codelens").join("config.toml"))
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: AUTO_DETECT_LANGUAGE.to_string(),
            mode: ExplanationMode::Beginner,
            color: true,
            history_size: 5,
        }
    }
}

/// Match a language name against the supported set, case-insensitively.
///
/// Returns the canonical spelling, or `None` for unknown languages.
pub fn resolve_language(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Some(AUTO_DETECT_LANGUAGE);
    }
    std::iter::once(AUTO_DETECT_LANGUAGE)
        .chain(SUPPORTED_LANGUAGES.iter().copied())
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
}

fn default_language() -> String {
    AUTO_DETECT_LANGUAGE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_history_size() -> usize {
    5
}
