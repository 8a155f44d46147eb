//! Configuration for the Analyzer

use codelens_llm::gemini::DEFAULT_MODEL;
use codelens_llm::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Model identifier sent to the provider
    pub model: String,

    /// Retry attempts for extraction, analysis and execution calls
    pub max_retries: u32,

    /// Initial backoff delay for those calls (milliseconds)
    pub initial_delay_ms: u64,

    /// Retry attempts for practice generation
    ///
    /// Practice runs with a wider budget: it is invoked on demand and a
    /// dropped regeneration is more visible than a slow one.
    pub practice_max_retries: u32,

    /// Initial backoff delay for practice generation (milliseconds)
    pub practice_initial_delay_ms: u64,

    /// Extraction confidence below this is flagged for review
    pub low_confidence_threshold: f64,

    /// Maximum characters of explanation and source carried into the
    /// practice context
    pub context_snippet_limit: usize,
}

impl AnalyzerConfig {
    /// Retry schedule for extraction, analysis and execution calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.initial_delay_ms))
    }

    /// Retry schedule for practice generation
    pub fn practice_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.practice_max_retries,
            Duration::from_millis(self.practice_initial_delay_ms),
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be greater than 0".to_string());
        }
        if self.practice_max_retries == 0 {
            return Err("practice_max_retries must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err("low_confidence_threshold must be between 0.0 and 1.0".to_string());
        }
        if self.context_snippet_limit == 0 {
            return Err("context_snippet_limit must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for AnalyzerConfig {
    /// Default configuration mirroring the production retry schedule
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_retries: 3,
            initial_delay_ms: 2000,
            practice_max_retries: 4,
            practice_initial_delay_ms: 2500,
            low_confidence_threshold: codelens_domain::LOW_CONFIDENCE_THRESHOLD,
            context_snippet_limit: 300,
        }
    }
}
