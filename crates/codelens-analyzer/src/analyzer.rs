//! Core Analyzer orchestration

use std::sync::Arc;

use codelens_domain::{
    AnalysisResult, CodeExtraction, ExecutionResult, ExplanationMode, PracticeSet, TestCase,
};
use codelens_llm::{with_retry, LlmError, ModelProvider, ModelRequest, RetryPolicy};
use tracing::{error, info, warn};

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::{fallback, normalize, prompt};

/// Inputs for a full code analysis
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Source text to analyze
    pub code: String,

    /// Language name, or the auto-detect sentinel
    pub language: String,

    /// Explanation depth
    pub mode: ExplanationMode,
}

/// Inputs for practice-problem generation
#[derive(Debug, Clone)]
pub struct PracticeRequest {
    /// Condensed description of the analysis that motivated the practice
    pub context: String,

    /// Language name carried over from the analysis
    pub language: String,

    /// Explanation depth
    pub mode: ExplanationMode,

    /// Concept the problem must target
    pub concept_label: String,

    /// Prompt of a problem the user already saw; set on regeneration
    pub previous_prompt: Option<String>,
}

impl PracticeRequest {
    /// Build a practice request from a completed analysis
    ///
    /// The context block names the identified errors, a summary truncated
    /// to `snippet_limit` characters, and the equally truncated original
    /// input. Error and summary lines are omitted when empty.
    pub fn from_analysis(
        analysis: &AnalysisResult,
        code: &str,
        language: impl Into<String>,
        mode: ExplanationMode,
        snippet_limit: usize,
    ) -> Self {
        let mut context = String::new();

        let causes = analysis.root_causes();
        if !causes.is_empty() {
            context.push_str(&format!("Identified Errors: {}.\n", causes.join("; ")));
        }
        if let Some(summary) = analysis.summary() {
            context.push_str(&format!(
                "Analysis Summary: {}.\n",
                truncate(summary, snippet_limit)
            ));
        }
        context.push_str(&format!("Original Input: {}", truncate(code, snippet_limit)));

        Self {
            context,
            language: language.into(),
            mode,
            concept_label: analysis
                .concept_label
                .clone()
                .unwrap_or_else(|| "logical reasoning".to_string()),
            previous_prompt: None,
        }
    }

    /// Record the problem the user already saw, forcing a different one
    pub fn with_previous_prompt(mut self, previous: impl Into<String>) -> Self {
        self.previous_prompt = Some(previous.into());
        self
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// The Analyzer turns user inputs into normalized, typed results
///
/// Each operation is independently invokable and holds no shared mutable
/// state; retries within one call are strictly sequential.
pub struct Analyzer<M: ModelProvider> {
    provider: Arc<M>,
    config: AnalyzerConfig,
}

impl<M: ModelProvider> Analyzer<M> {
    /// Create a new Analyzer
    pub fn new(provider: M, config: AnalyzerConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Extract code or a math problem from an image
    ///
    /// Low extraction confidence is data for the caller to flag, not an
    /// error.
    pub async fn extract_code(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<CodeExtraction, AnalyzerError> {
        info!(
            "Starting code extraction from {} image ({} bytes)",
            mime_type,
            image.len()
        );

        let request = ModelRequest::text(prompt::extraction_prompt()).with_image(image, mime_type);

        let response = match self.call_model(self.config.retry_policy(), request).await {
            Ok(text) => text,
            Err(err) if err.is_quota_exhausted() => {
                warn!("Quota exceeded in extraction, returning mock");
                return Ok(fallback::mock_extraction());
            }
            Err(err) if err.is_rate_limited() => return Err(AnalyzerError::RateLimited),
            Err(err) => {
                error!("Extraction failed: {}", err);
                return Err(AnalyzerError::OperationFailed(
                    "Failed to extract code from image.".to_string(),
                ));
            }
        };

        normalize::normalize_extraction(&response).map_err(|err| {
            warn!("Extraction reply malformed: {}", err);
            AnalyzerError::OperationFailed("Failed to extract code from image.".to_string())
        })
    }

    /// Run the full five-section analysis over one piece of code
    pub async fn analyze_code(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalyzerError> {
        info!(
            "Starting analysis of {} code ({} chars, {} mode)",
            request.language,
            request.code.len(),
            request.mode.as_str()
        );

        let model_request = ModelRequest::text(prompt::analysis_prompt(
            &request.code,
            &request.language,
            request.mode,
        ));

        let response = match self.call_model(self.config.retry_policy(), model_request).await {
            Ok(text) => text,
            Err(err) if err.is_quota_exhausted() => {
                warn!("Quota exceeded in analysis, returning mock");
                return Ok(fallback::mock_analysis(&request.code));
            }
            Err(err) if err.is_rate_limited() => return Err(AnalyzerError::RateLimited),
            Err(err) => {
                error!("Analysis failed: {}", err);
                return Err(AnalyzerError::OperationFailed(
                    "Failed to analyze code.".to_string(),
                ));
            }
        };

        normalize::normalize_analysis(&response).map_err(|err| {
            warn!("Analysis reply malformed: {}", err);
            AnalyzerError::OperationFailed("Failed to analyze code.".to_string())
        })
    }

    /// Generate a practice problem targeting the analyzed concept
    ///
    /// Runs under the wider practice retry budget. A reply with zero
    /// problems is an error, never an empty success.
    pub async fn generate_practice(
        &self,
        request: &PracticeRequest,
    ) -> Result<PracticeSet, AnalyzerError> {
        info!(
            "Generating practice problem for concept '{}'",
            request.concept_label
        );

        let model_request = ModelRequest::text(prompt::practice_prompt(
            &request.concept_label,
            &request.context,
            &request.language,
            request.mode,
            request.previous_prompt.as_deref(),
        ));

        let response = match self
            .call_model(self.config.practice_retry_policy(), model_request)
            .await
        {
            Ok(text) => text,
            Err(err) if err.is_quota_exhausted() => {
                warn!("Quota exceeded in practice, returning mock");
                return Ok(fallback::mock_practice());
            }
            Err(err) if err.is_rate_limited() => return Err(AnalyzerError::RateLimited),
            Err(err) => {
                error!("Practice generation failed: {}", err);
                return Err(AnalyzerError::OperationFailed(
                    "Failed to generate practice problem.".to_string(),
                ));
            }
        };

        let set = normalize::normalize_practice(&response).map_err(|err| {
            warn!("Practice reply malformed: {}", err);
            AnalyzerError::OperationFailed("Failed to generate practice problem.".to_string())
        })?;

        if set.is_empty() {
            return Err(AnalyzerError::EmptyPractice);
        }
        Ok(set)
    }

    /// Simulate execution of code against its example tests
    ///
    /// Zero supplied tests would violate the at-least-one contract, so a
    /// placeholder is synthesized before the request is built.
    pub async fn run_tests(
        &self,
        code: &str,
        tests: &[TestCase],
    ) -> Result<ExecutionResult, AnalyzerError> {
        let effective: Vec<TestCase> = if tests.is_empty() {
            vec![TestCase::placeholder()]
        } else {
            tests.to_vec()
        };

        info!("Simulating execution against {} test(s)", effective.len());

        let model_request = ModelRequest::text(prompt::execution_prompt(code, &effective));

        let response = match self.call_model(self.config.retry_policy(), model_request).await {
            Ok(text) => text,
            Err(err) if err.is_quota_exhausted() => {
                warn!("Quota exceeded in execution, returning mock");
                return Ok(fallback::mock_execution(&effective));
            }
            Err(err) if err.is_rate_limited() => return Err(AnalyzerError::RateLimited),
            Err(err) => {
                error!("Test execution failed: {}", err);
                return Err(AnalyzerError::OperationFailed(
                    "Execution simulation failed.".to_string(),
                ));
            }
        };

        normalize::normalize_execution(&response).map_err(|err| {
            warn!("Execution reply malformed: {}", err);
            AnalyzerError::OperationFailed("Execution simulation failed.".to_string())
        })
    }

    async fn call_model(
        &self,
        policy: RetryPolicy,
        request: ModelRequest,
    ) -> Result<String, LlmError> {
        with_retry(policy, || self.provider.generate(request.clone())).await
    }
}
