//! Error types for the Analyzer

use thiserror::Error;

/// Errors that can occur during an analyzer operation
///
/// Display strings double as user-facing messages, so they stay short and
/// carry no provider jargon.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Rate limiting outlasted the retry budget
    #[error("Traffic is high. Please wait a moment.")]
    RateLimited,

    /// Practice generation succeeded but returned zero problems
    #[error("Could not generate a new problem.")]
    EmptyPractice,

    /// Model reply could not be shaped into the expected schema
    ///
    /// Raised by the normalizer and mapped to an operation failure at the
    /// orchestrator boundary; the detail is logged, not shown.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Operation failed for a reason retries cannot fix
    #[error("{0}")]
    OperationFailed(String),
}
