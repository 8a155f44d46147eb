//! CodeLens Analyzer
//!
//! Request orchestration and response normalization for the debugging
//! assistant's model calls.
//!
//! # Overview
//!
//! The Analyzer sits between the session layer and the model provider. It
//! owns the prompt contracts for the four operations, the retry schedule
//! around each call, the normalization of drifting model replies into the
//! typed domain results, and the deterministic fallback payloads that keep
//! the app demonstrable when the provider's quota is exhausted.
//!
//! # Architecture
//!
//! ```text
//! Input → Analyzer → prompt → ModelProvider (retried) → normalize → typed result
//!                                     │ quota exhausted
//!                                     └→ fallback (is_mock)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use codelens_analyzer::{AnalysisRequest, Analyzer, AnalyzerConfig, SYSTEM_INSTRUCTION};
//! use codelens_domain::ExplanationMode;
//! use codelens_llm::GeminiClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = GeminiClient::from_env().with_system_instruction(SYSTEM_INSTRUCTION);
//! let analyzer = Analyzer::new(provider, AnalyzerConfig::default());
//!
//! let request = AnalysisRequest {
//!     code: "total <- sum(values)\nprint(tootal)".to_string(),
//!     language: "R".to_string(),
//!     mode: ExplanationMode::Beginner,
//! };
//!
//! let analysis = analyzer.analyze_code(&request).await?;
//! println!("Concept: {:?}", analysis.concept_label);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod fallback;
mod normalize;
mod prompt;


pub use analyzer::{AnalysisRequest, Analyzer, PracticeRequest};
pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use normalize::strip_code_fences;
pub use prompt::SYSTEM_INSTRUCTION;
