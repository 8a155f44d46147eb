//! CodeLens Domain Layer
//!
//! This crate contains the contract types and pure derivations shared by the
//! CodeLens debugging assistant. It defines the payloads exchanged with the
//! generative model and the value logic that operates on them, with no I/O.
//!
//! ## Key Concepts
//!
//! - **CodeExtraction**: code or math read out of an image, with per-line text
//! - **AnalysisResult**: envelope combining error analysis, correction,
//!   explanation, reasoning steps and an optional flow diagram for one run
//! - **PracticeSet**: generated exercise targeting the analyzed concept
//! - **ExecutionResult**: simulated test-run outcome
//! - **Concept label**: short classification of the dominant bug category,
//!   used to target practice generation
//!
//! ## Architecture
//!
//! - Pure value types and functions only
//! - Serde derives match the model's JSON field names
//! - Orchestration, transport and rendering live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod concept;
pub mod execution;
pub mod extraction;
pub mod practice;
pub mod settings;

// Re-exports for convenience
pub use analysis::{
    AnalysisResult, Correction, ErrorAnalysis, ErrorDetail, ErrorKind, Explanation, FlowDiagram,
    TestCase,
};
pub use concept::concept_label;
pub use execution::{ExecutionResult, TestResult, TestStatus};
pub use extraction::{CodeExtraction, ExtractedLine, LOW_CONFIDENCE_THRESHOLD};
pub use practice::{AnswerFeedback, GraderKind, PracticeProblem, PracticeSet};
pub use settings::{ExplanationMode, AUTO_DETECT_LANGUAGE, SUPPORTED_LANGUAGES};
