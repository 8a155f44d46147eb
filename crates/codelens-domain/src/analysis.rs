//! Analysis payloads - errors, corrections, explanations and the combined envelope

use serde::{Deserialize, Serialize};

/// Classification of a single identified defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed source that fails to parse
    Syntax,

    /// Valid source computing the wrong thing
    Logic,

    /// Failure raised during execution
    Runtime,
}

impl ErrorKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Logic => "logic",
            ErrorKind::Runtime => "runtime",
        }
    }
}

/// One identified defect in the analyzed source
///
/// `line` points at the 1-based line of the actual statement containing the
/// error, never a comment or blank line. That rule is part of the model
/// contract and is not locally enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// 1-based line number of the offending statement
    pub line: u32,

    /// Defect classification
    pub kind: ErrorKind,

    /// Free-text root cause
    pub root_cause: String,

    /// Model confidence in [0, 1]
    pub confidence: f64,
}

/// Aggregate of identified defects for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    /// Identified defects, ordered by the model
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,

    /// Short human-readable overlay string
    pub short_overlay: String,
}

impl ErrorAnalysis {
    /// True when no defects were identified
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One example input/expected-output pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Identifier, unique within its correction
    pub id: String,

    /// Input text handed to the corrected code
    pub input: String,

    /// Expected output text
    pub expected: String,
}

impl TestCase {
    /// The synthesized stand-in used whenever a tests list would otherwise
    /// be empty. Content is fixed so downstream assertions can match it.
    pub fn placeholder() -> Self {
        Self {
            id: "default-test".to_string(),
            input: "Sample input".to_string(),
            expected: "Sample output".to_string(),
        }
    }
}

/// Proposed fix for the analyzed source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    /// Full corrected source text
    pub corrected_code: String,

    /// Human-readable patch summary
    pub patch_summary: String,

    /// 1-based line numbers in `corrected_code` carrying the fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_lines: Option<Vec<u32>>,

    /// Example tests for the fix. Never empty after normalization: a
    /// placeholder is synthesized when the model omits them.
    #[serde(default)]
    pub tests: Vec<TestCase>,

    /// Whether the corrected code is safe to execute
    #[serde(default)]
    pub exec_safe: bool,
}

impl Correction {
    /// Synthesize a placeholder test if the list is empty
    pub fn ensure_tests(&mut self) {
        if self.tests.is_empty() {
            self.tests.push(TestCase::placeholder());
        }
    }
}

/// Natural-language narrative of the bug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// Free text
    pub text: String,
}

/// ASCII flow diagram of the analyzed code's execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDiagram {
    /// The diagram text, box-drawing characters and bug markers included
    pub ascii: String,

    /// Short description of what the diagram shows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Envelope combining every payload section for one analysis run
///
/// Constructed once per invocation and handed to the caller by value; it is
/// never partially populated and never mutated in place afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    /// Identified defects and overlay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_analysis: Option<ErrorAnalysis>,

    /// Proposed fix with example tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<Correction>,

    /// Narrative explanation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,

    /// 3-5 short steps describing how the bug was identified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_steps: Option<Vec<String>>,

    /// One suggested next improvement, empty when none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_suggestion: Option<String>,

    /// Derived concept label driving practice generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_label: Option<String>,

    /// Optional execution-flow diagram, present only for code with
    /// loops or conditionals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_diagram: Option<FlowDiagram>,

    /// True when this payload came from the offline fallback generator
    pub is_mock: bool,
}

impl AnalysisResult {
    /// Root causes of every identified defect, in model order
    pub fn root_causes(&self) -> Vec<&str> {
        self.error_analysis
            .as_ref()
            .map(|analysis| {
                analysis
                    .errors
                    .iter()
                    .map(|e| e.root_cause.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Best available one-paragraph summary: the explanation text, falling
    /// back to the error overlay. Empty sections count as absent.
    pub fn summary(&self) -> Option<&str> {
        self.explanation
            .as_ref()
            .map(|e| e.text.as_str())
            .filter(|text| !text.is_empty())
            .or_else(|| {
                self.error_analysis
                    .as_ref()
                    .map(|a| a.short_overlay.as_str())
            })
            .filter(|text| !text.is_empty())
    }
}
