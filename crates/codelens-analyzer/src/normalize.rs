//! Shape raw model replies into typed results
//!
//! Models occasionally ignore the raw-JSON mandate: they fence the payload
//! in markdown, double-wrap single keys under an object of the same name,
//! or return line tables that disagree with the flat text. The repairs
//! here are the documented, tested list; anything else is rejected as
//! malformed rather than patched over.

use codelens_domain::{concept_label, AnalysisResult, CodeExtraction, ExecutionResult, PracticeSet};
use serde_json::Value;

use crate::error::AnalyzerError;

/// Strip a leading/trailing markdown code fence, with or without a
/// language tag
pub fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

fn parse_value(response: &str) -> Result<Value, AnalyzerError> {
    serde_json::from_str(strip_code_fences(response))
        .map_err(|e| AnalyzerError::MalformedResponse(format!("JSON parse error: {}", e)))
}

/// Undo single-key double wrapping, e.g. `{"reasoningSteps": {"reasoningSteps": [...]}}`
fn unwrap_double_wrapped(value: &mut Value) {
    if let Some(steps) = value.get_mut("reasoningSteps") {
        if steps.is_object() {
            *steps = steps
                .get("reasoningSteps")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()));
        }
    }
    if let Some(suggestion) = value.get_mut("followUpSuggestion") {
        if suggestion.is_object() {
            *suggestion = suggestion
                .get("followUpSuggestion")
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
        }
    }
}

/// Normalize a code-extraction reply
///
/// A missing or drifted `lines` table is rebuilt from `text`; `text` itself
/// is the source of truth.
pub fn normalize_extraction(response: &str) -> Result<CodeExtraction, AnalyzerError> {
    let value = parse_value(response)?;
    let mut extraction: CodeExtraction = serde_json::from_value(value)
        .map_err(|e| AnalyzerError::MalformedResponse(format!("code extraction schema: {}", e)))?;

    if extraction.lines.is_empty() || !extraction.is_consistent() {
        extraction.rebuild_lines();
    }
    Ok(extraction)
}

/// Normalize a full analysis reply
///
/// All three required sections must be present; the correction's test list
/// is padded to the never-empty invariant, and the concept label is derived
/// from the reported errors.
pub fn normalize_analysis(response: &str) -> Result<AnalysisResult, AnalyzerError> {
    let mut value = parse_value(response)?;
    unwrap_double_wrapped(&mut value);

    let mut analysis: AnalysisResult = serde_json::from_value(value)
        .map_err(|e| AnalyzerError::MalformedResponse(format!("analysis schema: {}", e)))?;

    if analysis.error_analysis.is_none() {
        return Err(AnalyzerError::MalformedResponse(
            "analysis reply is missing errorAnalysis".to_string(),
        ));
    }
    if analysis.correction.is_none() {
        return Err(AnalyzerError::MalformedResponse(
            "analysis reply is missing correction".to_string(),
        ));
    }
    if analysis.explanation.is_none() {
        return Err(AnalyzerError::MalformedResponse(
            "analysis reply is missing explanation".to_string(),
        ));
    }

    if let Some(correction) = analysis.correction.as_mut() {
        correction.ensure_tests();
    }

    let errors = analysis
        .error_analysis
        .as_ref()
        .map(|section| section.errors.as_slice())
        .unwrap_or_default();
    analysis.concept_label = Some(concept_label(errors));

    Ok(analysis)
}

/// Normalize a practice-generation reply
///
/// An empty problem list parses fine here; rejecting it is the caller's
/// decision, not a schema violation.
pub fn normalize_practice(response: &str) -> Result<PracticeSet, AnalyzerError> {
    let value = parse_value(response)?;
    serde_json::from_value(value)
        .map_err(|e| AnalyzerError::MalformedResponse(format!("practice schema: {}", e)))
}

/// Normalize an execution-simulation reply
///
/// Zero test results violates the at-least-one contract and is rejected,
/// not padded.
pub fn normalize_execution(response: &str) -> Result<ExecutionResult, AnalyzerError> {
    let value = parse_value(response)?;
    let execution: ExecutionResult = serde_json::from_value(value)
        .map_err(|e| AnalyzerError::MalformedResponse(format!("execution schema: {}", e)))?;

    if execution.test_results.is_empty() {
        return Err(AnalyzerError::MalformedResponse(
            "execution reply contains no test results".to_string(),
        ));
    }
    Ok(execution)
}
