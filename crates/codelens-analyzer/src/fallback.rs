//! Deterministic fallback payloads for quota exhaustion
//!
//! When the provider reports a hard quota ceiling, operations substitute
//! these mocks instead of failing, keeping the app demonstrable offline.
//! Every payload is marked `is_mock` and satisfies the same structural
//! invariants as a real reply, and the content is fixed so rendering tests
//! can match it.

use codelens_domain::{
    AnalysisResult, CodeExtraction, Correction, ErrorAnalysis, ErrorDetail, ErrorKind,
    ExecutionResult, Explanation, GraderKind, PracticeProblem, PracticeSet, TestCase, TestResult,
    TestStatus,
};

const MOCK_EXTRACTION_TEXT: &str = "def calculate_average(numbers):\n    total = 0\n    for n in numbers:\n        total += n\n    # Error: Division by zero if list is empty, also integer division in older Python versions\n    return total / 0 if len(numbers) == 0 else total / len(numbers)\n\nprint(calculate_average([10, 20, 30]))";

/// Stand-in extraction: a small Python sample with a seeded bug
pub fn mock_extraction() -> CodeExtraction {
    let mut extraction = CodeExtraction::new("python", MOCK_EXTRACTION_TEXT, 1.0);
    extraction.is_mock = true;
    extraction
}

/// Stand-in analysis, echoing the first line of the user's input so the
/// substitution is recognizable
pub fn mock_analysis(code: &str) -> AnalysisResult {
    let first_line = code.split('\n').next().unwrap_or_default();

    AnalysisResult {
        error_analysis: Some(ErrorAnalysis {
            errors: vec![ErrorDetail {
                line: 1,
                kind: ErrorKind::Runtime,
                root_cause: "API Quota Exceeded. This is a simulated error for demonstration."
                    .to_string(),
                confidence: 1.0,
            }],
            short_overlay: "Your API quota has been exceeded. We are showing a demo analysis result to demonstrate the app's features.".to_string(),
        }),
        correction: Some(Correction {
            corrected_code: format!(
                "# SIMULATED CORRECTION\n# Your original code was:\n{first_line}...\n\nprint(\"Quota exceeded - displaying demo output\")"
            ),
            patch_summary: "Simulated fix due to API quota limits.".to_string(),
            fixed_lines: Some(vec![1, 2, 3]),
            tests: vec![TestCase {
                id: "demo-test".to_string(),
                input: "demo".to_string(),
                expected: "demo".to_string(),
            }],
            exec_safe: true,
        }),
        explanation: Some(Explanation {
            text: "You have exceeded your API usage limits for today. This response is a placeholder to keep the application UI functional. Please check your billing details or try again later.".to_string(),
        }),
        reasoning_steps: Some(vec![
            "Detected API quota limit reached from response headers.".to_string(),
            "Switched to fallback mock data generator.".to_string(),
            "Formatted response to match standard API output structure.".to_string(),
        ]),
        follow_up_suggestion: Some(
            "Check your Google Cloud Console billing/quota settings.".to_string(),
        ),
        concept_label: Some("API Quota Management".to_string()),
        flow_diagram: None,
        is_mock: true,
    }
}

/// Stand-in practice set with one trivially solvable problem
pub fn mock_practice() -> PracticeSet {
    PracticeSet {
        problems: vec![PracticeProblem {
            id: "mock-p1".to_string(),
            prompt: "This is a placeholder practice problem because the API quota was exceeded. In a real scenario, this would be a question about your code's logic. What is 2 + 2?".to_string(),
            hint: "It is the sum of two and two.".to_string(),
            solution: "4".to_string(),
            grader: GraderKind::Exact,
        }],
    }
}

/// Stand-in execution: every supplied test passes with a simulated note
pub fn mock_execution(tests: &[TestCase]) -> ExecutionResult {
    ExecutionResult {
        test_results: tests
            .iter()
            .map(|test| TestResult {
                id: test.id.clone(),
                status: TestStatus::Pass,
                output: "Simulated pass (quota exceeded)".to_string(),
                expected: test.expected.clone(),
            })
            .collect(),
        stdout: "Execution unavailable (Quota Exceeded)".to_string(),
        stderr: String::new(),
    }
}
