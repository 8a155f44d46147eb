//! Output formatting for the CLI.

use crate::error::CliError;
use crate::history::HistoryEntry;
use codelens_analyzer::AnalyzerError;
use codelens_domain::{
    AnalysisResult, CodeExtraction, Correction, ErrorDetail, ExecutionResult, PracticeProblem,
    TestStatus,
};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Banner categories for session notices.
///
/// The tag, not the message wording, decides how a banner is styled, so
/// renderers never have to sniff message prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Simulated results are shown because the API quota ran out
    DemoMode,
    /// An extraction came back below the confidence threshold
    LowConfidence,
    /// The model is saturated and the request should be retried later
    RateLimited,
    /// The operation failed outright
    Failure,
}

/// A tagged banner message.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Banner category
    pub kind: NoticeKind,

    /// Message to display
    pub text: String,
}

impl Notice {
    /// Banner for simulated analysis results.
    pub fn demo_analysis() -> Self {
        Self {
            kind: NoticeKind::DemoMode,
            text: "Demo Mode: API Quota exceeded. Showing simulated results.".to_string(),
        }
    }

    /// Banner for simulated extraction results.
    pub fn demo_extraction() -> Self {
        Self {
            kind: NoticeKind::DemoMode,
            text: "Demo Mode: Quota exceeded. Loaded sample code instead.".to_string(),
        }
    }

    /// Banner for an extraction the model was unsure about.
    pub fn low_confidence() -> Self {
        Self {
            kind: NoticeKind::LowConfidence,
            text: "I couldn't confidently find code in this image. Please crop closer or paste manually."
                .to_string(),
        }
    }

    /// Banner for a failed operation, categorized by error variant.
    pub fn for_error(err: &CliError) -> Self {
        let kind = match err {
            CliError::Analyzer(AnalyzerError::RateLimited) => NoticeKind::RateLimited,
            _ => NoticeKind::Failure,
        };
        Self {
            kind,
            text: err.to_string(),
        }
    }
}

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Render a session notice with kind-based styling.
    pub fn notice(&self, notice: &Notice) -> String {
        match notice.kind {
            NoticeKind::DemoMode => self.colorize(&format!("ℹ {}", notice.text), "magenta"),
            NoticeKind::LowConfidence | NoticeKind::RateLimited => self.warning(&notice.text),
            NoticeKind::Failure => self.error(&notice.text),
        }
    }

    /// Render an extraction preview with numbered lines.
    pub fn extraction(&self, extraction: &CodeExtraction) -> String {
        let mut out = self.colorize(
            &format!(
                "Extracted {} ({:.0}% confidence)",
                extraction.language,
                extraction.confidence * 100.0
            ),
            "cyan",
        );
        out.push('\n');
        for line in &extraction.lines {
            out.push_str(&format!("{:>4} | {}\n", line.n, line.text));
        }
        out.trim_end().to_string()
    }

    /// Render a full analysis report, section by section.
    ///
    /// Absent sections are skipped rather than rendered as placeholders.
    pub fn analysis_report(&self, result: &AnalysisResult) -> String {
        let mut sections: Vec<String> = Vec::new();

        if let Some(analysis) = &result.error_analysis {
            if !analysis.short_overlay.is_empty() {
                sections.push(self.warning(&analysis.short_overlay));
            }
            if analysis.is_clean() {
                sections.push(self.success("No errors found."));
            } else {
                sections.push(self.errors_table(&analysis.errors));
            }
        }

        if let Some(correction) = &result.correction {
            sections.push(self.correction_section(correction));
        }

        if let Some(explanation) = &result.explanation {
            sections.push(format!("{}\n{}", self.header("Explanation"), explanation.text));
        }

        if let Some(steps) = &result.reasoning_steps {
            if !steps.is_empty() {
                let numbered = steps
                    .iter()
                    .enumerate()
                    .map(|(i, step)| format!("  {}. {}", i + 1, step))
                    .collect::<Vec<_>>()
                    .join("\n");
                sections.push(format!("{}\n{}", self.header("Reasoning"), numbered));
            }
        }

        if let Some(diagram) = &result.flow_diagram {
            let mut section = format!("{}\n{}", self.header("Flow"), diagram.ascii);
            if let Some(caption) = &diagram.caption {
                section.push('\n');
                section.push_str(&self.info(caption));
            }
            sections.push(section);
        }

        if let Some(follow_up) = &result.follow_up_suggestion {
            sections.push(self.info(&format!("Next: {}", follow_up)));
        }

        if let Some(concept) = &result.concept_label {
            sections.push(format!("Concept: {}", self.colorize(concept, "cyan")));
        }

        sections.join("\n\n")
    }

    /// Render a practice problem. The reference solution stays hidden.
    pub fn practice_problem(&self, problem: &PracticeProblem) -> String {
        format!(
            "{}\n{}\n\n{}",
            self.header("Practice"),
            problem.prompt,
            self.info(&format!("Hint: {}", problem.hint))
        )
    }

    /// Render simulated execution results.
    pub fn execution_report(&self, result: &ExecutionResult) -> String {
        let mut sections: Vec<String> = Vec::new();

        let mut builder = Builder::default();
        builder.push_record(["Test", "Status", "Output", "Expected"]);
        for test in &result.test_results {
            let status = match test.status {
                TestStatus::Pass => self.colorize("pass", "green"),
                TestStatus::Fail => self.colorize("fail", "red"),
            };
            builder.push_record([test.id.as_str(), &status, &test.output, &test.expected]);
        }
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        sections.push(table.to_string());

        let verdict = format!(
            "{}/{} tests passed",
            result.passed_count(),
            result.test_results.len()
        );
        if result.all_passed() {
            sections.push(self.success(&verdict));
        } else {
            sections.push(self.warning(&verdict));
        }

        if !result.stdout.is_empty() {
            sections.push(format!("{}\n{}", self.header("stdout"), result.stdout));
        }
        if !result.stderr.is_empty() {
            sections.push(format!("{}\n{}", self.colorize("stderr", "red"), result.stderr));
        }

        sections.join("\n\n")
    }

    /// Render the history listing.
    pub fn history_table(&self, entries: &[HistoryEntry]) -> String {
        if entries.is_empty() {
            return self.colorize("No analyses in history.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Language", "Concept", "Errors", "Code"]);

        for (idx, entry) in entries.iter().enumerate() {
            let mut concept = entry
                .result
                .concept_label
                .as_deref()
                .unwrap_or("-")
                .to_string();
            if entry.result.is_mock {
                concept.push_str(" (demo)");
            }
            let errors = entry
                .result
                .error_analysis
                .as_ref()
                .map(|analysis| analysis.errors.len())
                .unwrap_or(0);
            let position = (idx + 1).to_string();
            let error_count = errors.to_string();
            let code_snippet = snippet(&entry.code);
            builder.push_record([
                position.as_str(),
                &entry.language,
                &concept,
                &error_count,
                &code_snippet,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn errors_table(&self, errors: &[ErrorDetail]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Line", "Kind", "Root cause", "Confidence"]);

        for error in errors {
            let line = error.line.to_string();
            let confidence = format!("{:.0}%", error.confidence * 100.0);
            builder.push_record([line.as_str(), error.kind.as_str(), &error.root_cause, &confidence]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn correction_section(&self, correction: &Correction) -> String {
        let fixed: &[u32] = correction.fixed_lines.as_deref().unwrap_or_default();

        let mut out = format!("{}\n", self.header("Correction"));
        out.push_str(&correction.patch_summary);
        out.push('\n');

        for (idx, line) in correction.corrected_code.lines().enumerate() {
            let n = (idx + 1) as u32;
            let rendered = if fixed.contains(&n) {
                self.colorize(&format!("▶ {:>3} | {}", n, line), "green")
            } else {
                format!("  {:>3} | {}", n, line)
            };
            out.push_str(&rendered);
            out.push('\n');
        }

        out.push_str(&format!("{} test case(s) attached.", correction.tests.len()));
        out
    }

    fn header(&self, title: &str) -> String {
        self.colorize(title, "cyan")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn snippet(code: &str) -> String {
    let first_line = code.lines().next().unwrap_or("");
    let mut out: String = first_line.chars().take(40).collect();
    if first_line.chars().count() > 40 {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_domain::{
        ErrorAnalysis, ErrorKind, Explanation, GraderKind, TestCase, TestResult,
    };

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            error_analysis: Some(ErrorAnalysis {
                errors: vec![ErrorDetail {
                    line: 2,
                    kind: ErrorKind::Logic,
                    root_cause: "Off-by-one in loop bound".to_string(),
                    confidence: 0.92,
                }],
                short_overlay: "Loop stops one element early.".to_string(),
            }),
            correction: Some(Correction {
                corrected_code: "for (i in 1:n) {\n  total <- total + x[i]\n}".to_string(),
                patch_summary: "Use 1:n instead of 1:(n-1).".to_string(),
                fixed_lines: Some(vec![1]),
                tests: vec![TestCase::placeholder()],
                exec_safe: true,
            }),
            explanation: Some(Explanation {
                text: "The loop bound excluded the final element.".to_string(),
            }),
            reasoning_steps: Some(vec![
                "Read the loop bounds".to_string(),
                "Compared against vector length".to_string(),
            ]),
            follow_up_suggestion: Some("Would you like a practice problem?".to_string()),
            concept_label: Some("off-by-one error".to_string()),
            flow_diagram: None,
            is_mock: false,
        }
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("test"), "✗ test");
        assert_eq!(formatter.warning("test"), "⚠ test");
    }

    #[test]
    fn test_notice_texts() {
        let formatter = Formatter::new(false);
        let demo = formatter.notice(&Notice::demo_analysis());
        assert!(demo.contains("Demo Mode: API Quota exceeded."));

        let unsure = formatter.notice(&Notice::low_confidence());
        assert!(unsure.starts_with("⚠ "));
        assert!(unsure.contains("crop closer"));
    }

    #[test]
    fn test_notice_kind_from_error() {
        let rate_limited = Notice::for_error(&CliError::Analyzer(AnalyzerError::RateLimited));
        assert_eq!(rate_limited.kind, NoticeKind::RateLimited);
        assert_eq!(rate_limited.text, "Traffic is high. Please wait a moment.");

        let failed = Notice::for_error(&CliError::Analyzer(AnalyzerError::OperationFailed(
            "Failed to analyze code.".to_string(),
        )));
        assert_eq!(failed.kind, NoticeKind::Failure);
    }

    #[test]
    fn test_extraction_preview() {
        let formatter = Formatter::new(false);
        let extraction = CodeExtraction::new("python", "x = 1\ny = 2", 0.95);
        let output = formatter.extraction(&extraction);
        assert!(output.contains("Extracted python (95% confidence)"));
        assert!(output.contains("1 | x = 1"));
        assert!(output.contains("2 | y = 2"));
    }

    #[test]
    fn test_analysis_report_sections() {
        let formatter = Formatter::new(false);
        let output = formatter.analysis_report(&sample_result());

        assert!(output.contains("Loop stops one element early."));
        assert!(output.contains("Root cause"));
        assert!(output.contains("Off-by-one in loop bound"));
        assert!(output.contains("92%"));
        assert!(output.contains("Correction"));
        assert!(output.contains("Use 1:n instead of 1:(n-1)."));
        assert!(output.contains("Explanation"));
        assert!(output.contains("1. Read the loop bounds"));
        assert!(output.contains("Next: Would you like a practice problem?"));
        assert!(output.contains("Concept: off-by-one error"));
    }

    #[test]
    fn test_fixed_lines_are_marked() {
        let formatter = Formatter::new(false);
        let output = formatter.analysis_report(&sample_result());
        assert!(output.contains("▶   1 | for (i in 1:n) {"));
        assert!(output.contains("    2 |   total <- total + x[i]"));
    }

    #[test]
    fn test_clean_analysis_reports_no_errors() {
        let formatter = Formatter::new(false);
        let result = AnalysisResult {
            error_analysis: Some(ErrorAnalysis {
                errors: Vec::new(),
                short_overlay: String::new(),
            }),
            ..Default::default()
        };
        let output = formatter.analysis_report(&result);
        assert!(output.contains("No errors found."));
    }

    #[test]
    fn test_practice_hides_solution() {
        let formatter = Formatter::new(false);
        let problem = PracticeProblem {
            id: "p1".to_string(),
            prompt: "What does 1:3 produce in R?".to_string(),
            hint: "It is a sequence.".to_string(),
            solution: "c(1, 2, 3)".to_string(),
            grader: GraderKind::Exact,
        };
        let output = formatter.practice_problem(&problem);
        assert!(output.contains("What does 1:3 produce in R?"));
        assert!(output.contains("Hint: It is a sequence."));
        assert!(!output.contains("c(1, 2, 3)"));
    }

    #[test]
    fn test_execution_report() {
        let formatter = Formatter::new(false);
        let result = ExecutionResult {
            test_results: vec![
                TestResult {
                    id: "t1".to_string(),
                    status: TestStatus::Pass,
                    output: "6".to_string(),
                    expected: "6".to_string(),
                },
                TestResult {
                    id: "t2".to_string(),
                    status: TestStatus::Fail,
                    output: "5".to_string(),
                    expected: "6".to_string(),
                },
            ],
            stdout: "done".to_string(),
            stderr: String::new(),
        };
        let output = formatter.execution_report(&result);
        assert!(output.contains("pass"));
        assert!(output.contains("fail"));
        assert!(output.contains("1/2 tests passed"));
        assert!(output.contains("stdout"));
        assert!(!output.contains("stderr"));
    }

    #[test]
    fn test_empty_history() {
        let formatter = Formatter::new(false);
        let output = formatter.history_table(&[]);
        assert!(output.contains("No analyses in history."));
    }

    #[test]
    fn test_history_table_marks_demo_entries() {
        let formatter = Formatter::new(false);
        let entries = vec![HistoryEntry {
            code: "total <- sum(values)".to_string(),
            language: "R".to_string(),
            result: AnalysisResult {
                concept_label: Some("API Quota Management".to_string()),
                is_mock: true,
                ..Default::default()
            },
            timestamp: 0,
        }];
        let output = formatter.history_table(&entries);
        assert!(output.contains("API Quota Management (demo)"));
        assert!(output.contains("total <- sum(values)"));
    }

    #[test]
    fn test_snippet_truncates_long_lines() {
        let long = "x".repeat(60);
        let out = snippet(&long);
        assert_eq!(out.chars().count(), 43);
        assert!(out.ends_with("..."));
        assert_eq!(snippet("short"), "short");
    }
}
