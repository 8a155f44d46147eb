//! Practice payloads - generated exercises and answer checking

use serde::{Deserialize, Serialize};

/// How a practice answer should be judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraderKind {
    /// Answer must match the solution exactly (ignoring case and whitespace)
    Exact,

    /// Answer is accepted when it looks like a plausible complete attempt
    Fuzzy,
}

impl GraderKind {
    /// Get the grader name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            GraderKind::Exact => "exact",
            GraderKind::Fuzzy => "fuzzy",
        }
    }
}

/// One generated exercise targeting the concept from the latest analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeProblem {
    /// Identifier assigned by the model
    pub id: String,

    /// The exercise statement shown to the user
    pub prompt: String,

    /// Hint revealed on request
    pub hint: String,

    /// Reference solution
    pub solution: String,

    /// How answers are judged
    pub grader: GraderKind,
}

/// Verdict from checking a practice answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerFeedback {
    /// Nothing was written
    Empty,

    /// Too short to count as a complete attempt
    TooShort,

    /// Accepted
    Correct,

    /// Rejected against the reference solution
    Incorrect,
}

impl PracticeProblem {
    /// Judge an answer according to this problem's grader.
    ///
    /// Exact graders compare against the solution, ignoring case and
    /// surrounding whitespace. Fuzzy graders accept any complete-looking
    /// attempt: a bare number, or free text of at least five characters.
    pub fn check_answer(&self, answer: &str) -> AnswerFeedback {
        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return AnswerFeedback::Empty;
        }

        match self.grader {
            GraderKind::Exact => {
                if trimmed.eq_ignore_ascii_case(self.solution.trim()) {
                    AnswerFeedback::Correct
                } else {
                    AnswerFeedback::Incorrect
                }
            }
            GraderKind::Fuzzy => {
                if is_numeric(trimmed) || trimmed.len() >= 5 {
                    AnswerFeedback::Correct
                } else {
                    AnswerFeedback::TooShort
                }
            }
        }
    }
}

/// Set of generated exercises, exactly one problem in normal operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSet {
    /// Generated problems
    #[serde(default)]
    pub problems: Vec<PracticeProblem>,
}

impl PracticeSet {
    /// True when the model produced no problems
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// The problem to present, when one exists
    pub fn primary(&self) -> Option<&PracticeProblem> {
        self.problems.first()
    }
}

/// An optionally signed integer or decimal, nothing else
fn is_numeric(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() {
        return false;
    }
    let mut parts = body.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next();

    let all_digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    all_digits(int_part) && frac_part.map_or(true, all_digits)
}
