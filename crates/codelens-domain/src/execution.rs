//! Execution payloads - simulated test-run outcomes

use serde::{Deserialize, Serialize};

/// Outcome of one simulated test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Output matched the expectation
    Pass,

    /// Output diverged from the expectation
    Fail,
}

impl TestStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
        }
    }
}

/// Result of one simulated test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test case identifier this result answers
    pub id: String,

    /// Pass or fail verdict
    pub status: TestStatus,

    /// Simulated output
    pub output: String,

    /// Expected output the verdict was judged against
    pub expected: String,
}

/// Simulated run of corrected code against its test cases
///
/// `test_results` always holds at least one entry; the orchestration layer
/// guarantees a placeholder test is part of every outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Per-test verdicts
    pub test_results: Vec<TestResult>,

    /// Simulated standard output
    #[serde(default)]
    pub stdout: String,

    /// Simulated standard error; syntax errors show up here
    #[serde(default)]
    pub stderr: String,
}

impl ExecutionResult {
    /// True when every test passed
    pub fn all_passed(&self) -> bool {
        self.test_results
            .iter()
            .all(|r| r.status == TestStatus::Pass)
    }

    /// Count of passed tests
    pub fn passed_count(&self) -> usize {
        self.test_results
            .iter()
            .filter(|r| r.status == TestStatus::Pass)
            .count()
    }
}
