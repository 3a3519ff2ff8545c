//! Core types for test results.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::expect::AssertionError;
use crate::mock::{InvalidTargetError, Rejection};
use crate::snapshot::SnapshotStats;

/// Errors a test body can return.
#[derive(Error, Debug)]
pub enum TestError {
    #[error(transparent)]
    Assertion(#[from] AssertionError),
    #[error(transparent)]
    InvalidTarget(#[from] InvalidTargetError),
    /// Anything else the body did not handle.
    #[error("unhandled error in test body: {0}")]
    Body(String),
}

impl TestError {
    pub fn body(err: impl std::fmt::Display) -> Self {
        TestError::Body(err.to_string())
    }
}

impl From<Rejection> for TestError {
    fn from(rejection: Rejection) -> Self {
        TestError::Body(format!("unhandled rejection: {}", rejection))
    }
}

impl From<anyhow::Error> for TestError {
    fn from(err: anyhow::Error) -> Self {
        TestError::Body(format!("{:#}", err))
    }
}

/// Lifecycle of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Running,
    Passed,
    /// An expectation did not hold.
    Failed,
    /// The body returned another error or panicked.
    Errored,
}

impl TestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TestStatus::Passed | TestStatus::Failed | TestStatus::Errored
        )
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_become(&self, next: TestStatus) -> bool {
        match self {
            TestStatus::Pending => next == TestStatus::Running,
            TestStatus::Running => next.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::Pending => write!(f, "pending"),
            TestStatus::Running => write!(f, "running"),
            TestStatus::Passed => write!(f, "passed"),
            TestStatus::Failed => write!(f, "failed"),
            TestStatus::Errored => write!(f, "errored"),
        }
    }
}

/// Why a test did not pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    Assertion(AssertionError),
    Error(String),
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Assertion(e) => write!(f, "{}", e),
            Failure::Error(msg) => write!(f, "{}", msg),
        }
    }
}

/// Finalized result of one test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub duration: Duration,
    pub failure: Option<Failure>,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Results of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub suite: String,
    pub results: Vec<TestResult>,
    pub duration: Duration,
    pub snapshots: SnapshotStats,
    /// Where snapshots were written, if they were.
    pub snapshot_file_written: Option<String>,
    /// Why new or updated snapshots could not be written.
    pub snapshot_error: Option<String>,
}

impl RunSummary {
    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    pub fn errored(&self) -> usize {
        self.count(TestStatus::Errored)
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// True when every executed test passed and snapshots were saved.
    pub fn success(&self) -> bool {
        self.snapshot_error.is_none() && self.results.iter().all(TestResult::passed)
    }

    pub fn get(&self, name: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(TestStatus::Pending.can_become(TestStatus::Running));
        assert!(!TestStatus::Pending.can_become(TestStatus::Passed));
        assert!(TestStatus::Running.can_become(TestStatus::Errored));
        assert!(!TestStatus::Passed.can_become(TestStatus::Failed));
        assert!(!TestStatus::Running.is_terminal());
    }

    #[test]
    fn test_error_conversions() {
        let err: TestError = Rejection::new("Something went wrong").into();
        assert_eq!(
            err.to_string(),
            "unhandled error in test body: unhandled rejection: Something went wrong"
        );

        let err: TestError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, TestError::Body(ref m) if m == "boom"));
    }

    #[test]
    fn test_summary_counts() {
        let result = |name: &str, status| TestResult {
            name: name.to_string(),
            status,
            duration: Duration::ZERO,
            failure: None,
        };
        let summary = RunSummary {
            results: vec![
                result("a", TestStatus::Passed),
                result("b", TestStatus::Failed),
                result("c", TestStatus::Errored),
            ],
            ..Default::default()
        };
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.errored(), 1);
        assert!(!summary.success());
        assert!(RunSummary::default().success());
    }
}
