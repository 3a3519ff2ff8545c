//! Output formatting for run summaries.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::runner::{Failure, RunSummary, TestResult, TestStatus};
use crate::snapshot::SnapshotStats;

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub suite: String,
    pub success: bool,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub duration_ms: u128,
    pub tests: Vec<JsonTestResult>,
    pub snapshots: SnapshotStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_file_written: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_error: Option<String>,
}

/// One test in the JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonTestResult {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<JsonFailure>,
}

/// Failure detail. Assertion failures carry expected and actual.
#[derive(Serialize, Deserialize)]
pub struct JsonFailure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

/// Build the JSON report for a run.
pub fn json_report(summary: &RunSummary) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        suite: summary.suite.clone(),
        success: summary.success(),
        total: summary.total(),
        passed: summary.passed(),
        failed: summary.failed(),
        errored: summary.errored(),
        duration_ms: summary.duration.as_millis(),
        tests: summary.results.iter().map(result_to_json).collect(),
        snapshots: summary.snapshots,
        snapshot_file_written: summary.snapshot_file_written.clone(),
        snapshot_error: summary.snapshot_error.clone(),
    }
}

/// Write results in JSON format.
pub fn write_json(summary: &RunSummary) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_report(summary))?;
    println!("{}", json);
    Ok(())
}

fn result_to_json(result: &TestResult) -> JsonTestResult {
    JsonTestResult {
        name: result.name.clone(),
        status: result.status,
        duration_ms: result.duration.as_millis(),
        failure: result.failure.as_ref().map(failure_to_json),
    }
}

fn failure_to_json(failure: &Failure) -> JsonFailure {
    match failure {
        Failure::Assertion(e) => JsonFailure {
            message: e.to_string(),
            matcher: Some(e.matcher.clone()),
            expected: Some(e.expected.clone()),
            actual: Some(e.actual.clone()),
        },
        Failure::Error(msg) => JsonFailure {
            message: msg.clone(),
            matcher: None,
            expected: None,
            actual: None,
        },
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(summary: &RunSummary) {
    // Header
    println!();
    print!("  ");
    print!("{}", "doublecheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", "Suite: ".dimmed());
    println!("{}", summary.suite);
    println!();

    for result in &summary.results {
        write_test_line(result);
    }
    println!();

    let failures: Vec<&TestResult> = summary.results.iter().filter(|r| !r.passed()).collect();
    if !failures.is_empty() {
        write_failures(&failures);
        println!();
    }

    write_snapshot_summary(&summary.snapshots, summary.snapshot_file_written.as_deref());
    if let Some(error) = &summary.snapshot_error {
        print!("  {}", "Snapshots: ".dimmed());
        println!("{} {}", "not written:".red(), error);
    }
    write_final_status(summary);
    println!();
}

fn write_test_line(result: &TestResult) {
    match result.status {
        TestStatus::Passed => print!("    {} ", "✓".green()),
        TestStatus::Failed => print!("    {} ", "✗".red()),
        TestStatus::Errored => print!("    {} ", "!".red().bold()),
        TestStatus::Pending | TestStatus::Running => print!("    {} ", "…".dimmed()),
    }
    print!("{}", result.name);
    println!(
        " {}",
        format!("({} ms)", result.duration.as_millis()).dimmed()
    );
}

fn write_failures(failures: &[&TestResult]) {
    println!("  {} ({}):", "Failures".bold(), failures.len());
    println!();

    for result in failures {
        match result.status {
            TestStatus::Errored => print!("    {} ", "ERROR".red()),
            _ => print!("    {} ", "FAIL ".red()),
        }
        println!("{}", result.name.bold());

        match &result.failure {
            Some(Failure::Assertion(e)) => {
                println!("            expect({}).{}", e.subject, e.matcher);
                println!();
                println!("            {} {}", "Expected:".green(), indent(&e.expected));
                println!("            {} {}", "Received:".red(), indent(&e.actual));
            }
            Some(Failure::Error(msg)) => {
                println!("            {}", msg);
            }
            None => {}
        }
        println!();
    }
}

/// Indent continuation lines of a multi-line value under its label.
fn indent(text: &str) -> String {
    text.replace('\n', "\n                      ")
}

fn write_snapshot_summary(stats: &SnapshotStats, written: Option<&str>) {
    let total = stats.matched + stats.written + stats.updated + stats.failed;
    if total == 0 && stats.unchecked == 0 {
        return;
    }

    print!("  {}", "Snapshots: ".dimmed());
    let mut parts = Vec::new();
    if stats.failed > 0 {
        parts.push(format!("{} failed", stats.failed).red().to_string());
    }
    if stats.written > 0 {
        parts.push(format!("{} written", stats.written).green().to_string());
    }
    if stats.updated > 0 {
        parts.push(format!("{} updated", stats.updated).green().to_string());
    }
    if stats.matched > 0 {
        parts.push(format!("{} passed", stats.matched));
    }
    if stats.unchecked > 0 {
        parts.push(format!("{} unchecked", stats.unchecked).yellow().to_string());
    }
    println!("{}", parts.join(", "));

    if let Some(path) = written {
        print!("  {}", "Written:   ".dimmed());
        println!("{}", path);
    }
}

fn write_final_status(summary: &RunSummary) {
    print!("  {}", "Tests:     ".dimmed());
    let mut parts = Vec::new();
    if summary.failed() > 0 {
        parts.push(format!("{} failed", summary.failed()).red().to_string());
    }
    if summary.errored() > 0 {
        parts.push(format!("{} errored", summary.errored()).red().to_string());
    }
    parts.push(format!("{} passed", summary.passed()).green().to_string());
    parts.push(format!("{} total", summary.total()));
    println!("{}", parts.join(", "));

    print!(
        "  {}",
        format!("Time:      {} ms", summary.duration.as_millis()).dimmed()
    );
    print!("  ");
    if summary.success() {
        print!("{}", "PASSED".green());
    } else {
        print!("{}", "FAILED".red());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expect::expect;
    use std::time::Duration;

    fn summary() -> RunSummary {
        let failure = expect(&1).to_be(2).unwrap_err();
        RunSummary {
            suite: "zero to hero".to_string(),
            results: vec![
                TestResult {
                    name: "passes".to_string(),
                    status: TestStatus::Passed,
                    duration: Duration::from_millis(3),
                    failure: None,
                },
                TestResult {
                    name: "fails".to_string(),
                    status: TestStatus::Failed,
                    duration: Duration::from_millis(1),
                    failure: Some(Failure::Assertion(failure)),
                },
                TestResult {
                    name: "errors".to_string(),
                    status: TestStatus::Errored,
                    duration: Duration::ZERO,
                    failure: Some(Failure::Error("panicked: boom".to_string())),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_json_report_counts() {
        let report = json_report(&summary());
        assert!(!report.success);
        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errored, 1);
        assert!(report.tests[0].failure.is_none());
    }

    #[test]
    fn test_json_failure_details() {
        let report = json_report(&summary());
        let failure = report.tests[1].failure.as_ref().unwrap();
        assert_eq!(failure.matcher.as_deref(), Some("to_be"));
        assert_eq!(failure.expected.as_deref(), Some("2"));
        assert_eq!(failure.actual.as_deref(), Some("1"));

        let error = report.tests[2].failure.as_ref().unwrap();
        assert_eq!(error.message, "panicked: boom");
        assert!(error.matcher.is_none());
    }

    #[test]
    fn test_json_serialization_shape() {
        let value = serde_json::to_value(json_report(&summary())).unwrap();
        assert_eq!(value["tests"][1]["status"], "failed");
        assert_eq!(value["tests"][2]["status"], "errored");
        assert!(value["tests"][0].get("failure").is_none());
        assert!(value.get("snapshot_file_written").is_none());
        assert!(value.get("snapshot_error").is_none());
    }

    #[test]
    fn test_snapshot_error_fails_the_report() {
        let summary = RunSummary {
            results: summary().results.into_iter().take(1).collect(),
            snapshot_error: Some("snapshot file snaps/x.snap.json: File exists".to_string()),
            ..Default::default()
        };
        let report = json_report(&summary);
        assert_eq!(report.passed, 1);
        assert!(!report.success);
        assert_eq!(
            report.snapshot_error.as_deref(),
            Some("snapshot file snaps/x.snap.json: File exists")
        );
    }
}
