//! Sequential test runner.

mod context;
mod suite;
mod types;

pub use context::TestContext;
pub use suite::{Suite, TestCase, GROUP_SEPARATOR};
pub use types::{Failure, RunSummary, TestError, TestResult, TestStatus};

use futures::FutureExt;
use globset::GlobMatcher;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, warn};

use crate::snapshot::SnapshotStore;
use suite::Body;

/// Runs the cases of a suite one at a time, in registration order.
pub struct Runner {
    snapshots: Arc<Mutex<SnapshotStore>>,
    filter: Option<GlobMatcher>,
}

impl Runner {
    /// Create a runner backed by the given snapshot store.
    pub fn new(snapshots: SnapshotStore) -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(snapshots)),
            filter: None,
        }
    }

    /// Only run tests whose full name matches `filter`.
    pub fn filter(mut self, filter: Option<GlobMatcher>) -> Self {
        self.filter = filter;
        self
    }

    fn selected(&self, case: &TestCase) -> bool {
        self.filter
            .as_ref()
            .map(|m| m.is_match(&case.name))
            .unwrap_or(true)
    }

    /// Run every selected case, then persist snapshots.
    ///
    /// A failing or panicking body only ends its own test. A snapshot file
    /// that cannot be written is reported on the summary, which then does not
    /// count as a success. The error returned here means the async runtime
    /// could not start.
    pub fn run(&self, suite: &Suite) -> anyhow::Result<RunSummary> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let started = Instant::now();
        let results: Vec<TestResult> = suite
            .cases()
            .iter()
            .filter(|case| self.selected(case))
            .map(|case| self.run_case(&runtime, case))
            .collect();

        let mut store = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshots = store.stats();
        let (snapshot_file_written, snapshot_error) = match store.save() {
            Ok(true) => (store.path().map(|p| p.display().to_string()), None),
            Ok(false) => (None, None),
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::new(e));
                warn!(error = %message, "failed to write snapshots");
                (None, Some(message))
            }
        };

        Ok(RunSummary {
            suite: suite.name().to_string(),
            results,
            duration: started.elapsed(),
            snapshots,
            snapshot_file_written,
            snapshot_error,
        })
    }

    fn run_case(&self, runtime: &tokio::runtime::Runtime, case: &TestCase) -> TestResult {
        let mut status = TestStatus::Pending;
        let cx = TestContext::new(case.name.as_str(), Arc::clone(&self.snapshots));

        transition(&mut status, TestStatus::Running, &case.name);
        let started = Instant::now();
        let outcome = match &case.body {
            Body::Sync(body) => panic::catch_unwind(AssertUnwindSafe(|| body(&cx))),
            Body::Async(body) => {
                runtime.block_on(AssertUnwindSafe(async { body(cx).await }).catch_unwind())
            }
        };
        let duration = started.elapsed();

        let (next, failure) = match outcome {
            Ok(Ok(())) => (TestStatus::Passed, None),
            Ok(Err(TestError::Assertion(e))) => (TestStatus::Failed, Some(Failure::Assertion(e))),
            Ok(Err(e)) => (TestStatus::Errored, Some(Failure::Error(e.to_string()))),
            Err(payload) => (
                TestStatus::Errored,
                Some(Failure::Error(format!("panicked: {}", panic_message(&*payload)))),
            ),
        };
        transition(&mut status, next, &case.name);

        TestResult {
            name: case.name.clone(),
            status,
            duration,
            failure,
        }
    }
}

fn transition(status: &mut TestStatus, next: TestStatus, name: &str) {
    debug_assert!(status.can_become(next), "{} -> {}", status, next);
    debug!(test = name, from = %status, to = %next, "test status");
    *status = next;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
