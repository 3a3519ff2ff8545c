//! Per-test context handed to every body.

use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::snapshot::{SnapshotMode, SnapshotOutcome, SnapshotStore};

/// The running test's name and access to the snapshot store.
///
/// A fresh context is created for each test, so nothing here outlives it
/// except the shared store.
#[derive(Debug, Clone)]
pub struct TestContext {
    name: Arc<str>,
    snapshot_counter: Arc<AtomicUsize>,
    snapshots: Arc<Mutex<SnapshotStore>>,
}

impl TestContext {
    pub fn new(name: impl Into<Arc<str>>, snapshots: Arc<Mutex<SnapshotStore>>) -> Self {
        Self {
            name: name.into(),
            snapshot_counter: Arc::new(AtomicUsize::new(0)),
            snapshots,
        }
    }

    /// A context with its own in-memory snapshot store, for use outside a runner.
    pub fn detached(name: impl Into<Arc<str>>) -> Self {
        Self::new(
            name,
            Arc::new(Mutex::new(SnapshotStore::in_memory(SnapshotMode::Record))),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key for the next snapshot assertion in this test.
    pub fn next_snapshot_key(&self) -> String {
        let n = self.snapshot_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{} {}", self.name, n)
    }

    pub fn check_snapshot(&self, key: &str, actual: Value) -> SnapshotOutcome {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .check(key, actual)
    }
}
