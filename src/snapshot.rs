//! Persisted snapshot baselines.
//!
//! A snapshot file is a JSON object mapping snapshot keys
//! (`"<test name> <n>"`) to the serialized value recorded for them. The file
//! is read once before the run and written back after it, only if a baseline
//! was added or updated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors reading or writing a snapshot file.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot file {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// How missing and mismatching baselines are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    /// Write missing baselines, compare existing ones.
    #[default]
    Record,
    /// Overwrite every baseline that differs.
    Update,
    /// Never write; a missing baseline fails.
    Ci,
}

/// Result of checking one value against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    Matched,
    /// No baseline existed; the value is now the baseline.
    Written,
    /// The baseline differed and was overwritten.
    Updated,
    Mismatch { expected: Value },
    /// No baseline existed and the store may not write one.
    Missing,
}

/// Counters for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub matched: usize,
    pub written: usize,
    pub updated: usize,
    pub failed: usize,
    /// Stored baselines no test checked during the run.
    pub unchecked: usize,
}

/// In-memory view of a snapshot file.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
    mode: SnapshotMode,
    entries: BTreeMap<String, Value>,
    checked: BTreeSet<String>,
    stats: SnapshotStats,
    dirty: bool,
}

impl SnapshotStore {
    /// A store that never touches disk.
    pub fn in_memory(mode: SnapshotMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Load baselines from `path`. A missing file is an empty store.
    pub fn load<P: AsRef<Path>>(path: P, mode: SnapshotMode) -> Result<Self, SnapshotError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(SnapshotError::Io { path, source }),
        };
        debug!(path = %path.display(), "loaded snapshots");
        Ok(Self {
            path: Some(path),
            mode,
            entries,
            ..Default::default()
        })
    }

    pub fn mode(&self) -> SnapshotMode {
        self.mode
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compare `actual` with the baseline stored under `key`.
    pub fn check(&mut self, key: &str, actual: Value) -> SnapshotOutcome {
        self.checked.insert(key.to_string());
        let outcome = match self.entries.get(key) {
            Some(expected) if *expected == actual => SnapshotOutcome::Matched,
            Some(_) if self.mode == SnapshotMode::Update => {
                self.entries.insert(key.to_string(), actual);
                self.dirty = true;
                SnapshotOutcome::Updated
            }
            Some(expected) => SnapshotOutcome::Mismatch {
                expected: expected.clone(),
            },
            None if self.mode == SnapshotMode::Ci => SnapshotOutcome::Missing,
            None => {
                self.entries.insert(key.to_string(), actual);
                self.dirty = true;
                SnapshotOutcome::Written
            }
        };
        match outcome {
            SnapshotOutcome::Matched => self.stats.matched += 1,
            SnapshotOutcome::Written => self.stats.written += 1,
            SnapshotOutcome::Updated => self.stats.updated += 1,
            SnapshotOutcome::Mismatch { .. } | SnapshotOutcome::Missing => self.stats.failed += 1,
        }
        debug!(key, ?outcome, "snapshot checked");
        outcome
    }

    /// Counters so far, including baselines nobody checked.
    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            unchecked: self
                .entries
                .keys()
                .filter(|k| !self.checked.contains(*k))
                .count(),
            ..self.stats
        }
    }

    /// Write the store back if anything changed. Returns whether it wrote.
    pub fn save(&mut self) -> Result<bool, SnapshotError> {
        let path = match (&self.path, self.dirty) {
            (Some(path), true) => path.clone(),
            _ => return Ok(false),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SnapshotError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            SnapshotError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, json + "\n").map_err(|source| SnapshotError::Io {
            path: path.clone(),
            source,
        })?;
        self.dirty = false;
        debug!(path = %path.display(), entries = self.entries.len(), "wrote snapshots");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_first_run_writes_then_matches() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("__snapshots__").join("suite.snap.json");

        let mut store = SnapshotStore::load(&path, SnapshotMode::Record).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.check("pizza 1", json!([1, 2])), SnapshotOutcome::Written);
        assert!(store.save().unwrap());
        assert!(path.exists());

        let mut store = SnapshotStore::load(&path, SnapshotMode::Record).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.check("pizza 1", json!([1, 2])), SnapshotOutcome::Matched);
        assert!(!store.save().unwrap());
    }

    #[test]
    fn test_mismatch_is_not_written() {
        let mut store = SnapshotStore::in_memory(SnapshotMode::Record);
        store.check("k 1", json!("a"));
        let outcome = store.check("k 1", json!("b"));
        assert_eq!(
            outcome,
            SnapshotOutcome::Mismatch {
                expected: json!("a")
            }
        );
        assert_eq!(store.get("k 1"), Some(&json!("a")));
        assert_eq!(store.stats().failed, 1);
    }

    #[test]
    fn test_update_mode_overwrites() {
        let mut store = SnapshotStore::in_memory(SnapshotMode::Update);
        store.check("k 1", json!("a"));
        assert_eq!(store.check("k 1", json!("b")), SnapshotOutcome::Updated);
        assert_eq!(store.get("k 1"), Some(&json!("b")));
    }

    #[test]
    fn test_ci_mode_never_writes() {
        let mut store = SnapshotStore::in_memory(SnapshotMode::Ci);
        assert_eq!(store.check("k 1", json!(1)), SnapshotOutcome::Missing);
        assert!(store.get("k 1").is_none());
    }

    #[test]
    fn test_unchecked_entries_are_counted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("old.snap.json");
        fs::write(&path, r#"{"gone 1": 1, "kept 1": 2}"#).unwrap();

        let mut store = SnapshotStore::load(&path, SnapshotMode::Record).unwrap();
        store.check("kept 1", json!(2));
        let stats = store.stats();
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.unchecked, 1);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.snap.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            SnapshotStore::load(&path, SnapshotMode::Record),
            Err(SnapshotError::Parse { .. })
        ));
    }

    #[test]
    fn test_error_chain_names_cause_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.snap.json");
        fs::write(&path, "not json").unwrap();
        let err = SnapshotStore::load(&path, SnapshotMode::Record).unwrap_err();

        let top = err.to_string();
        assert!(top.ends_with("is not valid JSON"), "{}", top);

        let chain = format!("{:#}", anyhow::Error::new(err));
        let cause = chain.trim_start_matches(&format!("{}: ", top)).to_string();
        assert!(!cause.is_empty() && cause != chain, "{}", chain);
        assert_eq!(chain.matches(&cause).count(), 1, "{}", chain);
    }
}
