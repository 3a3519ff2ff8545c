//! Optional YAML configuration for the runner.
//!
//! Every field can also be given on the command line; flags win.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::snapshot::SnapshotMode;

/// Config file names searched in the current directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["doublecheck.yaml", ".doublecheck.yaml"];

/// Default location of the snapshot file.
pub const DEFAULT_SNAPSHOT_FILE: &str = "__snapshots__/zero_to_hero.snap.json";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Where snapshot baselines are stored
    #[serde(default)]
    pub snapshot_file: Option<PathBuf>,
    /// "pretty" (default) or "json"
    #[serde(default)]
    pub format: Option<String>,
    /// Glob over full test names; only matching tests run
    #[serde(default)]
    pub filter: Option<String>,
    /// Never write snapshots; a missing baseline fails (default: false)
    #[serde(default)]
    pub ci: Option<bool>,
    /// Overwrite baselines that differ (default: false)
    #[serde(default)]
    pub update_snapshots: Option<bool>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Returns the output format (defaults to "pretty").
    pub fn get_format(&self) -> &str {
        self.format.as_deref().unwrap_or("pretty")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_FILE))
    }

    pub fn snapshot_mode(&self) -> SnapshotMode {
        if self.ci.unwrap_or(false) {
            SnapshotMode::Ci
        } else if self.update_snapshots.unwrap_or(false) {
            SnapshotMode::Update
        } else {
            SnapshotMode::Record
        }
    }

    /// Compiled test-name filter, if one is set.
    pub fn filter_matcher(&self) -> anyhow::Result<Option<globset::GlobMatcher>> {
        match &self.filter {
            Some(pattern) => {
                let glob = globset::Glob::new(pattern)
                    .map_err(|e| anyhow::anyhow!("invalid filter {:?}: {}", pattern, e))?;
                Ok(Some(glob.compile_matcher()))
            }
            None => Ok(None),
        }
    }
}

/// Find a config file in the current directory.
pub fn discover() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    let format = config.get_format();
    if format != "pretty" && format != "json" {
        anyhow::bail!("invalid format {:?}, must be 'pretty' or 'json'", format);
    }

    if config.ci.unwrap_or(false) && config.update_snapshots.unwrap_or(false) {
        anyhow::bail!("'ci' and 'update_snapshots' cannot both be enabled");
    }

    config.filter_matcher()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
snapshot_file: "snaps/pizza.snap.json"
format: json
filter: "pizza*"
ci: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.snapshot_path(), PathBuf::from("snaps/pizza.snap.json"));
        assert_eq!(config.get_format(), "json");
        assert_eq!(config.snapshot_mode(), SnapshotMode::Ci);
        assert!(config.filter_matcher().unwrap().unwrap().is_match("pizza[0]"));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.get_format(), "pretty");
        assert_eq!(config.snapshot_path(), PathBuf::from(DEFAULT_SNAPSHOT_FILE));
        assert_eq!(config.snapshot_mode(), SnapshotMode::Record);
        assert!(config.filter_matcher().unwrap().is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_format = Config {
            format: Some("sarif".to_string()),
            ..Default::default()
        };
        assert!(validate(&bad_format).is_err());

        let conflicting = Config {
            ci: Some(true),
            update_snapshots: Some(true),
            ..Default::default()
        };
        assert!(validate(&conflicting).is_err());

        let bad_glob = Config {
            filter: Some("pizza[".to_string()),
            ..Default::default()
        };
        assert!(validate(&bad_glob).is_err());
    }

    #[test]
    fn test_parse_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("doublecheck.yaml");
        fs::write(&path, "update_snapshots: true\n").unwrap();
        let config = Config::parse_file(&path).unwrap();
        assert_eq!(config.snapshot_mode(), SnapshotMode::Update);
    }
}
