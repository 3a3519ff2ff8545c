//! Command-line interface for doublecheck.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::{self, Config};
use crate::report;
use crate::runner::Runner;
use crate::snapshot::SnapshotStore;
use crate::suite;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Mock functions, spies and matchers, run against the pizza menu.
///
/// With no subcommand, runs the built-in "zero to hero" suite.
#[derive(Parser)]
#[command(name = "doublecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the suite (default)
    Run,
    /// Print the registered test names
    List,
}

/// Run options. Accepted before or after the subcommand.
#[derive(Args, Clone, Default)]
pub struct RunArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Only run tests whose name matches this glob
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Snapshot file to compare against
    #[arg(long, global = true)]
    pub snapshot_file: Option<PathBuf>,

    /// Overwrite snapshots that no longer match
    #[arg(short = 'u', long, global = true)]
    pub update_snapshots: bool,

    /// Never write snapshots; a missing snapshot fails its test
    #[arg(long, global = true)]
    pub ci: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Load the config file, if any, and lay the command-line flags over it.
pub fn resolve_config(args: &RunArgs) -> anyhow::Result<Config> {
    let path = match &args.config {
        Some(p) => Some(p.clone()),
        None => config::discover(),
    };

    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Config::parse_file(&path)
                .map_err(|e| anyhow::anyhow!("error parsing config {}: {}", path.display(), e))?
        }
        None => Config::default(),
    };

    if args.format.is_some() {
        config.format = args.format.clone();
    }
    if args.filter.is_some() {
        config.filter = args.filter.clone();
    }
    if args.snapshot_file.is_some() {
        config.snapshot_file = args.snapshot_file.clone();
    }
    if args.ci {
        if config.update_snapshots.unwrap_or(false) {
            warn!("--ci overrides update_snapshots from the config file");
            config.update_snapshots = Some(false);
        }
        config.ci = Some(true);
    }
    if args.update_snapshots {
        if config.ci.unwrap_or(false) && !args.ci {
            warn!("--update-snapshots overrides ci from the config file");
            config.ci = Some(false);
        }
        config.update_snapshots = Some(true);
    }

    Ok(config)
}

/// Run the suite.
pub fn run_tests(args: &RunArgs) -> anyhow::Result<i32> {
    let config = match resolve_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    let snapshot_path = config.snapshot_path();
    let store = match SnapshotStore::load(&snapshot_path, config.snapshot_mode()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {:#}", anyhow::Error::new(e));
            return Ok(EXIT_ERROR);
        }
    };

    let suite = suite::zero_to_hero();
    let runner = Runner::new(store).filter(config.filter_matcher()?);
    let summary = runner.run(&suite)?;

    if summary.total() == 0 {
        eprintln!("Warning: no tests matched the filter");
    }

    match config.get_format() {
        "json" => report::write_json(&summary)?,
        _ => report::write_pretty(&summary),
    }

    if summary.success() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the list command.
pub fn run_list() -> anyhow::Result<i32> {
    let suite = suite::zero_to_hero();
    for case in suite.cases() {
        let kind = if case.is_async() { "async" } else { "sync" };
        println!("  {:<6} {}", kind, case.name());
    }
    println!();
    println!("{} tests", suite.len());
    Ok(EXIT_SUCCESS)
}
