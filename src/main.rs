//! doublecheck CLI entry point.

use clap::Parser;
use doublecheck::cli::{self, Cli, Commands, EXIT_ERROR};
use tracing_subscriber::filter::EnvFilter;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.run.verbose);

    let result = match cli.command {
        Some(Commands::List) => cli::run_list(),
        Some(Commands::Run) | None => cli::run_tests(&cli.run),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
