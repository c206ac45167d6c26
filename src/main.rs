//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `spf_flattener` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use spf_flattener::initialization::init_logger_with;
use spf_flattener::{run_flatten, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Missing domain or --spf-file makes clap print usage and exit non-zero
    let config = Config::from(Opt::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_flatten(config).await {
        Ok(outcome) => {
            let report = &outcome.report;
            for record in report.records() {
                println!("TXT\t {}\t {}", report.fqdn(record), record.txt());
                println!("Length: {}", record.len());
            }
            println!(
                "Flattened lookup count: {}{}",
                report.lookup_count,
                if report.is_split() {
                    format!(" - split into {} record(s)", report.shards.len())
                } else {
                    " - original record kept".to_string()
                }
            );
            println!(
                "Records saved in {} (original backed up to {})",
                outcome.output_path.display(),
                outcome.backup_path.display()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("spf_flattener error: {:#}", e);
            process::exit(1);
        }
    }
}
