//! Main application entry point (CLI binary).
//!
//! A thin wrapper around the `resolver_curator` library: argument parsing,
//! logger initialization, and user-facing output. All core functionality
//! lives in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use resolver_curator::initialization::init_logger_with;
use resolver_curator::{run_pipeline, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_pipeline(&config).await {
        Ok(report) => {
            println!(
                "{} reliable resolver{} ({} rejected, {} source{} reprocessed) in {:.1}s",
                report.reliable,
                if report.reliable == 1 { "" } else { "s" },
                report.unreliable,
                report.sources_processed,
                if report.sources_processed == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            println!(
                "Results saved in {} and {}",
                report.json_path.display(),
                report.flat_path.display()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("resolver_curator error: {:#}", e);
            process::exit(1);
        }
    }
}
