//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `stack_fingerprint` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Printing the analyze response as JSON on stdout
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use stack_fingerprint::config::Opt;
use stack_fingerprint::initialization::init_logger_with;
use stack_fingerprint::{run_analysis, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::from(Opt::parse());

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let pretty = config.pretty;
    match run_analysis(config).await {
        Ok(response) => {
            let json = if pretty {
                serde_json::to_string_pretty(&response)
            } else {
                serde_json::to_string(&response)
            }
            .context("Failed to serialize analyze response")?;
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            eprintln!("stack_fingerprint error: {:#}", e);
            process::exit(1);
        }
    }
}
