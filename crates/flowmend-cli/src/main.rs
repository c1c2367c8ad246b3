#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;

use std::process;

use clap::Parser;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "flowmend_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "flowmend_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "flowmend_cli::command";

fn main() {
    let cli = Cli::parse();
    cli.logging.init_tracing();

    match run(&cli) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(error) => {
            if tracing::enabled!(tracing::Level::ERROR) {
                tracing::error!(
                    target: TRACING_TARGET_COMMAND,
                    error = %error,
                    "command failed"
                );
            } else {
                eprintln!("Error: {error:#}");
            }
            process::exit(2);
        }
    }
}

/// Runs the selected command, returning whether its outcome was positive.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    cli.log();
    command::execute(&cli.command)
}
