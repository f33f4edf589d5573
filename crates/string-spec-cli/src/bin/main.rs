//! String Spec CLI
//!
//! # Usage
//!
//! ```bash
//! string-spec validate --spec username.toml alice "bob smith"
//! string-spec coerce --spec username.yaml --fallback anonymous "bob smith"
//! string-spec codes
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success - every value passed
//! - 1: At least one value failed validation
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 10: Internal error

use clap::Parser;
use string_spec_cli::{run_cli, SpecCli};

fn main() {
    let cli = SpecCli::parse();

    let level = if cli.quiet {
        tracing::Level::ERROR
    } else {
        match cli.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
