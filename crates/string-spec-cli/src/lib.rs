//! String Spec CLI
//!
//! Validate and coerce strings against a spec described in a JSON, TOML or
//! YAML file.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Validate values against a spec
//! string-spec validate --spec username.toml alice "bob smith"
//!
//! # Replace invalid values with a fallback
//! string-spec coerce --spec username.toml --fallback anonymous alice "bob smith"
//!
//! # Print the error code table
//! string-spec codes --format json
//! ```

pub mod commands;
pub mod output;

pub use commands::{SpecCli, SpecCommands};
pub use output::OutputFormat;

use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Spec file missing or unreadable
    #[error("File error: {0}")]
    FileError(String),

    /// Spec file or library failure
    #[error(transparent)]
    Spec(#[from] string_spec::SpecError),

    /// Output could not be written
    #[error("Output error: {0}")]
    Output(String),
}

impl CliError {
    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        match self {
            CliError::InvalidInput(_) | CliError::FileError(_) => true,
            CliError::Spec(err) => err.is_user_error(),
            CliError::Output(_) => false,
        }
    }

    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::FileError(_) => ExitCode::FileError,
            CliError::Spec(string_spec::SpecError::Io(_)) => ExitCode::FileError,
            _ if self.is_user_error() => ExitCode::InvalidInput,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every value passed
    Success = 0,
    /// At least one value failed validation
    ValidationFailed = 1,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Exit code for a batch of validation outcomes
    pub fn from_validation(all_valid: bool) -> Self {
        if all_valid {
            ExitCode::Success
        } else {
            ExitCode::ValidationFailed
        }
    }
}

/// Run the CLI, writing results to stdout
pub fn run_cli(cli: SpecCli) -> ExitCode {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match commands::run(cli, &mut out) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}
