//! Output formatting for the CLI
//!
//! Structured output in JSON, YAML and a human-readable table with colored
//! status markers.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;

use string_spec::{DiagnosticEvent, ErrorCode, ValidationResult};

use crate::CliError;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

fn write_serialized<T: Serialize>(
    value: &T,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let text = if format == OutputFormat::Yaml {
        serde_yaml::to_string(value).map_err(|e| CliError::Output(e.to_string()))?
    } else {
        serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))?
    };
    writeln!(out, "{}", text.trim_end())?;
    Ok(())
}

/// Results of one `validate` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Id of the spec used
    pub spec_id: String,
    /// Number of values that passed
    pub valid_count: usize,
    /// Number of values that failed
    pub invalid_count: usize,
    /// One result per value, in argument order
    pub results: Vec<ValidationResult>,
    /// Events raised while building the spec
    pub diagnostics: Vec<DiagnosticEvent>,
}

impl ValidationReport {
    pub fn new(
        spec_id: impl Into<String>,
        results: Vec<ValidationResult>,
        diagnostics: Vec<DiagnosticEvent>,
    ) -> Self {
        let valid_count = results.iter().filter(|r| r.is_valid()).count();
        Self {
            spec_id: spec_id.into(),
            valid_count,
            invalid_count: results.len() - valid_count,
            results,
            diagnostics,
        }
    }

    pub fn all_valid(&self) -> bool {
        self.invalid_count == 0
    }

    /// Render the report in the given format
    pub fn render(&self, format: OutputFormat, out: &mut dyn Write) -> Result<(), CliError> {
        match format {
            OutputFormat::Table => self.render_table(out),
            other => write_serialized(self, other, out),
        }
    }

    fn render_table(&self, out: &mut dyn Write) -> Result<(), CliError> {
        writeln!(out)?;
        writeln!(out, "{}", "Validation Results".cyan().bold())?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out)?;

        if !self.diagnostics.is_empty() {
            writeln!(out, "{}", "Spec diagnostics:".cyan().bold())?;
            for event in &self.diagnostics {
                let field = event
                    .field
                    .as_deref()
                    .map(|f| format!(" ({})", f))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "  {} [{}] {}{}",
                    "!".yellow(),
                    event.code,
                    event.text,
                    field
                )?;
            }
            writeln!(out)?;
        }

        for result in &self.results {
            let value = result.value.as_str().unwrap_or_default();
            if result.is_valid() {
                writeln!(out, "  {} {:?}", "+".green(), value)?;
            } else {
                let found = match result.code {
                    ErrorCode::NotIncluded | ErrorCode::Excluded => {
                        let chars: String = result.found_chars().into_iter().collect();
                        format!(" {:?}", chars)
                    }
                    _ => String::new(),
                };
                writeln!(
                    out,
                    "  {} {:?}: [{}] {}{}",
                    "x".red(),
                    value,
                    result.code,
                    result.error,
                    found
                )?;
            }
        }

        writeln!(out)?;
        let summary = format!(
            "{} valid, {} invalid (spec '{}')",
            self.valid_count, self.invalid_count, self.spec_id
        );
        if self.all_valid() {
            writeln!(out, "{}", summary.green())?;
        } else {
            writeln!(out, "{}", summary.red())?;
        }
        Ok(())
    }
}

/// One row of the code table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRow {
    pub code: u8,
    pub kind: String,
    pub text: String,
}

/// The error code table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodesOutput {
    pub codes: Vec<CodeRow>,
}

impl CodesOutput {
    /// Every non-success code
    pub fn all() -> Self {
        let codes = ErrorCode::ALL
            .iter()
            .filter(|code| **code != ErrorCode::Ok)
            .map(|code| CodeRow {
                code: code.code(),
                kind: if code.is_configuration() {
                    "configuration".to_string()
                } else {
                    "validation".to_string()
                },
                text: code.text().to_string(),
            })
            .collect();
        Self { codes }
    }

    pub fn render(&self, format: OutputFormat, out: &mut dyn Write) -> Result<(), CliError> {
        match format {
            OutputFormat::Table => {
                writeln!(out, "{:<6}{:<16}{}", "CODE".bold(), "KIND".bold(), "TEXT".bold())?;
                for row in &self.codes {
                    writeln!(out, "{:<6}{:<16}{}", row.code, row.kind, row.text)?;
                }
                Ok(())
            }
            other => write_serialized(self, other, out),
        }
    }
}
