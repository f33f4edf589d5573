//! CLI command definitions
//!
//! Clap-based commands for validating and coercing values and for listing
//! the error code table.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use string_spec::{DiagnosticEvent, Diagnostics, SpecConfig, SpecMetrics, StringSpec};

use crate::output::{CodesOutput, OutputFormat, ValidationReport};
use crate::{CliError, ExitCode};

/// String Spec CLI
///
/// Check strings against a declarative spec file.
#[derive(Parser, Debug)]
#[command(name = "string-spec")]
#[command(about = "Validate strings against declarative string specs", long_about = None)]
#[command(version)]
pub struct SpecCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: SpecCommands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum SpecCommands {
    /// Validate values against a spec
    ///
    /// Exits with 0 when every value passes and 1 otherwise.
    Validate {
        /// Path to the spec file (.json, .toml, .yaml or .yml)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output format for results
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Append Prometheus counters to the output
        #[arg(long)]
        metrics: bool,

        /// Values to validate
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Print each value, or the fallback when it fails validation
    Coerce {
        /// Path to the spec file (.json, .toml, .yaml or .yml)
        #[arg(short, long)]
        spec: PathBuf,

        /// Replacement for invalid values
        #[arg(short, long, default_value = "")]
        fallback: String,

        /// Values to coerce
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Print the error code table
    Codes {
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Dispatch a parsed command, writing results to `out`
pub fn run(cli: SpecCli, out: &mut dyn Write) -> Result<ExitCode, CliError> {
    let quiet = cli.quiet;
    match cli.command {
        SpecCommands::Validate {
            spec,
            format,
            metrics,
            values,
        } => execute_validate(&spec, format, metrics, &values, quiet, out),
        SpecCommands::Coerce {
            spec,
            fallback,
            values,
        } => execute_coerce(&spec, &fallback, &values, quiet, out),
        SpecCommands::Codes { format } => {
            CodesOutput::all().render(format, out)?;
            Ok(ExitCode::Success)
        }
    }
}

/// Execute the validate command
pub fn execute_validate(
    spec_path: &Path,
    format: OutputFormat,
    with_metrics: bool,
    values: &[String],
    quiet: bool,
    out: &mut dyn Write,
) -> Result<ExitCode, CliError> {
    let config = load_spec_config(spec_path)?;

    let diagnostics = Diagnostics::new();
    let captured = capture_events(&diagnostics);
    let metrics = if with_metrics {
        let metrics = SpecMetrics::new()?;
        let _observer = metrics.observe(&diagnostics);
        Some(metrics)
    } else {
        None
    };

    let spec = StringSpec::with_diagnostics(config, &diagnostics);
    let results: Vec<_> = values.iter().map(|v| spec.validate_str(v)).collect();
    if let Some(metrics) = &metrics {
        results.iter().for_each(|r| metrics.record(r));
    }

    let diagnostics = take_events(&captured);
    let report = ValidationReport::new(spec.id(), results, diagnostics);
    let all_valid = report.all_valid();
    tracing::info!(
        spec = %spec_path.display(),
        values = values.len(),
        invalid = report.invalid_count,
        "validation finished"
    );

    if !quiet {
        report.render(format, out)?;
        if let Some(metrics) = &metrics {
            write!(out, "{}", metrics.gather_text()?)?;
        }
    }

    Ok(ExitCode::from_validation(all_valid))
}

/// Execute the coerce command
pub fn execute_coerce(
    spec_path: &Path,
    fallback: &str,
    values: &[String],
    quiet: bool,
    out: &mut dyn Write,
) -> Result<ExitCode, CliError> {
    let config = load_spec_config(spec_path)?;
    let diagnostics = Diagnostics::new();
    let captured = capture_events(&diagnostics);
    let spec = StringSpec::with_diagnostics(config, &diagnostics);

    // Coerced values own stdout, so spec problems go to stderr
    let events = take_events(&captured);
    if !quiet {
        report_diagnostics(&events, &mut std::io::stderr().lock())?;
    }

    for value in values {
        writeln!(out, "{}", spec.coerce(value.as_str(), fallback))?;
    }

    Ok(ExitCode::Success)
}

/// Write one warning line per diagnostic event
pub fn report_diagnostics(events: &[DiagnosticEvent], err: &mut dyn Write) -> Result<(), CliError> {
    for event in events {
        writeln!(err, "warning: {}", event)?;
    }
    Ok(())
}

fn capture_events(diagnostics: &Diagnostics) -> Arc<Mutex<Vec<DiagnosticEvent>>> {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    // Never cancelled; the channel is dropped with the command
    let _capture = diagnostics.subscribe(move |event| {
        sink.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    });
    captured
}

fn take_events(captured: &Mutex<Vec<DiagnosticEvent>>) -> Vec<DiagnosticEvent> {
    std::mem::take(&mut *captured.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
}

/// Load a spec configuration, choosing the parser by file extension
pub fn load_spec_config(path: &Path) -> Result<SpecConfig, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::FileError(format!(
            "Failed to read spec file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let config = match extension.as_str() {
        "json" => SpecConfig::from_json_str(&content)?,
        "toml" => SpecConfig::from_toml_str(&content)?,
        "yaml" | "yml" => SpecConfig::from_yaml_str(&content)?,
        other => {
            return Err(CliError::InvalidInput(format!(
                "Unsupported spec file extension: '{}'",
                other
            )))
        }
    };
    tracing::debug!(path = %path.display(), keys = config.len(), "spec configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate_command() {
        let cli = SpecCli::try_parse_from([
            "string-spec",
            "validate",
            "--spec",
            "s.toml",
            "--format",
            "json",
            "a",
            "b",
        ])
        .unwrap();
        match cli.command {
            SpecCommands::Validate {
                spec,
                format,
                metrics,
                values,
            } => {
                assert_eq!(spec, PathBuf::from("s.toml"));
                assert_eq!(format, OutputFormat::Json);
                assert!(!metrics);
                assert_eq!(values, vec!["a", "b"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validate_requires_values() {
        assert!(SpecCli::try_parse_from(["string-spec", "validate", "--spec", "s.toml"]).is_err());
    }

    #[test]
    fn test_coerce_fallback_defaults_to_empty() {
        let cli = SpecCli::try_parse_from(["string-spec", "coerce", "-s", "s.json", "x"]).unwrap();
        assert!(matches!(
            cli.command,
            SpecCommands::Coerce { ref fallback, .. } if fallback.is_empty()
        ));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        std::fs::write(file.path(), "id = x").unwrap();
        let err = load_spec_config(file.path()).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }

    #[test]
    fn test_coerce_captures_spec_diagnostics() {
        let diagnostics = Diagnostics::new();
        let captured = capture_events(&diagnostics);
        StringSpec::with_diagnostics(
            SpecConfig::new().with("id", "nick").with("colour", "red").with("min", "2"),
            &diagnostics,
        );
        let events = take_events(&captured);
        assert_eq!(events.len(), 2);

        let mut buffer = Vec::new();
        report_diagnostics(&events, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("warning: [11]"));
        assert!(lines[0].ends_with("(colour)"));
        assert!(lines[1].starts_with("warning: [14]"));
        assert!(lines[1].ends_with("(min)"));
    }

    #[test]
    fn test_coerce_output_stays_clean_with_bad_spec() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::fs::write(file.path(), r#"{"max": 3, "colour": "red"}"#).unwrap();
        let mut out = Vec::new();
        let code = execute_coerce(
            file.path(),
            "fb",
            &["abc".to_string(), "abcd".to_string()],
            true,
            &mut out,
        )
        .unwrap();
        assert_eq!(code, ExitCode::Success);
        assert_eq!(String::from_utf8(out).unwrap(), "abc\nfb\n");
    }

    #[test]
    fn test_missing_file() {
        let err = load_spec_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CliError::FileError(_)));
    }
}
