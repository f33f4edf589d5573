//! Integration tests for the CLI commands
//!
//! Spec files are written to temporary files and commands are run through
//! the same dispatch the binary uses, with output captured in memory.

use clap::Parser;
use std::io::Write;
use string_spec_cli::{commands, CliError, ExitCode, SpecCli};
use tempfile::NamedTempFile;

/// Helper to write a spec file with the given extension
fn spec_file(extension: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn run(args: &[&str]) -> (Result<ExitCode, CliError>, String) {
    let cli = SpecCli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let result = commands::run(cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_validate_json_output() {
    let file = spec_file(".toml", "id = \"username\"\nmin = 3\nmax = 8\nexclude = \" \"\n");
    let path = file.path().to_str().unwrap();

    let (result, out) = run(&[
        "string-spec", "validate", "--spec", path, "--format", "json", "alice", "bob smith", "al",
    ]);
    assert_eq!(result.unwrap(), ExitCode::ValidationFailed);

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["spec_id"], "username");
    assert_eq!(json["valid_count"], 1);
    assert_eq!(json["invalid_count"], 2);
    assert_eq!(json["results"][1]["code"], 23);
    assert_eq!(json["results"][2]["code"], 24);
    assert_eq!(json["diagnostics"].as_array().unwrap().len(), 0);
}

#[test]
fn test_validate_reports_spec_diagnostics() {
    let file = spec_file(".json", r##"{"id": "tag", "include": "#", "regexp": "^#", "colour": 1}"##);
    let path = file.path().to_str().unwrap();

    let (result, out) = run(&["string-spec", "validate", "-s", path, "--format", "json", "#rust"]);
    assert_eq!(result.unwrap(), ExitCode::Success);

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    let codes: Vec<u64> = json["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["code"].as_u64().unwrap())
        .collect();
    assert_eq!(codes, vec![11, 12]);
    assert_eq!(json["diagnostics"][0]["field"], "colour");
    assert_eq!(json["diagnostics"][0]["method"], "constructor");
}

#[test]
fn test_validate_yaml_with_metrics() {
    let file = spec_file(".yaml", "id: code\nmax: 2\n");
    let path = file.path().to_str().unwrap();

    let (result, out) = run(&["string-spec", "validate", "-s", path, "--metrics", "ab", "abc"]);
    assert_eq!(result.unwrap(), ExitCode::ValidationFailed);
    assert!(out.contains("string_spec_validations_total{code=\"23\"} 1"));
    assert!(out.contains("string_spec_validations_total{code=\"0\"} 1"));
}

#[test]
fn test_quiet_suppresses_output() {
    let file = spec_file(".toml", "max = 1\n");
    let path = file.path().to_str().unwrap();

    let (result, out) = run(&["string-spec", "-q", "validate", "-s", path, "ab"]);
    assert_eq!(result.unwrap(), ExitCode::ValidationFailed);
    assert!(out.is_empty());
}

#[test]
fn test_coerce_command() {
    let file = spec_file(".toml", "min = 3\nexclude = \" \"\n");
    let path = file.path().to_str().unwrap();

    let (result, out) = run(&[
        "string-spec", "coerce", "-s", path, "--fallback", "anonymous", "alice", "bob smith", "al",
    ]);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert_eq!(out, "alice\nanonymous\nanonymous\n");
}

#[test]
fn test_codes_command() {
    let (result, out) = run(&["string-spec", "codes", "--format", "json"]);
    assert_eq!(result.unwrap(), ExitCode::Success);

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    let codes = json["codes"].as_array().unwrap();
    assert_eq!(codes.len(), 12);
    assert_eq!(codes[4]["code"], 21);
    assert_eq!(codes[4]["text"], "found not included character(s)");
}

#[test]
fn test_malformed_spec_file() {
    let file = spec_file(".json", "{ not json");
    let path = file.path().to_str().unwrap();

    let (result, _) = run(&["string-spec", "validate", "-s", path, "x"]);
    let err = result.unwrap_err();
    assert!(err.is_user_error());
    assert!(err.to_string().contains("JSON error"));
}
