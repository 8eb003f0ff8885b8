//! Basic CLI E2E tests.
//!
//! Each test runs the `evergain` binary with HOME pointed at a temporary
//! directory and the API pointed at a closed port, so no backend is needed.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_evergain"))
        .args(args)
        .env("HOME", home)
        .env_remove("EVERGAIN_ENV")
        .env("EVERGAIN_API_URL", "http://127.0.0.1:1/api")
        .env("EVERGAIN_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(home.path(), &["--help"]);
    for cmd in ["session", "set", "rest", "exercises", "history", "auth", "config", "logger"] {
        assert!(out.contains(cmd), "help is missing '{cmd}'");
    }
}

#[test]
fn test_config_defaults() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(home.path(), &["config", "get", "api.base_url"]);
    assert_eq!(out.trim(), "http://localhost:8080/api");
    let out = run_cli_success(home.path(), &["config", "get", "rest.default_secs"]);
    assert_eq!(out.trim(), "90");
    assert!(home.path().join(".config/evergain/config.toml").exists());
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();
    run_cli_success(home.path(), &["config", "set", "rest.default_secs", "120"]);
    let out = run_cli_success(home.path(), &["config", "get", "rest.default_secs"]);
    assert_eq!(out.trim(), "120");

    let list = run_cli_success(home.path(), &["config", "list"]);
    let parsed: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(parsed["rest"]["default_secs"], 120);
}

#[test]
fn test_config_rejects_bad_values() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "rest.default_secs", "soon"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "api.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_rest_presets() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(home.path(), &["rest", "presets"]);
    let presets: Vec<u32> = serde_json::from_str(&out).unwrap();
    assert_eq!(presets, vec![60, 90, 120, 180, 240, 300]);
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(home.path(), &["completions", "bash"]);
    assert!(out.contains("evergain"));
}

#[test]
fn test_unreachable_backend_reports_alert() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["session", "status"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Failed to check active session"), "{stderr}");

    let (_, stderr, code) = run_cli(home.path(), &["history", "list"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Failed to load history"), "{stderr}");
}
