//! Integration tests for the `dlwatch` CLI binary.
//!
//! These cover argument parsing, help output, completions, the calculator
//! and config handling. Nothing here samples the network for long or
//! performs a power action.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `dlwatch` binary with env isolation.
///
/// Clears `DLWATCH_*` overrides and points config directories at
/// `home`, so tests never touch the user's real configuration.
fn dlwatch_cmd_in(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dlwatch");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("DLWATCH_OUTPUT")
        .env_remove("DLWATCH_DEFAULTS__OUTPUT")
        .env_remove("DLWATCH_CALCULATOR__SIZE_UNIT")
        .env_remove("DLWATCH_CALCULATOR__SPEED_UNIT")
        .env_remove("DLWATCH_MONITOR__THRESHOLD")
        .env_remove("DLWATCH_MONITOR__DURATION_SECS")
        .env_remove("DLWATCH_MONITOR__ACTION")
        .env_remove("DLWATCH_MONITOR__ADAPTER");
    cmd
}

fn dlwatch_cmd() -> assert_cmd::Command {
    dlwatch_cmd_in(std::path::Path::new("/tmp/dlwatch-cli-test-nonexistent"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = dlwatch_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    dlwatch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("calc")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("adapters")),
    );
}

#[test]
fn test_version_flag() {
    dlwatch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dlwatch"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    dlwatch_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    dlwatch_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Calculator ──────────────────────────────────────────────────────

#[test]
fn test_calc_plain_prints_duration_first() {
    dlwatch_cmd()
        .args(["calc", "1", "100", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1m 25s\n"));
}

#[test]
fn test_calc_json_has_report_fields() {
    let output = dlwatch_cmd()
        .args(["calc", "10", "5", "--size-unit", "mb", "--speed-unit", "mb/s", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["duration"], "0m 2s");
    assert_eq!(value["size_unit"], "mb");
    assert_eq!(value["speed_unit"], "mb/s");
    assert!(value["finish_time"].is_string());
}

#[test]
fn test_calc_zero_speed_prints_placeholder() {
    dlwatch_cmd()
        .args(["calc", "1", "0", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("...").and(predicate::str::contains("--:--")));
}

#[test]
fn test_calc_unknown_unit_is_usage_error() {
    let output = dlwatch_cmd()
        .args(["calc", "1", "100", "--size-unit", "parsec"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("parsec"), "Expected the bad unit echoed:\n{text}");
}

// ── Watch argument errors ───────────────────────────────────────────

#[test]
fn test_watch_without_threshold_is_rejected() {
    let output = dlwatch_cmd()
        .args(["watch", "--duration", "60", "--dry-run"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("threshold"), "Expected missing threshold:\n{text}");
}

#[test]
fn test_watch_unknown_action_is_rejected() {
    let output = dlwatch_cmd()
        .args(["watch", "-t", "10", "-d", "5m", "--action", "explode", "--dry-run"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_watch_bad_duration_is_rejected() {
    let output = dlwatch_cmd()
        .args(["watch", "-t", "10", "-d", "soon", "--dry-run"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_mentions_app_dir() {
    dlwatch_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dlwatch"));
}

#[test]
fn test_config_show_without_file_renders_defaults() {
    dlwatch_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[calculator]"));
}

#[test]
fn test_config_set_then_show() {
    let home = tempfile::tempdir().unwrap();

    dlwatch_cmd_in(home.path())
        .args(["config", "set", "monitor.threshold", "50"])
        .assert()
        .success();
    dlwatch_cmd_in(home.path())
        .args(["config", "set", "monitor.action", "sleep"])
        .assert()
        .success();

    let output = dlwatch_cmd_in(home.path())
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["monitor"]["threshold"], 50.0);
    assert_eq!(value["monitor"]["action"], "sleep");
}

#[test]
fn test_config_set_accepts_uppercase_units() {
    let home = tempfile::tempdir().unwrap();

    dlwatch_cmd_in(home.path())
        .args(["config", "set", "calculator.size_unit", "GB"])
        .assert()
        .success();
    dlwatch_cmd_in(home.path())
        .args(["config", "set", "monitor.action", "Shutdown"])
        .assert()
        .success();

    let output = dlwatch_cmd_in(home.path())
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["calculator"]["size_unit"], "gb");
    assert_eq!(value["monitor"]["action"], "shutdown");
}

#[test]
fn test_config_set_unknown_key_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = dlwatch_cmd_in(home.path())
        .args(["config", "set", "monitor.volume", "11"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("monitor.volume"), "Expected key echoed:\n{text}");
}

#[test]
fn test_broken_config_file_is_config_error() {
    let home = tempfile::tempdir().unwrap();

    let path_output = dlwatch_cmd_in(home.path())
        .args(["config", "path"])
        .output()
        .unwrap();
    let path = String::from_utf8_lossy(&path_output.stdout).trim().to_owned();
    let path = std::path::Path::new(&path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "[monitor]\nthreshold = \"lots\"\n").unwrap();

    let output = dlwatch_cmd_in(home.path())
        .args(["calc", "1", "1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}
