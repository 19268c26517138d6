//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a scratch directory,
//! so each test gets its own database and config.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_interval-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("INTERVAL_ENV")
        .env_remove("INTERVAL_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_segment_add_and_list() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["segment", "add", "Warm Up", "1m"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Segment added: 1"));
    assert!(stdout.contains("00h 01m 00s"));

    run_cli(home.path(), &["segment", "add", "Sprint", "00:30"]);
    let (code, stdout, _) = run_cli(home.path(), &["segment", "list", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Warm Up");
    assert_eq!(items[0]["duration_secs"], 60);
    assert_eq!(items[1]["id"], 2);
    assert_eq!(items[1]["duration_secs"], 30);
}

#[test]
fn test_segment_remove_and_clear() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["segment", "add", "A", "10"]);
    run_cli(home.path(), &["segment", "add", "B", "10"]);

    let (code, stdout, _) = run_cli(home.path(), &["segment", "remove", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Segment removed: 1"));

    let (code, stdout, _) = run_cli(home.path(), &["segment", "remove", "99"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No segment with id 99"));

    run_cli(home.path(), &["segment", "clear"]);
    let (_, stdout, _) = run_cli(home.path(), &["segment", "list"]);
    assert!(stdout.contains("No segments."));
}

#[test]
fn test_invalid_duration_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["segment", "add", "Bad", "ten"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid duration"));
}

#[test]
fn test_repeat_toggle() {
    let home = tempfile::tempdir().unwrap();
    let (_, stdout, _) = run_cli(home.path(), &["repeat", "status"]);
    assert!(stdout.contains("repeat: off"));
    let (_, stdout, _) = run_cli(home.path(), &["repeat", "toggle"]);
    assert!(stdout.contains("repeat: on"));
    let (_, stdout, _) = run_cli(home.path(), &["repeat", "status"]);
    assert!(stdout.contains("repeat: on"));
}

#[test]
fn test_locate_json() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["segment", "add", "Work", "10"]);
    run_cli(home.path(), &["segment", "add", "Rest", "20"]);

    let (code, stdout, _) = run_cli(home.path(), &["locate", "31", "--repeat", "true", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["segment_index"], 0);
    assert_eq!(parsed["remaining_secs"], 9);

    let (_, stdout, _) = run_cli(home.path(), &["locate", "30", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["segment_name"], "Rest");
    assert_eq!(parsed["boundary"], true);

    let (_, stdout, _) = run_cli(home.path(), &["locate", "31", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["type"], "finished");
}

#[test]
fn test_run_without_segments_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["run"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no segments"));
}

#[test]
fn test_run_plays_sequence_to_the_end() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["config", "set", "notifications.enabled", "false"]);
    run_cli(home.path(), &["segment", "add", "Blink", "1"]);

    let (code, stdout, stderr) = run_cli(home.path(), &["run", "--json"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(lines
        .iter()
        .any(|l| l["state"] == "running" && l["segment_name"] == "Blink"));
    let crossed = lines
        .iter()
        .find(|l| l["type"] == "BoundaryCrossed")
        .expect("no crossing reported");
    assert_eq!(crossed["elapsed_secs"], 1);
    let last = lines.last().unwrap();
    assert_eq!(last["type"], "SequenceFinished");
    assert_eq!(last["total_secs"], 1);
}

#[test]
fn test_run_follows_segments_added_by_another_process() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["config", "set", "notifications.enabled", "false"]);
    run_cli(home.path(), &["segment", "add", "Work", "3"]);

    let player = Command::new(env!("CARGO_BIN_EXE_interval-cli"))
        .arg("run")
        .env("HOME", home.path())
        .env_remove("INTERVAL_ENV")
        .env_remove("INTERVAL_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn run");

    std::thread::sleep(Duration::from_millis(1500));
    let (code, _, _) = run_cli(home.path(), &["segment", "add", "Rest", "1"]);
    assert_eq!(code, 0);

    let output = player.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Rest [2/2]"), "stdout: {stdout}");
    assert!(stdout.contains("Sequence finished (00h 00m 04s)"));
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "notifications.vibration_ms"]);
    assert_eq!(stdout.trim(), "500");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "notifications.bell", "false"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "notifications.bell"]);
    assert_eq!(stdout.trim(), "false");

    let (code, _, _) = run_cli(home.path(), &["config", "get", "nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_default_repeat_seeds_store() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["config", "set", "timer.default_repeat", "true"]);
    let (_, stdout, _) = run_cli(home.path(), &["repeat", "status"]);
    assert!(stdout.contains("repeat: on"));
}
