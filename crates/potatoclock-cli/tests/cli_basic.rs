//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME, so the
//! saved session and config never leak between tests.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command with `home` as HOME and return (stdout, stderr, code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_potatoclock"))
        .args(args)
        .env("HOME", home)
        .env_remove("POTATOCLOCK_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_task_add_toggle_and_list() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let added = run_json(home, &["--local", "task", "add", "Write report"]);
    assert_eq!(added["ok"], true);
    assert_eq!(added["task"]["text"], "Write report");
    let id = added["task"]["id"].as_str().unwrap().to_string();

    let toggled = run_json(home, &["--local", "task", "toggle", &id]);
    assert_eq!(toggled["task"]["done"], true);
    assert_eq!(toggled["progress"]["pct"], 100);

    let list = run_json(home, &["--local", "task", "list", "--json"]);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (stdout, _, code) = run_cli(home, &["--local", "task", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[x]"));
    assert!(stdout.contains("1/1 done (100%)"));
}

#[test]
fn test_timer_set_and_status() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let set = run_json(
        home,
        &["--local", "timer", "set", "--mode", "rest", "--minutes", "10"],
    );
    assert_eq!(set["timer"]["mode"], "rest");
    assert_eq!(set["timer"]["duration_sec"], 600);

    let started = run_json(home, &["--local", "timer", "start"]);
    assert_eq!(started["timer"]["running"], true);

    let paused = run_json(home, &["--local", "timer", "pause"]);
    assert_eq!(paused["timer"]["running"], false);

    let status = run_json(home, &["--local", "timer", "status", "--json"]);
    assert_eq!(status["mode"], "rest");
    assert_eq!(status["running"], false);
}

#[test]
fn test_invalid_duration_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["--local", "timer", "set", "--mode", "work", "--minutes", "0"],
    );
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_plant_before_ready_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["--local", "garden", "plant"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not ready"));

    let garden = run_json(home.path(), &["--local", "garden", "status"]);
    assert_eq!(garden["stage"], 1);
    assert_eq!(garden["flowers"].as_array().unwrap().len(), 0);
}

#[test]
fn test_rest_suggestion_only_in_rest_mode() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let (_, _, code) = run_cli(home, &["--local", "rest", "suggest"]);
    assert_eq!(code, 1);

    run_json(home, &["--local", "timer", "skip"]);
    let (stdout, _, code) = run_cli(home, &["--local", "rest", "suggest"]);
    assert_eq!(code, 0);
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_focus_unknown_task_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["--local", "focus", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_config_set_get_list() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let (stdout, _, code) = run_cli(home, &["config", "set", "timer.work_min", "45"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "timer.work_min = 45 (was 25)");
    let (stdout, _, _) = run_cli(home, &["config", "get", "timer.work_min"]);
    assert_eq!(stdout.trim(), "45");

    let (stdout, _, code) = run_cli(home, &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("timer.work_min = 45  (default 25)"));
    assert!(stdout.contains("timer.rest_min = 5\n"));

    let (_, _, code) = run_cli(home, &["config", "set", "timer.bogus", "1"]);
    assert_eq!(code, 1);

    // A fresh local session picks up the configured work length.
    let status = run_json(home, &["--local", "timer", "status", "--json"]);
    assert_eq!(status["duration_sec"], 45 * 60);
}

#[test]
fn test_config_reset_reports_path() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    run_cli(home, &["config", "set", "server.port", "9100"]);
    let (stdout, _, code) = run_cli(home, &["config", "reset"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("config reset to defaults: "));
    assert!(stdout.trim_end().ends_with("config.toml"));

    let (stdout, _, _) = run_cli(home, &["config", "get", "server.port"]);
    assert_eq!(stdout.trim(), "8000");
}

#[test]
fn test_unreachable_server_reports_error() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["--server", "http://127.0.0.1:9", "state"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_watch_rejects_zero_interval() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["--server", "http://127.0.0.1:9", "watch", "--count", "1", "--interval-ms", "0"],
    );
    assert_eq!(code, 2);
    assert!(stderr.contains("--interval-ms"));
    assert!(!stderr.contains("panicked"));
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("potatoclock"));
}
