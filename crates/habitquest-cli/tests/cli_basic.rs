//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary home
//! directory, so the config file and database start empty.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_habitquest"))
        .args(args)
        .env("HOME", home)
        .env_remove("HABITQUEST_ENV")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    stdout
}

fn onboard(home: &Path) {
    run_ok(home, &["setup", "goals", "Run", "Read", "Code", "Cook", "Save"]);
    run_ok(home, &["setup", "select", "Run", "Code"]);
    for g in 0..2 {
        for h in 0..3 {
            let (g, h) = (g.to_string(), h.to_string());
            run_ok(home, &["setup", "habit", &g, &h, &format!("habit {g}.{h}")]);
        }
    }
    let out = run_ok(home, &["setup", "finish"]);
    assert!(out.contains("Achievement unlocked: Quest Giver"));
}

#[test]
fn test_fresh_profile_starts_at_goals() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(home.path(), &["setup", "status"]);
    assert!(out.contains("Stage: goals"));
}

#[test]
fn test_full_onboarding_and_tracking() {
    let home = tempfile::tempdir().unwrap();
    onboard(home.path());

    for key in ["0-0", "0-1", "0-2", "1-0"] {
        run_ok(home.path(), &["habit", "toggle", key]);
    }
    let out = run_ok(home.path(), &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["stage"], "dashboard");
    assert_eq!(stats["experience"], 100);
    assert_eq!(stats["level"], 2);
    assert_eq!(stats["streak"], 1);
    assert_eq!(stats["completionPercentageToday"], 67);

    let out = run_ok(home.path(), &["habit", "list"]);
    assert!(out.contains("[x] 0-0"));
    assert!(out.contains("[ ] 1-1"));
}

#[test]
fn test_toggle_twice_restores_total() {
    let home = tempfile::tempdir().unwrap();
    onboard(home.path());
    run_ok(home.path(), &["habit", "toggle", "1-2"]);
    run_ok(home.path(), &["habit", "toggle", "1-2"]);
    let out = run_ok(home.path(), &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["totalCompleted"], 0);
}

#[test]
fn test_duplicate_goals_are_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["setup", "goals", "A", "A", "B", "C", "D"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unique"), "unexpected stderr: {stderr}");
    let out = run_ok(home.path(), &["setup", "status"]);
    assert!(out.contains("Stage: goals"));
}

#[test]
fn test_toggle_before_setup_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["habit", "toggle", "0-0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not permitted"), "unexpected stderr: {stderr}");
}

#[test]
fn test_edit_unlocks_editor_achievements() {
    let home = tempfile::tempdir().unwrap();
    onboard(home.path());
    run_ok(home.path(), &["edit", "habit", "0", "0", "sprint"]);
    run_ok(home.path(), &["edit", "goal", "1", "Ship"]);

    let out = run_ok(home.path(), &["achievements", "--json", "--unlocked"]);
    let views: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    let ids: Vec<&str> = views.iter().filter_map(|v| v["id"].as_str()).collect();
    assert!(ids.contains(&"goalEditor"));
    assert!(ids.contains(&"habitEditor"));
    assert!(ids.contains(&"hidden4"));
}

#[test]
fn test_hidden_achievements_are_masked() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(home.path(), &["achievements", "--json"]);
    let views: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(views.len(), 28);
    let hidden: Vec<_> = views.iter().filter(|v| v["hidden"] == true).collect();
    assert_eq!(hidden.len(), 4);
    assert!(hidden.iter().all(|v| v["name"] == "???"));
}

#[test]
fn test_activity_heatmap_json_has_35_cells() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(home.path(), &["activity", "heatmap", "--json"]);
    let cells: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(cells.len(), 35);
    assert_eq!(cells.iter().filter(|c| c["is_today"] == true).count(), 1);
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(home.path(), &["config", "get", "sync.debounce_ms"]).trim(), "1500");
    run_ok(home.path(), &["config", "set", "sync.debounce_ms", "300"]);
    assert_eq!(run_ok(home.path(), &["config", "get", "sync.debounce_ms"]).trim(), "300");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "sync.bogus", "1"]);
    assert_ne!(code, 0);
    let (_, _, code) = run_cli(home.path(), &["config", "set", "reset.enabled", "maybe"]);
    assert_ne!(code, 0);

    run_ok(home.path(), &["config", "reset"]);
    assert_eq!(run_ok(home.path(), &["config", "get", "sync.debounce_ms"]).trim(), "1500");
}
