//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const EXPORT: &str = "\
Issue key,Summary,Issue Type,Status,Team,Studio,Sprint,Sprint,Custom field (Epic Link),Custom field (Story Points),Assignee
EP-1,Checkout revamp,Epic,In Progress,Triton,,Triton 2025-3,,,,
TRI-1,Cart totals,Story,Open,Triton,,Triton 2025-3,Triton 2025-4,EP-1,3,Ana
TRI-2,Coupon field,Story,Open,Triton,,,,EP-1,2,Ana
TRI-3,Refund flow,Task,Open,1039,,Triton 2025-4,,,1,Bo
KRA-1,Search,Story,Open,,Kraken,Kraken 2025-4,,,5,
ORPH-1,,Story,Open,Triton,,,,,,
";

fn sprint_board() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sprint-board"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn workspace() -> TempDir {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("export.csv"), EXPORT).expect("write csv");
    tmp
}

#[test]
fn test_cli_version() {
    let mut cmd = sprint_board();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("sprint-board"));
}

#[test]
fn test_cli_help() {
    let mut cmd = sprint_board();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("layout"))
        .stdout(predicate::str::contains("reconcile"))
        .stdout(predicate::str::contains("sprints"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_layout_requires_sprint_resolution() {
    let tmp = workspace();
    let mut cmd = sprint_board();
    cmd.current_dir(tmp.path()).args(["layout", "--input", "export.csv"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("sprint_resolution must be set"));
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_layout_rejects_invalid_sprint_resolution() {
    let tmp = workspace();
    let mut cmd = sprint_board();
    cmd.current_dir(tmp.path())
        .args(["layout", "--input", "export.csv", "--sprint-resolution", "newest"]);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid sprint resolution"));
}

#[test]
fn test_layout_writes_placements_and_report() {
    let tmp = workspace();
    let mut cmd = sprint_board();
    cmd.current_dir(tmp.path()).args([
        "layout",
        "--input",
        "export.csv",
        "--sprint-resolution",
        "first",
        "--no-timestamp",
        "--no-progress",
    ]);
    cmd.assert().success().stdout(predicate::str::contains("Layout complete!"));

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(tmp.path().join("out/report.json")).expect("report"),
    )
    .expect("json");
    assert!(report.get("generated_at").is_none());
    assert_eq!(report["stats"]["records_total"], 6);
    assert_eq!(report["stats"]["records_skipped"]["untitled"], 1);
    assert_eq!(report["stats"]["epic_records"], 1);
    assert_eq!(report["stats"]["defaulted"]["team_numeric_ignored"], 1);
    assert_eq!(report["layout"]["teams"], 2);
    assert_eq!(report["layout"]["backlog_tickets_suppressed"], 1);
    assert_eq!(report["config"]["sprint_resolution"], "first");

    let placements = fs::read_to_string(tmp.path().join("out/placements.jsonl")).expect("jsonl");
    let lines: Vec<serde_json::Value> =
        placements.lines().map(|l| serde_json::from_str(l).expect("line")).collect();
    let card = |key: &str| {
        lines
            .iter()
            .find(|p| p["role"] == "card" && p["issue_key"] == key)
            .unwrap_or_else(|| panic!("no card for {key}"))
    };
    assert_eq!(card("TRI-1")["sprint_key"], "2025-3");
    // Numeric team id is ignored in favour of the sprint label's team.
    assert_eq!(card("TRI-3")["team_name"], "Triton");
    assert_eq!(card("KRA-1")["team_name"], "Kraken");
    // Backlog ticket of a scheduled epic is not placed.
    assert!(!lines.iter().any(|p| p["issue_key"] == "TRI-2"));
}

#[test]
fn test_layout_latest_resolution_from_config_file() {
    let tmp = workspace();
    fs::write(tmp.path().join("sprint-board.toml"), "sprint_resolution = 'latest'\n")
        .expect("write config");
    let mut cmd = sprint_board();
    cmd.current_dir(tmp.path()).args(["layout", "-i", "export.csv", "-o", "board", "--no-progress"]);
    cmd.assert().success();

    let placements = fs::read_to_string(tmp.path().join("board/placements.jsonl")).expect("jsonl");
    let tri1 = placements
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).expect("line"))
        .find(|p| p["role"] == "card" && p["issue_key"] == "TRI-1")
        .expect("TRI-1");
    assert_eq!(tri1["sprint_key"], "2025-4");
}

#[test]
fn test_explicit_broken_config_fails() {
    let tmp = workspace();
    fs::write(tmp.path().join("broken.toml"), "max_cards_per_column = 'lots'\n").expect("write");
    let mut cmd = sprint_board();
    cmd.current_dir(tmp.path()).args([
        "layout",
        "--input",
        "export.csv",
        "--config",
        "broken.toml",
        "--sprint-resolution",
        "first",
    ]);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid TOML config"));
}

#[test]
fn test_reconcile_demotes_duplicates() {
    let tmp = TempDir::new().expect("tmp");
    let snapshot = serde_json::json!({
        "elements": [
            {"id": "h1", "x": 0, "y": 0, "width": 500, "height": 60, "text": "Triton 2025-3",
             "meta": {"team": "Triton", "role": "sprint_header"}},
            {"id": "s0", "x": -11, "y": 0, "width": 2, "height": 600},
            {"id": "s1", "x": 509, "y": 0, "width": 2, "height": 600},
            {"id": "a", "x": 0, "y": 100, "width": 240, "height": 160,
             "text": "[TRI-1](https://jira.example.com/browse/TRI-1) Cart totals",
             "meta": {"issue_key": "TRI-1", "team": "Triton", "has_reference_link": true}},
            {"id": "b", "x": 260, "y": 100, "width": 240, "height": 160,
             "text": "[TRI-1](https://jira.example.com/browse/TRI-1) Cart totals",
             "meta": {"issue_key": "TRI-1", "team": "Triton", "has_reference_link": true}}
        ]
    });
    fs::write(tmp.path().join("snapshot.json"), snapshot.to_string()).expect("write");

    let mut cmd = sprint_board();
    cmd.current_dir(tmp.path())
        .args(["reconcile", "--snapshot", "snapshot.json", "--export-csv", "--no-timestamp"]);
    cmd.assert().success().stdout(predicate::str::contains("Reconcile complete!"));

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(tmp.path().join("out/reconcile.json")).expect("report"),
    )
    .expect("json");
    assert_eq!(report["duplicates"][0]["canonical"], "a");
    let mutations = report["mutations"].as_array().expect("mutations");
    assert_eq!(mutations.len(), 3);
    assert!(mutations.iter().all(|m| m["element_id"] == "b"));
    assert_eq!(mutations[2]["op"], "replace_title");
    assert_eq!(mutations[2]["title"], "TRI-1 Cart totals");

    let export = fs::read_to_string(tmp.path().join("out/export.csv")).expect("export");
    assert!(export.contains("a,TRI-1,Triton,2025-3,"));
    assert!(export.contains("b,TRI-1,Triton,2025-3,a"));
}

#[test]
fn test_reconcile_rejects_bad_snapshot() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("snapshot.json"), "{\"elements\": 3}").expect("write");
    let mut cmd = sprint_board();
    cmd.current_dir(tmp.path()).args(["reconcile", "--snapshot", "snapshot.json"]);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid geometry snapshot"));
}

#[test]
fn test_sprints_roll_over_year() {
    let mut cmd = sprint_board();
    cmd.args(["sprints", "--from", "2025-24", "--count", "3"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2025-25\t"))
        .stdout(predicate::str::contains("2026-1\t2026-01-07 - 2026-01-20"))
        .stdout(predicate::str::contains("2026-2\t"));
}

#[test]
fn test_sprints_rejects_malformed_key() {
    let mut cmd = sprint_board();
    cmd.args(["sprints", "--from", "Sprint 5"]);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid sprint key"));
}

#[test]
fn test_info_lists_teams() {
    let tmp = workspace();
    let mut cmd = sprint_board();
    cmd.current_dir(tmp.path())
        .args(["info", "--input", "export.csv", "--sprint-resolution", "first"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Kraken (1 tickets)"))
        .stdout(predicate::str::contains("Triton (3 tickets)"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = sprint_board();
    cmd.args(["completions", "bash"]);
    cmd.assert().success().stdout(predicate::str::contains("sprint-board"));
}
