//! Integration tests for task reports via CLI.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_pending_report() {
    let env = TestEnv::as_admin();
    env.create_task("Replace cables", &["-p", "3", "-c", "Infra"]);
    env.create_task("Order paper", &["-p", "1"]);

    let result = env.json(&["report", "pending"]);
    assert_eq!(result["kind"], "pending");
    assert_eq!(result["tasks"], 2);
    assert_eq!(result["opened"], false);

    let path = result["path"].as_str().unwrap();
    assert!(path.contains("report_pending_"));
    let body = fs::read_to_string(path).unwrap();
    assert!(body.starts_with("# Pending Tasks Report"));
    assert!(body.find("Replace cables").unwrap() < body.find("Order paper").unwrap());
}

#[test]
fn test_completed_report_lists_completer() {
    let env = TestEnv::as_admin();
    env.create_task("Patch server", &[]);
    env.agenda().args(["task", "complete", "1"]).assert().success();

    let result = env.json(&["report", "completed"]);
    let body = fs::read_to_string(result["path"].as_str().unwrap()).unwrap();
    assert!(body.contains("| 1 | Patch server |"));
    assert!(body.contains("| admin |"));
}

#[test]
fn test_empty_report_is_refused() {
    let env = TestEnv::as_admin();
    env.agenda()
        .args(["report", "completed", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no completed tasks"));

    assert_eq!(fs::read_dir(env.reports_dir()).unwrap().count(), 0);
}

#[test]
fn test_invalid_report_kind() {
    let env = TestEnv::as_admin();
    env.agenda()
        .args(["report", "everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected pending or completed"));
}
