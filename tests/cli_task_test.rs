//! Integration tests for task commands via CLI.
//!
//! These tests verify:
//! - `agenda task create/list/show/edit/complete/reopen/delete` all work
//! - ownership and administrator rules are enforced
//! - the tasks file keeps the documented on-disk shape

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

fn operators() -> TestEnv {
    let env = TestEnv::as_admin();
    env.add_user("ana", "pw-ana", "operator");
    env.add_user("bruno", "pw-bruno", "operator");
    env
}

// === Create ===

#[test]
fn test_task_create_json() {
    let env = TestEnv::as_admin();
    env.agenda()
        .args(["task", "create", "Buy toner", "-p", "2", "-c", "Office"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"task_id\":\"1\""))
        .stdout(predicate::str::contains("\"description\":\"Buy toner\""))
        .stdout(predicate::str::contains("\"priority\":2"))
        .stdout(predicate::str::contains("\"user\":\"admin\""));
}

#[test]
fn test_task_create_human() {
    let env = TestEnv::as_admin();
    env.agenda()
        .args(["task", "create", "Buy toner", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task 1"));
}

#[test]
fn test_task_ids_are_sequential() {
    let env = TestEnv::as_admin();
    assert_eq!(env.create_task("one", &[]), "1");
    assert_eq!(env.create_task("two", &[]), "2");
    assert_eq!(env.create_task("three", &[]), "3");
}

#[test]
fn test_task_create_validation() {
    let env = TestEnv::as_admin();
    env.agenda()
        .args(["task", "create", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("description is required"));

    let long = "x".repeat(501);
    env.agenda()
        .args(["task", "create", &long])
        .assert()
        .failure()
        .stderr(predicate::str::contains("500"));

    env.agenda()
        .args(["task", "create", "ok", "-p", "4"])
        .assert()
        .failure();
}

#[test]
fn test_task_create_uses_configured_defaults() {
    let env = TestEnv::as_admin();
    env.agenda()
        .args(["config", "set", "default-priority", "3"])
        .assert()
        .success();
    env.agenda()
        .args(["config", "set", "default-category", "Support"])
        .assert()
        .success();

    let task = env.json(&["task", "create", "Reset router"]);
    assert_eq!(task["priority"], 3);
    assert_eq!(task["category"], "Support");
}

#[test]
fn test_tasks_file_shape() {
    let env = TestEnv::as_admin();
    env.create_task("Check disk", &["-p", "3"]);

    let content = fs::read_to_string(env.tasks_file()).unwrap();
    assert!(content.contains("\n    {"), "expected 4-space indent: {}", content);
    let tasks: serde_json::Value = serde_json::from_str(&content).unwrap();
    let task = &tasks[0];
    assert_eq!(task["task_id"], "1");
    assert_eq!(task["is_completed"], false);
    assert!(task["completed_at"].is_null());
    assert!(task["completed_by"].is_null());
    assert_eq!(task["category"], "");
    assert!(task["created_at"].as_str().unwrap().contains('T'));
}

// === List / show ===

#[test]
fn test_list_pending_sorted_by_priority() {
    let env = TestEnv::as_admin();
    env.create_task("low", &["-p", "1"]);
    env.create_task("high", &["-p", "3"]);
    env.create_task("medium", &["-p", "2"]);

    let list = env.json(&["task", "list"]);
    let ids: Vec<&str> = list["pending"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["task_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["2", "3", "1"]);
    assert!(list["completed"].is_null());
}

#[test]
fn test_list_completed_and_all() {
    let env = TestEnv::as_admin();
    env.create_task("a", &[]);
    env.create_task("b", &[]);
    env.agenda().args(["task", "complete", "1"]).assert().success();

    let completed = env.json(&["task", "list", "--completed"]);
    assert_eq!(completed["completed"].as_array().unwrap().len(), 1);
    assert!(completed["pending"].is_null());

    let all = env.json(&["task", "list", "--all"]);
    assert_eq!(all["pending"].as_array().unwrap().len(), 1);
    assert_eq!(all["completed"].as_array().unwrap().len(), 1);
}

#[test]
fn test_show_missing_task() {
    let env = TestEnv::as_admin();
    env.agenda()
        .args(["task", "show", "42", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entity not found: Task 42"));
}

#[test]
fn test_show_human() {
    let env = TestEnv::as_admin();
    env.create_task("Inspect UPS", &["-c", "Infra"]);
    env.agenda()
        .args(["task", "show", "1", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Description: Inspect UPS"))
        .stdout(predicate::str::contains("Category: Infra"))
        .stdout(predicate::str::contains("Status: pending"));
}

// === Permissions ===

#[test]
fn test_operator_cannot_edit_or_delete_others_task() {
    let env = operators();
    env.login("ana", "pw-ana");
    env.create_task("ana's task", &[]);

    env.login("bruno", "pw-bruno");
    env.agenda()
        .args(["task", "edit", "1", "-d", "changed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied"));
    env.agenda()
        .args(["task", "delete", "1"])
        .assert()
        .failure();

    // Anyone can complete it.
    let done = env.json(&["task", "complete", "1"]);
    assert_eq!(done["completed_by"], "bruno");
}

#[test]
fn test_owner_edits_and_deletes_own_task() {
    let env = operators();
    env.login("ana", "pw-ana");
    env.create_task("draft", &[]);

    let edited = env.json(&["task", "edit", "1", "-d", "final", "-p", "3"]);
    assert_eq!(edited["description"], "final");
    assert_eq!(edited["priority"], 3);

    env.agenda().args(["task", "delete", "1"]).assert().success();
    env.agenda().args(["task", "show", "1"]).assert().failure();
}

#[test]
fn test_reopen_requires_admin() {
    let env = operators();
    env.login("ana", "pw-ana");
    env.create_task("job", &[]);
    env.agenda().args(["task", "complete", "1"]).assert().success();
    env.agenda()
        .args(["task", "reopen", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("administrators"));

    env.login("admin", "admin123");
    let reopened = env.json(&["task", "reopen", "1"]);
    assert_eq!(reopened["is_completed"], false);
    assert!(reopened["completed_at"].is_null());
    assert!(reopened["completed_by"].is_null());
}

#[test]
fn test_completed_task_cannot_be_edited_or_completed_again() {
    let env = TestEnv::as_admin();
    env.create_task("job", &[]);
    env.agenda().args(["task", "complete", "1"]).assert().success();

    env.agenda()
        .args(["task", "edit", "1", "-d", "late change"])
        .assert()
        .failure();
    env.agenda()
        .args(["task", "complete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already completed"));
}

// === Legacy files ===

#[test]
fn test_legacy_tasks_file_is_read() {
    let env = TestEnv::new();
    env.agenda().assert().success();
    fs::write(
        env.tasks_file(),
        r#"[
            {"task_id": 7, "description": "old numeric id", "user": "admin", "is_completed": false,
             "created_at": "2023-05-01T10:00:00.000000"},
            {"description": "no id, skipped"},
            {"task_id": "note-1", "description": "text id", "user": "admin",
             "is_completed": false, "created_at": "2023-05-02T10:00:00.000000", "priority": 2}
        ]"#,
    )
    .unwrap();
    env.login("admin", "admin123");

    let list = env.json(&["task", "list"]);
    assert_eq!(list["pending"].as_array().unwrap().len(), 2);
    // Non-numeric IDs do not affect the next ID.
    assert_eq!(env.create_task("new", &[]), "8");
}
