//! Smoke tests for the Agenda CLI.
//!
//! These tests verify basic CLI functionality:
//! - `agenda --version` outputs version info
//! - `agenda --help` outputs help text
//! - `agenda` (no args) outputs valid JSON and sets up the data directory

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_version_flag() {
    let env = TestEnv::new();
    env.agenda()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("agenda"))
        .stdout(predicate::str::contains("1.0.0"));
}

#[test]
fn test_help_flag() {
    let env = TestEnv::new();
    env.agenda()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn test_no_args_outputs_status_json() {
    let env = TestEnv::new();
    let status = env.json(&[]);
    assert!(status["logged_in_as"].is_null());
    assert_eq!(status["pending"], 0);
    assert_eq!(status["completed"], 0);
}

#[test]
fn test_first_run_creates_layout() {
    let env = TestEnv::new();
    env.agenda().assert().success();

    for dir in ["Backups", "Reports", "Logs"] {
        assert!(env.data_path().join(dir).is_dir(), "{} missing", dir);
    }
    assert!(env.users_file().exists());
    assert!(env.tasks_file().exists());
}

#[test]
fn test_first_run_users_file_holds_hashed_admin() {
    let env = TestEnv::new();
    env.agenda().assert().success();

    let users: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(env.users_file()).unwrap()).unwrap();
    let admin = &users["admin"];
    assert_eq!(admin["level"], "admin");
    let hash = admin["password_hash"].as_str().unwrap();
    assert!(hash.contains(':'));
    assert!(!hash.contains("admin123"));
}

#[test]
fn test_human_readable_flag() {
    let env = TestEnv::new();
    env.agenda()
        .arg("-H")
        .assert()
        .success()
        .stdout(predicate::str::contains("Agenda"))
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_about() {
    let env = TestEnv::new();
    env.agenda()
        .args(["about", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Agenda v1.0.0"));
}

#[test]
fn test_login_reads_password_from_stdin() {
    let env = TestEnv::new();
    env.agenda()
        .args(["login", "admin"])
        .write_stdin("admin123\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"username\":\"admin\""));

    env.agenda()
        .args(["whoami", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("admin (admin)"));
}

#[test]
fn test_login_from_env_password() {
    let env = TestEnv::new();
    env.agenda()
        .args(["login", "admin"])
        .env("AGENDA_PASSWORD", "admin123")
        .assert()
        .success();
}

#[test]
fn test_wrong_password_json_error() {
    let env = TestEnv::new();
    env.agenda()
        .args(["login", "admin", "--password", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("{\"error\":\"Invalid credentials\"}"));
}

#[test]
fn test_unknown_user_same_error_as_wrong_password() {
    let env = TestEnv::new();
    env.agenda()
        .args(["login", "ghost", "--password", "nope", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Invalid credentials"));
}

#[test]
fn test_logout_then_commands_need_login() {
    let env = TestEnv::as_admin();
    env.agenda().arg("logout").assert().success();
    env.agenda()
        .args(["task", "list", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_config_set_and_show() {
    let env = TestEnv::new();
    env.agenda()
        .args(["config", "set", "output-format", "human"])
        .assert()
        .success();

    // Human output now comes from config.kdl without -H.
    env.agenda()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output-format"))
        .stdout(predicate::str::contains("[config]"));

    env.agenda()
        .args(["config", "set", "default-priority", "9"])
        .assert()
        .failure();
}
