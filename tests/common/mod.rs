//! Common test utilities for agenda integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's real `AgendaComp` data directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// The `agenda()` method returns a `Command` that sets `AGENDA_DATA_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty data directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment with the default admin logged in.
    pub fn as_admin() -> Self {
        let env = Self::new();
        env.login("admin", "admin123");
        env
    }

    /// Get a Command for the agenda binary with isolated data directory.
    pub fn agenda(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_agenda"));
        cmd.current_dir(self.data_dir.path());
        cmd.env("AGENDA_DATA_DIR", self.data_dir.path());
        cmd.env_remove("AGENDA_PASSWORD");
        cmd.env_remove("AGENDA_LOG");
        cmd
    }

    /// Log in, asserting success.
    pub fn login(&self, username: &str, password: &str) {
        self.agenda()
            .args(["login", username, "--password", password])
            .assert()
            .success();
    }

    /// Create a user as the currently logged-in administrator.
    pub fn add_user(&self, username: &str, password: &str, level: &str) {
        self.agenda()
            .args(["user", "add", username, "--password", password, "--level", level])
            .assert()
            .success();
    }

    /// Create a task as the current user and return its ID.
    pub fn create_task(&self, description: &str, extra: &[&str]) -> String {
        let output = self
            .agenda()
            .args(["task", "create", description])
            .args(extra)
            .output()
            .unwrap();
        assert!(output.status.success(), "task create failed: {:?}", output);
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        json["task_id"].as_str().unwrap().to_string()
    }

    /// Run a command and parse its stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.agenda().args(args).output().unwrap();
        assert!(output.status.success(), "{:?} failed: {:?}", args, output);
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_path().join("tasks.json")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_path().join("users.json")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_path().join("Backups")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.data_path().join("Reports")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
