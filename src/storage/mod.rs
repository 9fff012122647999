//! Storage layer for Agenda data.
//!
//! This module handles persistence of users and tasks. Both collections live
//! in flat JSON documents under the data directory:
//!
//! - `users.json` - object keyed by username
//! - `tasks.json` - array of task records
//!
//! Every write copies the current file into `Backups/` first, then rewrites
//! it whole. There is no locking: two processes writing at once can clobber
//! each other, and two sessions creating tasks at once can be handed the
//! same next ID. This is an accepted limitation of a single-user tool.

pub mod backup;

pub use backup::{BackupFile, BackupKind, BackupReport, BackupSet, RestoreReport};

use crate::auth;
use crate::config::AppPaths;
use crate::models::{Task, User, UserLevel};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Users keyed by username.
pub type Users = BTreeMap<String, User>;

/// Name of the administrator created on first run.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Password of the administrator created on first run.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

/// Storage manager over one data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    pub paths: AppPaths,
}

impl Storage {
    pub fn new(paths: AppPaths) -> Self {
        Self { paths }
    }

    // === Users ===

    /// Load all users.
    ///
    /// A missing file is a first run: the default administrator is created
    /// and persisted. Malformed JSON yields an empty map; malformed entries
    /// are skipped individually. Both are logged.
    pub fn load_users(&self) -> Result<Users> {
        let path = &self.paths.users_file;

        if !path.exists() {
            tracing::info!(path = %path.display(), "users file not found, creating default administrator");
            let mut users = Users::new();
            users.insert(
                DEFAULT_ADMIN_USERNAME.to_string(),
                User::new(
                    DEFAULT_ADMIN_USERNAME,
                    auth::hash_password(DEFAULT_ADMIN_PASSWORD),
                    UserLevel::Admin,
                    DEFAULT_ADMIN_EMAIL,
                ),
            );
            self.save_users(&users)?;
            tracing::info!(username = DEFAULT_ADMIN_USERNAME, "default administrator created");
            return Ok(users);
        }

        let Some(raw) = read_json(path)? else {
            return Ok(Users::new());
        };
        let Value::Object(entries) = raw else {
            tracing::error!(path = %path.display(), "users file is not a JSON object, ignoring its content");
            return Ok(Users::new());
        };

        let mut users = Users::new();
        for (username, record) in entries {
            match serde_json::from_value::<User>(record) {
                Ok(mut user) => {
                    user.username = username.clone();
                    users.insert(username, user);
                }
                Err(e) => {
                    tracing::error!(username = %username, error = %e, "skipping malformed user record");
                }
            }
        }

        tracing::info!(count = users.len(), "users loaded");
        Ok(users)
    }

    /// Persist all users, backing up the previous file first.
    pub fn save_users(&self, users: &Users) -> Result<()> {
        self.write_with_backup(BackupKind::Users, users)?;
        tracing::info!(count = users.len(), "users saved");
        Ok(())
    }

    // === Tasks ===

    /// Load all tasks in file order.
    ///
    /// A missing file is created empty. Malformed JSON yields an empty list;
    /// malformed entries are skipped individually. Both are logged.
    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        let path = &self.paths.tasks_file;

        if !path.exists() {
            tracing::info!(path = %path.display(), "tasks file not found, creating an empty one");
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "[]")?;
            return Ok(Vec::new());
        }

        let Some(raw) = read_json(path)? else {
            return Ok(Vec::new());
        };
        let Value::Array(entries) = raw else {
            tracing::error!(path = %path.display(), "tasks file is not a JSON array, ignoring its content");
            return Ok(Vec::new());
        };

        let mut tasks = Vec::with_capacity(entries.len());
        for (index, record) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Task>(record) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    tracing::error!(index, error = %e, "skipping malformed task record");
                }
            }
        }

        tracing::info!(count = tasks.len(), "tasks loaded");
        Ok(tasks)
    }

    /// Persist all tasks, backing up the previous file first.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        self.write_with_backup(BackupKind::Tasks, tasks)?;
        tracing::info!(count = tasks.len(), "tasks saved");
        Ok(())
    }

    /// Next free numeric task ID, based on the tasks file.
    pub fn next_task_id(&self) -> Result<String> {
        Ok(next_task_id(&self.load_tasks()?))
    }

    /// Find a task by ID.
    pub fn get_task(&self, task_id: &str) -> Result<Task> {
        self.load_tasks()?
            .into_iter()
            .find(|t| t.task_id == task_id)
            .ok_or_else(|| Error::NotFound(format!("Task {}", task_id)))
    }

    /// Append a task.
    pub fn add_task(&self, task: Task) -> Result<()> {
        let mut tasks = self.load_tasks()?;
        if tasks.iter().any(|t| t.task_id == task.task_id) {
            return Err(Error::AlreadyExists(format!("Task {}", task.task_id)));
        }
        tracing::info!(task_id = %task.task_id, user = %task.user, "task added");
        tasks.push(task);
        self.save_tasks(&tasks)
    }

    /// Remove every task with the given ID. Returns how many were removed.
    pub fn remove_task(&self, task_id: &str) -> Result<usize> {
        let mut tasks = self.load_tasks()?;
        let before = tasks.len();
        tasks.retain(|t| t.task_id != task_id);
        let removed = before - tasks.len();
        self.save_tasks(&tasks)?;
        tracing::info!(task_id, removed, "task removed");
        Ok(removed)
    }

    /// Apply `f` to the first task with the given ID and save.
    ///
    /// Nothing is written when no task matches or when `f` fails.
    pub fn modify_task<F>(&self, task_id: &str, f: F) -> Result<Option<Task>>
    where
        F: FnOnce(&mut Task) -> Result<()>,
    {
        let mut tasks = self.load_tasks()?;
        let Some(task) = tasks.iter_mut().find(|t| t.task_id == task_id) else {
            return Ok(None);
        };
        f(task)?;
        let updated = task.clone();
        self.save_tasks(&tasks)?;
        Ok(Some(updated))
    }

    /// Mark the first task with the given ID completed by `by`.
    pub fn complete_task(&self, task_id: &str, by: &str) -> Result<Option<Task>> {
        let updated = self.modify_task(task_id, |task| {
            task.complete(by);
            Ok(())
        })?;
        if updated.is_some() {
            tracing::info!(task_id, completed_by = by, "task completed");
        }
        Ok(updated)
    }

    /// Return the first task with the given ID to pending.
    pub fn reopen_task(&self, task_id: &str) -> Result<Option<Task>> {
        let updated = self.modify_task(task_id, |task| {
            task.reopen();
            Ok(())
        })?;
        if updated.is_some() {
            tracing::info!(task_id, "task reopened");
        }
        Ok(updated)
    }

    /// Copy the live file into `Backups/` (when it exists), then overwrite it.
    fn write_with_backup<T: Serialize + ?Sized>(&self, kind: BackupKind, value: &T) -> Result<()> {
        let path = self.paths.live_file(kind);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            fs::create_dir_all(&self.paths.backup_dir)?;
            let backup_path = self
                .paths
                .backup_dir
                .join(kind.backup_file_name(&backup::timestamp_now()));
            fs::copy(path, &backup_path)?;
            tracing::info!(backup = %backup_path.display(), "backup written before save");
        }

        write_json_pretty(path, value)
    }
}

impl AppPaths {
    /// The live data file for a backup kind.
    pub fn live_file(&self, kind: BackupKind) -> &Path {
        match kind {
            BackupKind::Users => &self.users_file,
            BackupKind::Tasks => &self.tasks_file,
        }
    }
}

/// Next free numeric task ID: one past the largest all-digit ID, or "1".
///
/// IDs that are not purely ASCII digits (for example older UUIDs) are
/// ignored rather than treated as errors. IDs are compared and incremented
/// as decimal strings, so there is no upper bound on their width.
pub fn next_task_id(tasks: &[Task]) -> String {
    let max = tasks
        .iter()
        .map(|t| t.task_id.as_str())
        .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
        .map(|id| id.trim_start_matches('0'))
        .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
        .unwrap_or("");
    increment_decimal(max)
}

/// Add one to a string of ASCII digits without leading zeros ("" is zero).
fn increment_decimal(digits: &str) -> String {
    let mut out = digits.as_bytes().to_vec();
    for b in out.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return String::from_utf8_lossy(&out).into_owned();
        }
    }
    out.insert(0, b'1');
    String::from_utf8_lossy(&out).into_owned()
}

/// Read a JSON file, returning `None` (and logging) when it fails to parse.
fn read_json(path: &Path) -> Result<Option<Value>> {
    let content = fs::read_to_string(path)?;
    match serde_json::from_str(&content) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to decode JSON, file may be corrupt");
            Ok(None)
        }
    }
}

/// Write JSON indented with four spaces.
fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    fs::write(path, buf)?;
    Ok(())
}
