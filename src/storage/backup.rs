//! Timestamped backup sets and restore.
//!
//! A backup set is the pair `users_backup_{ts}.json` + `tasks_backup_{ts}.json`
//! sharing one `yyyymmdd_HHMMSS` timestamp. Only complete pairs can be
//! restored. Restoring first snapshots the live files as
//! `{kind}_prerestore_{yyyymmdd_HHMMSS_ffffff}.json`, then overwrites them.
//!
//! Restoring does not reconcile anything already loaded in memory; callers
//! must drop their state (the CLI ends the login session).

use super::Storage;
use crate::{Error, Result};
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const PRERESTORE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// Which data file a backup holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    Users,
    Tasks,
}

impl BackupKind {
    pub const ALL: [BackupKind; 2] = [BackupKind::Users, BackupKind::Tasks];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackupKind::Users => "users",
            BackupKind::Tasks => "tasks",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "users" => Some(BackupKind::Users),
            "tasks" => Some(BackupKind::Tasks),
            _ => None,
        }
    }

    /// `{kind}_backup_{timestamp}.json`
    pub fn backup_file_name(&self, timestamp: &str) -> String {
        format!("{}_backup_{}.json", self.as_str(), timestamp)
    }

    /// `{kind}_prerestore_{timestamp}.json`
    pub fn prerestore_file_name(&self, timestamp: &str) -> String {
        format!("{}_prerestore_{}.json", self.as_str(), timestamp)
    }
}

/// Backup timestamp for the current local time.
pub fn timestamp_now() -> String {
    Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string()
}

fn prerestore_timestamp_now() -> String {
    Local::now().format(PRERESTORE_TIMESTAMP_FORMAT).to_string()
}

fn backup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(users|tasks)_backup_(\d{8}_\d{6})\.json$").expect("valid backup pattern")
    })
}

/// One file of a manual backup.
#[derive(Debug, Clone, Serialize)]
pub struct BackupFile {
    pub kind: BackupKind,
    /// Where the copy was written; `None` when the live file did not exist
    pub path: Option<PathBuf>,
}

/// Outcome of a manual backup.
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    pub timestamp: String,
    pub backup_dir: PathBuf,
    pub files: Vec<BackupFile>,
}

impl BackupReport {
    pub fn is_empty(&self) -> bool {
        self.files.iter().all(|f| f.path.is_none())
    }
}

/// A restorable pair of backup files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupSet {
    pub timestamp: String,
    pub users: PathBuf,
    pub tasks: PathBuf,
}

impl BackupSet {
    /// The timestamp as a date, when it parses.
    pub fn taken_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, BACKUP_TIMESTAMP_FORMAT).ok()
    }
}

/// Outcome of a restore.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub timestamp: String,
    pub prerestore_timestamp: String,
    /// Snapshots of the live files taken before overwriting
    pub snapshots: Vec<PathBuf>,
    pub restored: Vec<PathBuf>,
}

impl Storage {
    /// Copy each existing data file to `Backups/{kind}_backup_{ts}.json`.
    ///
    /// A missing data file is reported in the result, not treated as an error.
    pub fn create_backup(&self) -> Result<BackupReport> {
        fs::create_dir_all(&self.paths.backup_dir)?;
        let timestamp = timestamp_now();

        let mut files = Vec::new();
        for kind in BackupKind::ALL {
            let source = self.paths.live_file(kind);
            if source.exists() {
                let target = self.paths.backup_dir.join(kind.backup_file_name(&timestamp));
                fs::copy(source, &target)?;
                tracing::info!(kind = kind.as_str(), path = %target.display(), "backup created");
                files.push(BackupFile {
                    kind,
                    path: Some(target),
                });
            } else {
                tracing::warn!(kind = kind.as_str(), path = %source.display(), "data file not found for backup");
                files.push(BackupFile { kind, path: None });
            }
        }

        Ok(BackupReport {
            timestamp,
            backup_dir: self.paths.backup_dir.clone(),
            files,
        })
    }

    /// Complete backup sets, newest first.
    pub fn list_backup_sets(&self) -> Result<Vec<BackupSet>> {
        let dir = &self.paths.backup_dir;
        if !dir.exists() {
            tracing::warn!(path = %dir.display(), "backup directory not found");
            return Ok(Vec::new());
        }

        let mut found: BTreeMap<String, BTreeMap<BackupKind, PathBuf>> = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(caps) = backup_pattern().captures(&name) else {
                continue;
            };
            let Some(kind) = BackupKind::parse(&caps[1]) else {
                continue;
            };
            found
                .entry(caps[2].to_string())
                .or_default()
                .insert(kind, entry.path());
        }

        let sets = found
            .into_iter()
            .rev()
            .filter_map(|(timestamp, mut files)| {
                let users = files.remove(&BackupKind::Users)?;
                let tasks = files.remove(&BackupKind::Tasks)?;
                Some(BackupSet {
                    timestamp,
                    users,
                    tasks,
                })
            })
            .collect();

        Ok(sets)
    }

    /// Restore the backup set taken at `timestamp`.
    pub fn restore_backup(&self, timestamp: &str) -> Result<RestoreReport> {
        let set = self
            .list_backup_sets()?
            .into_iter()
            .find(|s| s.timestamp == timestamp)
            .ok_or_else(|| Error::BackupSetNotFound(timestamp.to_string()))?;

        let prerestore_timestamp = prerestore_timestamp_now();
        let mut snapshots = Vec::new();
        for kind in BackupKind::ALL {
            let live = self.paths.live_file(kind);
            if live.exists() {
                let target = self
                    .paths
                    .backup_dir
                    .join(kind.prerestore_file_name(&prerestore_timestamp));
                fs::copy(live, &target)?;
                snapshots.push(target);
            }
        }
        tracing::info!(prerestore_timestamp = %prerestore_timestamp, "pre-restore snapshot created");

        let mut restored = Vec::new();
        for (kind, source) in [
            (BackupKind::Users, &set.users),
            (BackupKind::Tasks, &set.tasks),
        ] {
            let live = self.paths.live_file(kind);
            fs::copy(source, live)?;
            tracing::info!(kind = kind.as_str(), from = %source.display(), "data file restored");
            restored.push(live.to_path_buf());
        }

        Ok(RestoreReport {
            timestamp: set.timestamp,
            prerestore_timestamp,
            snapshots,
            restored,
        })
    }
}
