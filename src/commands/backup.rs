//! Backup and restore commands. Administrators only.

use super::{CommandResult, current_user, require_admin};
use crate::auth::Session;
use crate::storage::{BackupReport, BackupSet, RestoreReport, Storage};
use crate::{Error, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BackupCreated {
    #[serde(flatten)]
    pub report: BackupReport,
}

impl CommandResult for BackupCreated {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Backup {}", self.report.timestamp)];
        for file in &self.report.files {
            match file.path {
                Some(ref path) => lines.push(format!("  {}: {}", file.kind.as_str(), path.display())),
                None => lines.push(format!("  {}: no data file, skipped", file.kind.as_str())),
            }
        }
        lines.join("\n")
    }
}

/// Back up both data files now.
pub fn backup_create(storage: &Storage) -> Result<BackupCreated> {
    let user = current_user(storage)?;
    require_admin(&user, "create backups")?;

    let report = storage.create_backup()?;
    if report.is_empty() {
        return Err(Error::NotFound(
            "No data files to back up".to_string(),
        ));
    }
    Ok(BackupCreated { report })
}

#[derive(Debug, Serialize)]
pub struct BackupList {
    pub sets: Vec<BackupSet>,
}

impl CommandResult for BackupList {
    fn to_human(&self) -> String {
        if self.sets.is_empty() {
            return "No backup sets found".to_string();
        }
        let mut lines = vec![format!("{} backup set(s):", self.sets.len())];
        for set in &self.sets {
            let taken = set
                .taken_at()
                .map(|at| at.format("%d/%m/%Y %H:%M:%S").to_string())
                .unwrap_or_default();
            lines.push(format!("  {}  {}", set.timestamp, taken));
        }
        lines.join("\n")
    }
}

/// Complete backup sets, newest first.
pub fn backup_list(storage: &Storage) -> Result<BackupList> {
    let user = current_user(storage)?;
    require_admin(&user, "list backups")?;
    Ok(BackupList {
        sets: storage.list_backup_sets()?,
    })
}

#[derive(Debug, Serialize)]
pub struct BackupRestored {
    #[serde(flatten)]
    pub report: RestoreReport,
    pub session_ended: bool,
}

impl CommandResult for BackupRestored {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Restored backup {}", self.report.timestamp)];
        for path in &self.report.snapshots {
            lines.push(format!("  previous data saved to {}", path.display()));
        }
        if self.session_ended {
            lines.push("Session ended; log in again.".to_string());
        }
        lines.join("\n")
    }
}

/// Restore a backup set, then end the session.
///
/// The restored users file may not contain the current account, or may
/// give it another level, so the login is never carried across a restore.
pub fn backup_restore(storage: &Storage, timestamp: &str) -> Result<BackupRestored> {
    let user = current_user(storage)?;
    require_admin(&user, "restore backups")?;

    let report = storage.restore_backup(timestamp)?;
    let session_ended = Session::clear(&storage.paths.session_file)?;
    tracing::info!(timestamp, by = %user.username, "backup restored, session ended");
    Ok(BackupRestored {
        report,
        session_ended,
    })
}
