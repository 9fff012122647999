//! File and directory layout of the data directory.

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "AGENDA_DATA_DIR";

/// Directory name used under the platform data directory.
const APP_DIR_NAME: &str = "AgendaComp";

/// Every path the application reads or writes.
///
/// Built once from the data directory and handed to each component that
/// needs a file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub users_file: PathBuf,
    pub tasks_file: PathBuf,
    pub backup_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub log_dir: PathBuf,
    pub config_file: PathBuf,
    pub session_file: PathBuf,
}

impl AppPaths {
    /// Lay out all paths under `data_dir`.
    pub fn from_data_dir(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            users_file: data_dir.join("users.json"),
            tasks_file: data_dir.join("tasks.json"),
            backup_dir: data_dir.join("Backups"),
            reports_dir: data_dir.join("Reports"),
            log_dir: data_dir.join("Logs"),
            config_file: data_dir.join("config.kdl"),
            session_file: data_dir.join("session.json"),
        }
    }

    /// Create the data, backup, report and log directories.
    ///
    /// Failure here is fatal for the application: nothing can be persisted
    /// without these directories.
    pub fn setup_dirs(&self) -> Result<()> {
        for dir in [
            &self.data_dir,
            &self.backup_dir,
            &self.reports_dir,
            &self.log_dir,
        ] {
            fs::create_dir_all(dir)
                .map_err(|e| Error::Setup(format!("{}: {}", dir.display(), e)))?;
        }
        Ok(())
    }
}

/// Resolve the data directory.
///
/// An explicit path (flag or `AGENDA_DATA_DIR`, both delivered through clap)
/// is used literally. Otherwise the platform data directory is used, falling
/// back to a directory beside the current working directory.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }

    match dirs::data_dir() {
        Some(base) => base.join(APP_DIR_NAME),
        None => std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(format!("{}_data", APP_DIR_NAME)),
    }
}
