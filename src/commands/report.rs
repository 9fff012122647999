//! Report command.

use super::{CommandResult, current_user};
use crate::models::ReportKind;
use crate::report::{join_report, open_in_viewer, spawn_report};
use crate::storage::Storage;
use crate::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct ReportResult {
    pub kind: ReportKind,
    pub path: PathBuf,
    pub tasks: usize,
    pub opened: bool,
}

impl CommandResult for ReportResult {
    fn to_human(&self) -> String {
        let mut out = format!(
            "Report with {} {} task(s) written to {}",
            self.tasks,
            self.kind,
            self.path.display()
        );
        if self.opened {
            out.push_str("\nOpened in the default viewer");
        }
        out
    }
}

/// Generate a report of pending or completed tasks.
///
/// An empty selection produces no file. A viewer that fails to launch is
/// logged and reported as `opened: false`; the report itself still counts.
pub fn report(storage: &Storage, kind: ReportKind, open: bool) -> Result<ReportResult> {
    let user = current_user(storage)?;
    let tasks = storage.load_tasks()?;
    let count = tasks.iter().filter(|t| kind.includes(t)).count();
    if count == 0 {
        return Err(Error::InvalidInput(format!(
            "There are no {} tasks to report",
            kind
        )));
    }

    let handle = spawn_report(
        tasks,
        kind,
        storage.paths.reports_dir.clone(),
        user.username,
    );
    let path = join_report(handle)?;

    let opened = open
        && match open_in_viewer(&path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not open report");
                false
            }
        };

    Ok(ReportResult {
        kind,
        path,
        tasks: count,
        opened,
    })
}
