//! Task reports.
//!
//! A report is a Markdown document listing the pending or completed tasks
//! in display order. Rendering runs on one background worker thread over an
//! owned snapshot of the tasks, so nothing is shared with the caller.

use crate::models::ordering::{sort_completed, sort_pending};
use crate::models::{ReportKind, Task};
use crate::{Error, Result};
use chrono::{Local, NaiveDateTime};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::{self, JoinHandle};

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Write the report for `tasks` into `reports_dir` and return its path.
///
/// Tasks that do not belong to `kind` are left out.
pub fn generate_report(
    tasks: &[Task],
    kind: ReportKind,
    reports_dir: &Path,
    generated_by: &str,
) -> Result<PathBuf> {
    let mut selected: Vec<Task> = tasks.iter().filter(|t| kind.includes(t)).cloned().collect();
    match kind {
        ReportKind::Pending => sort_pending(&mut selected),
        ReportKind::Completed => sort_completed(&mut selected),
    }

    let generated_at = Local::now();
    let body = render(&selected, kind, generated_at.naive_local(), generated_by);

    fs::create_dir_all(reports_dir)?;
    let path = reports_dir.join(format!(
        "report_{}_{}.md",
        kind.as_str(),
        generated_at.format("%Y%m%d_%H%M%S")
    ));
    fs::write(&path, body)?;
    tracing::info!(kind = kind.as_str(), count = selected.len(), path = %path.display(), "report generated");
    Ok(path)
}

/// Run [`generate_report`] on a worker thread.
pub fn spawn_report(
    tasks: Vec<Task>,
    kind: ReportKind,
    reports_dir: PathBuf,
    generated_by: String,
) -> JoinHandle<Result<PathBuf>> {
    thread::spawn(move || generate_report(&tasks, kind, &reports_dir, &generated_by))
}

/// Wait for a report worker.
pub fn join_report(handle: JoinHandle<Result<PathBuf>>) -> Result<PathBuf> {
    handle
        .join()
        .map_err(|_| Error::Other("Report worker panicked".to_string()))?
}

fn render(tasks: &[Task], kind: ReportKind, generated_at: NaiveDateTime, by: &str) -> String {
    let title = match kind {
        ReportKind::Pending => "Pending Tasks Report",
        ReportKind::Completed => "Completed Tasks Report",
    };

    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", title);
    let _ = writeln!(
        out,
        "Generated {} by {} - {} task(s)\n",
        generated_at.format(DISPLAY_FORMAT),
        by,
        tasks.len()
    );

    match kind {
        ReportKind::Pending => {
            out.push_str("| ID | Description | Priority | Category | Created by | Created at |\n");
            out.push_str("|---|---|---|---|---|---|\n");
            for t in tasks {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {} |",
                    t.task_id,
                    cell(&t.description),
                    t.priority,
                    cell(&t.category),
                    cell(&t.user),
                    t.created_at.format(DISPLAY_FORMAT)
                );
            }
        }
        ReportKind::Completed => {
            out.push_str("| ID | Description | Priority | Category | Completed by | Completed at |\n");
            out.push_str("|---|---|---|---|---|---|\n");
            for t in tasks {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {} |",
                    t.task_id,
                    cell(&t.description),
                    t.priority,
                    cell(&t.category),
                    cell(t.completed_by.as_deref().unwrap_or("N/A")),
                    t.completed_at
                        .map(|at| at.format(DISPLAY_FORMAT).to_string())
                        .unwrap_or_else(|| "N/A".to_string())
                );
            }
        }
    }

    out
}

/// Escape a value for a Markdown table cell.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Open a file with the platform's default viewer.
pub fn open_in_viewer(path: &Path) -> Result<()> {
    let launched = if cfg!(target_os = "windows") {
        Command::new("cmd").arg("/C").arg("start").arg("").arg(path).status()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(path).status()
    } else {
        Command::new("xdg-open").arg(path).status()
    };
    let status = launched?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::Other(format!(
            "Viewer exited with {} for {}",
            status,
            path.display()
        )))
    }
}
