//! Login session and status commands.

use super::{CommandResult, current_user};
use crate::auth::{self, Session};
use crate::config::AppPaths;
use crate::models::{UserLevel, timestamp};
use crate::storage::Storage;
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub username: String,
    pub level: UserLevel,
}

impl CommandResult for LoginResult {
    fn to_human(&self) -> String {
        format!("Logged in as {} ({})", self.username, self.level)
    }
}

/// Verify credentials and start a session.
///
/// Surrounding whitespace is stripped from both the username and the
/// password before checking them.
pub fn login(storage: &Storage, username: &str, password: &str) -> Result<LoginResult> {
    let users = storage.load_users()?;
    let user = auth::authenticate(&users, username.trim(), password.trim())?;
    Session::new(&user.username).save(&storage.paths.session_file)?;
    Ok(LoginResult {
        username: user.username,
        level: user.level,
    })
}

#[derive(Debug, Serialize)]
pub struct LogoutResult {
    pub logged_out: bool,
}

impl CommandResult for LogoutResult {
    fn to_human(&self) -> String {
        if self.logged_out {
            "Logged out".to_string()
        } else {
            "No active session".to_string()
        }
    }
}

/// End the current session, if any.
pub fn logout(storage: &Storage) -> Result<LogoutResult> {
    let logged_out = Session::clear(&storage.paths.session_file)?;
    if logged_out {
        tracing::info!("session ended");
    }
    Ok(LogoutResult { logged_out })
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub username: String,
    pub level: UserLevel,
    pub email: String,
    pub logged_in_at: Option<String>,
}

impl CommandResult for WhoAmI {
    fn to_human(&self) -> String {
        let mut out = format!("{} ({})", self.username, self.level);
        if !self.email.is_empty() {
            out.push_str(&format!(" <{}>", self.email));
        }
        if let Some(ref at) = self.logged_in_at {
            out.push_str(&format!("\nLogged in since {}", at));
        }
        out
    }
}

pub fn whoami(storage: &Storage) -> Result<WhoAmI> {
    let user = current_user(storage)?;
    let logged_in_at = Session::load(&storage.paths.session_file)
        .map(|s| timestamp::format(&s.logged_in_at));
    Ok(WhoAmI {
        username: user.username,
        level: user.level,
        email: user.email,
        logged_in_at,
    })
}

#[derive(Debug, Serialize)]
pub struct Status {
    pub logged_in_as: Option<String>,
    pub level: Option<UserLevel>,
    pub pending: usize,
    pub completed: usize,
    pub data_dir: PathBuf,
}

impl CommandResult for Status {
    fn to_human(&self) -> String {
        let mut lines = vec!["Agenda".to_string()];
        match (&self.logged_in_as, &self.level) {
            (Some(name), Some(level)) => lines.push(format!("  Logged in as {} ({})", name, level)),
            _ => lines.push("  Not logged in (run `agenda login <username>`)".to_string()),
        }
        lines.push(format!(
            "  Tasks: {} pending, {} completed",
            self.pending, self.completed
        ));
        lines.push(format!("  Data: {}", self.data_dir.display()));
        lines.join("\n")
    }
}

/// Overview shown when no command is given.
pub fn status(storage: &Storage) -> Result<Status> {
    let user = current_user(storage).ok();
    let tasks = storage.load_tasks()?;
    let completed = tasks.iter().filter(|t| t.is_completed).count();
    Ok(Status {
        logged_in_as: user.as_ref().map(|u| u.username.clone()),
        level: user.map(|u| u.level),
        pending: tasks.len() - completed,
        completed,
        data_dir: storage.paths.data_dir.clone(),
    })
}

#[derive(Debug, Serialize)]
pub struct About {
    pub name: &'static str,
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub git_commit: &'static str,
    pub data_dir: PathBuf,
}

impl CommandResult for About {
    fn to_human(&self) -> String {
        format!(
            "{} v{}\n  Built {} ({})\n  Data directory: {}",
            self.name,
            self.version,
            self.build_timestamp,
            self.git_commit,
            self.data_dir.display()
        )
    }
}

pub fn about(paths: &AppPaths) -> About {
    About {
        name: "Agenda",
        version: env!("CARGO_PKG_VERSION"),
        build_timestamp: env!("AGENDA_BUILD_TIMESTAMP"),
        git_commit: env!("AGENDA_GIT_COMMIT"),
        data_dir: paths.data_dir.clone(),
    }
}
