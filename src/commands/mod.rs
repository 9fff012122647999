//! Command implementations for the Agenda CLI.
//!
//! This module contains the business logic behind each CLI command,
//! including the permission rules. Commands are organized by area:
//! - `session` - login, logout, whoami, status overview
//! - `task` - task create/list/show/edit/complete/reopen/delete
//! - `user` - user management (administrators)
//! - `backup` - manual backups and restore (administrators)
//! - `report` - task reports
//! - `config` - config.kdl inspection and updates

pub mod backup;
pub mod config;
pub mod report;
pub mod session;
pub mod task;
pub mod user;

use crate::auth::Session;
use crate::models::User;
use crate::storage::Storage;
use crate::{Error, Result};
use serde::Serialize;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult: Serialize {
    /// Serialize to JSON string.
    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Print a command result in the requested format.
pub fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// The logged-in user, with their level as currently stored.
pub fn current_user(storage: &Storage) -> Result<User> {
    let users = storage.load_users()?;
    Session::current_user(&storage.paths.session_file, &users)
}

/// Fail unless `user` is an administrator.
pub fn require_admin(user: &User, action: &str) -> Result<()> {
    if user.is_admin() {
        Ok(())
    } else {
        tracing::warn!(username = %user.username, action, "administrator action refused");
        Err(Error::PermissionDenied(format!(
            "only administrators can {}",
            action
        )))
    }
}
