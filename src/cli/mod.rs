//! CLI argument definitions for Agenda.

use crate::config::DATA_DIR_ENV;
use crate::models::{ReportKind, UserLevel};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Agenda - a multi-user task list with local JSON storage.
///
/// Start with `agenda login admin` on a fresh data directory, then
/// `agenda task create "..."`.
#[derive(Parser, Debug)]
#[command(name = "agenda")]
#[command(author, version, about = "A multi-user task list with local JSON storage", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding users.json, tasks.json, backups, reports and logs.
    /// Can also be set via AGENDA_DATA_DIR environment variable.
    #[arg(long = "data-dir", global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and start a session
    ///
    /// Without --password (or AGENDA_PASSWORD), the password is read from
    /// the first line of stdin.
    Login {
        /// Username
        username: String,

        /// Password
        #[arg(long, env = "AGENDA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Task management commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// User management commands (administrators)
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Backup and restore commands (administrators)
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },

    /// Write a Markdown report of pending or completed tasks
    Report {
        /// Which tasks to include: pending or completed
        #[arg(value_parser = parse_report_kind)]
        kind: ReportKind,

        /// Open the report in the default viewer afterwards
        #[arg(long)]
        open: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version and build information
    About,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a new task
    Create {
        /// Task description (max 500 characters)
        description: String,

        /// Priority (1=low, 2=medium, 3=high)
        #[arg(short, long)]
        priority: Option<u8>,

        /// Category (max 50 characters)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List tasks (pending by default)
    List {
        /// List completed tasks instead
        #[arg(long, conflicts_with = "all")]
        completed: bool,

        /// List both pending and completed tasks
        #[arg(long)]
        all: bool,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Edit a pending task (creator or administrator)
    Edit {
        /// Task ID
        id: String,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New priority (1-3)
        #[arg(short, long)]
        priority: Option<u8>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Mark a pending task completed
    Complete {
        /// Task ID
        id: String,
    },

    /// Return a completed task to pending (administrator)
    Reopen {
        /// Task ID
        id: String,
    },

    /// Delete a task (creator or administrator)
    Delete {
        /// Task ID
        id: String,
    },
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users
    List,

    /// Add a user
    Add {
        /// Username
        username: String,

        /// Initial password
        #[arg(long)]
        password: String,

        /// Level: admin or operator
        #[arg(long, value_parser = parse_level, default_value = "operator")]
        level: UserLevel,

        /// Email address
        #[arg(long, default_value = "")]
        email: String,
    },

    /// Change a password (your own, or anyone's as administrator)
    Passwd {
        /// Username (defaults to the logged-in user)
        username: Option<String>,

        /// New password
        #[arg(long)]
        password: String,
    },

    /// Change a user's level
    SetLevel {
        /// Username
        username: String,

        /// Level: admin or operator
        #[arg(value_parser = parse_level)]
        level: UserLevel,
    },
}

/// Backup subcommands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Back up users.json and tasks.json now
    Create,

    /// List restorable backup sets, newest first
    List,

    /// Restore a backup set and end the session
    Restore {
        /// Backup timestamp (yyyymmdd_HHMMSS)
        timestamp: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration and where each value comes from
    Show,

    /// Set a value in config.kdl
    Set {
        /// Key: output-format, default-priority, default-category or log-level
        key: String,

        /// Value
        value: String,
    },
}

fn parse_level(s: &str) -> Result<UserLevel, String> {
    UserLevel::parse(s).ok_or_else(|| format!("invalid level '{}': expected admin or operator", s))
}

fn parse_report_kind(s: &str) -> Result<ReportKind, String> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(ReportKind::Pending),
        "completed" => Ok(ReportKind::Completed),
        _ => Err(format!(
            "invalid report kind '{}': expected pending or completed",
            s
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_task_create() {
        let cli = Cli::try_parse_from(["agenda", "task", "create", "Buy toner", "-p", "3", "-c", "Office"])
            .unwrap();
        match cli.command {
            Some(Commands::Task {
                command:
                    TaskCommands::Create {
                        description,
                        priority,
                        category,
                    },
            }) => {
                assert_eq!(description, "Buy toner");
                assert_eq!(priority, Some(3));
                assert_eq!(category.as_deref(), Some("Office"));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_level_accepts_legacy_spelling() {
        assert_eq!(parse_level("operador"), Ok(UserLevel::Operator));
        assert_eq!(parse_level("ADMIN"), Ok(UserLevel::Admin));
        assert!(parse_level("root").is_err());
    }

    #[test]
    fn test_list_flags_conflict() {
        assert!(Cli::try_parse_from(["agenda", "task", "list", "--completed", "--all"]).is_err());
    }

    #[test]
    fn test_report_kind_parse() {
        assert_eq!(parse_report_kind("Completed"), Ok(ReportKind::Completed));
        assert!(parse_report_kind("all").is_err());
    }
}
