//! Agenda - A multi-user task agenda.
//!
//! This library provides the core functionality for the `agenda` CLI tool:
//! credential and task stores backed by flat JSON files, timestamped
//! backup sets with restore, role-gated commands, and task reports.

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod report;
pub mod storage;


/// Library-level error type for Agenda operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to set up data directories: {0}")]
    Setup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not logged in: run `agenda login <username>` first")]
    NotLoggedIn,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No complete backup set for timestamp {0}")]
    BackupSetNotFound(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Agenda operations.
pub type Result<T> = std::result::Result<T, Error>;
