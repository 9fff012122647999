//! Data models for Agenda entities.
//!
//! This module defines the core data structures:
//! - `User` - A credential record with its role level
//! - `Task` - A unit of work with priority, category and completion state
//! - `Priority` - Task priority (1 low, 2 medium, 3 high)
//! - `ReportKind` - Which task list a report covers

pub mod ordering;

use crate::{Error, Result};
use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Maximum task description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum task category length, in characters.
pub const MAX_CATEGORY_LEN: usize = 50;

/// Role flag gating administrative actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    Admin,
    /// Older files spell this level "operador".
    #[default]
    #[serde(alias = "operador")]
    Operator,
}

impl UserLevel {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserLevel::Admin),
            "operator" | "operador" => Some(UserLevel::Operator),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserLevel::Admin => "admin",
            UserLevel::Operator => "operator",
        }
    }
}

impl fmt::Display for UserLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user as stored in `users.json`.
///
/// The username is the map key in the file, so it is not serialized with
/// the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip)]
    pub username: String,

    /// Salted hash in `hash:salt` form
    pub password_hash: String,

    #[serde(default)]
    pub level: UserLevel,

    #[serde(default)]
    pub email: String,
}

impl User {
    pub fn new(username: &str, password_hash: String, level: UserLevel, email: &str) -> Self {
        Self {
            username: username.to_string(),
            password_hash,
            level,
            email: email.to_string(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.level == UserLevel::Admin
    }
}

/// Task priority. Stored as the integers 1, 2 and 3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    #[default]
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(format!("priority must be 1-3, got {}", other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A task as stored in `tasks.json`.
///
/// `completed_at` and `completed_by` are set exactly when `is_completed` is;
/// [`Task::complete`] and [`Task::reopen`] keep the three fields in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Numeric string for new tasks; older files may hold other strings or bare numbers
    #[serde(deserialize_with = "string_or_number")]
    pub task_id: String,

    pub description: String,

    /// Username of the creator
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub is_completed: bool,

    #[serde(default = "now", with = "timestamp")]
    pub created_at: NaiveDateTime,

    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<NaiveDateTime>,

    #[serde(default)]
    pub completed_by: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub category: String,
}

impl Task {
    /// Create a pending task created now by `user`.
    pub fn new(task_id: String, description: &str, user: &str, priority: Priority, category: &str) -> Self {
        Self {
            task_id,
            description: description.to_string(),
            user: user.to_string(),
            is_completed: false,
            created_at: now(),
            completed_at: None,
            completed_by: None,
            priority,
            category: category.to_string(),
        }
    }

    /// Mark the task completed by `by` at the current time.
    pub fn complete(&mut self, by: &str) {
        self.is_completed = true;
        self.completed_at = Some(now());
        self.completed_by = Some(by.to_string());
    }

    /// Return the task to the pending list, clearing both completion fields.
    pub fn reopen(&mut self) {
        self.is_completed = false;
        self.completed_at = None;
        self.completed_by = None;
    }

    pub fn is_owned_by(&self, username: &str) -> bool {
        self.user == username
    }
}

/// Which task list a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Pending,
    Completed,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Pending => "pending",
            ReportKind::Completed => "completed",
        }
    }

    /// Whether a task belongs in this report.
    pub fn includes(&self, task: &Task) -> bool {
        match self {
            ReportKind::Pending => !task.is_completed,
            ReportKind::Completed => task.is_completed,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trim and validate a task description.
pub fn validate_description(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(Error::InvalidInput(
            "Task description is required".to_string(),
        ));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::InvalidInput(format!(
            "Task description cannot exceed {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(description.to_string())
}

/// Trim and validate a task category. Empty is allowed.
pub fn validate_category(category: &str) -> Result<String> {
    let category = category.trim();
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(Error::InvalidInput(format!(
            "Task category cannot exceed {} characters",
            MAX_CATEGORY_LEN
        )));
    }
    Ok(category.to_string())
}

/// Convert a raw priority number into a [`Priority`].
pub fn validate_priority(value: u8) -> Result<Priority> {
    Priority::try_from(value).map_err(Error::InvalidInput)
}

/// Current local time, the clock every task timestamp uses.
///
/// Truncated to microseconds, the precision stored on disk.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// ISO-8601 local timestamps with microsecond precision.
///
/// Parsing also accepts values with a UTC offset, converted to local time.
pub mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

    pub fn format(value: &NaiveDateTime) -> String {
        value.format(FORMAT).to_string()
    }

    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        if let Ok(naive) = s.parse::<NaiveDateTime>() {
            return Some(naive);
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Local).naive_local())
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s)))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_str(&super::format(v)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(s) => super::parse(&s)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
                None => Ok(None),
            }
        }
    }
}
