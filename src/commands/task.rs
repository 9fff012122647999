//! Task commands.
//!
//! Permission rules:
//! - any logged-in user can create, list, show and complete tasks
//! - only the creator or an administrator can edit or delete a task
//! - only administrators can reopen a completed task

use super::{CommandResult, current_user, require_admin};
use crate::config::ResolvedConfig;
use crate::models::ordering::{sort_completed, sort_pending, split_for_display};
use crate::models::{
    Priority, Task, User, timestamp, validate_category, validate_description, validate_priority,
};
use crate::storage::Storage;
use crate::{Error, Result};
use serde::Serialize;

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

fn format_line(task: &Task) -> String {
    let mut line = format!(
        "[{}] {:<6} {}",
        task.task_id,
        task.priority.label(),
        task.description
    );
    if !task.category.is_empty() {
        line.push_str(&format!(" ({})", task.category));
    }
    if task.is_completed {
        line.push_str(&format!(
            " - done by {}",
            task.completed_by.as_deref().unwrap_or("N/A")
        ));
        if let Some(at) = task.completed_at {
            line.push_str(&format!(", {}", at.format(DISPLAY_FORMAT)));
        }
    } else {
        line.push_str(&format!(
            " - by {}, {}",
            task.user,
            task.created_at.format(DISPLAY_FORMAT)
        ));
    }
    line
}

fn not_found(task_id: &str) -> Error {
    Error::NotFound(format!("Task {}", task_id))
}

fn require_owner_or_admin(user: &User, task: &Task, action: &str) -> Result<()> {
    if user.is_admin() || task.is_owned_by(&user.username) {
        Ok(())
    } else {
        tracing::warn!(username = %user.username, task_id = %task.task_id, action, "task action refused");
        Err(Error::PermissionDenied(format!(
            "only the creator of task {} or an administrator can {} it",
            task.task_id, action
        )))
    }
}

/// Result wrapping a single task.
#[derive(Debug, Serialize)]
pub struct TaskResult {
    #[serde(skip)]
    pub verb: &'static str,
    #[serde(flatten)]
    pub task: Task,
}

impl CommandResult for TaskResult {
    fn to_human(&self) -> String {
        format!("{} task {}\n  {}", self.verb, self.task.task_id, format_line(&self.task))
    }
}

/// Create a task owned by the logged-in user.
///
/// Missing priority and category fall back to the configured defaults.
pub fn task_create(
    storage: &Storage,
    config: &ResolvedConfig,
    description: &str,
    priority: Option<u8>,
    category: Option<&str>,
) -> Result<TaskResult> {
    let user = current_user(storage)?;
    let description = validate_description(description)?;
    let priority = validate_priority(priority.unwrap_or(config.default_priority()))?;
    let category = validate_category(category.unwrap_or(config.default_category()))?;

    let task_id = storage.next_task_id()?;
    let task = Task::new(task_id, &description, &user.username, priority, &category);
    storage.add_task(task.clone())?;

    Ok(TaskResult {
        verb: "Created",
        task,
    })
}

#[derive(Debug, Serialize)]
pub struct TaskList {
    pub pending: Option<Vec<Task>>,
    pub completed: Option<Vec<Task>>,
}

impl CommandResult for TaskList {
    fn to_human(&self) -> String {
        let mut sections = Vec::new();
        for (title, tasks) in [("Pending", &self.pending), ("Completed", &self.completed)] {
            let Some(tasks) = tasks else { continue };
            let mut lines = vec![format!("{} tasks ({}):", title, tasks.len())];
            if tasks.is_empty() {
                lines.push("  (none)".to_string());
            }
            for task in tasks {
                lines.push(format!("  {}", format_line(task)));
            }
            sections.push(lines.join("\n"));
        }
        sections.join("\n\n")
    }
}

/// List tasks in display order: pending by default, completed only, or both.
pub fn task_list(storage: &Storage, completed: bool, all: bool) -> Result<TaskList> {
    current_user(storage)?;
    let tasks = storage.load_tasks()?;

    if all {
        let (pending, completed) = split_for_display(&tasks);
        return Ok(TaskList {
            pending: Some(pending),
            completed: Some(completed),
        });
    }

    let mut selected: Vec<Task> = tasks
        .into_iter()
        .filter(|t| t.is_completed == completed)
        .collect();
    if completed {
        sort_completed(&mut selected);
        Ok(TaskList {
            pending: None,
            completed: Some(selected),
        })
    } else {
        sort_pending(&mut selected);
        Ok(TaskList {
            pending: Some(selected),
            completed: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TaskShow {
    #[serde(flatten)]
    pub task: Task,
}

impl CommandResult for TaskShow {
    fn to_human(&self) -> String {
        let t = &self.task;
        let mut lines = vec![
            format!("Task {}", t.task_id),
            format!("  Description: {}", t.description),
            format!("  Priority: {}", t.priority),
            format!(
                "  Category: {}",
                if t.category.is_empty() { "-" } else { &t.category }
            ),
            format!("  Created by: {}", t.user),
            format!("  Created at: {}", timestamp::format(&t.created_at)),
            format!(
                "  Status: {}",
                if t.is_completed { "completed" } else { "pending" }
            ),
        ];
        if t.is_completed {
            lines.push(format!(
                "  Completed by: {}",
                t.completed_by.as_deref().unwrap_or("N/A")
            ));
            if let Some(ref at) = t.completed_at {
                lines.push(format!("  Completed at: {}", timestamp::format(at)));
            }
        }
        lines.join("\n")
    }
}

pub fn task_show(storage: &Storage, task_id: &str) -> Result<TaskShow> {
    current_user(storage)?;
    Ok(TaskShow {
        task: storage.get_task(task_id)?,
    })
}

/// Change description, priority or category of a pending task.
pub fn task_edit(
    storage: &Storage,
    task_id: &str,
    description: Option<&str>,
    priority: Option<u8>,
    category: Option<&str>,
) -> Result<TaskResult> {
    let user = current_user(storage)?;
    if description.is_none() && priority.is_none() && category.is_none() {
        return Err(Error::InvalidInput(
            "Nothing to change: pass --description, --priority or --category".to_string(),
        ));
    }

    let description = description.map(validate_description).transpose()?;
    let priority: Option<Priority> = priority.map(validate_priority).transpose()?;
    let category = category.map(validate_category).transpose()?;

    let updated = storage.modify_task(task_id, |task| {
        require_owner_or_admin(&user, task, "edit")?;
        if task.is_completed {
            return Err(Error::InvalidInput(format!(
                "Task {} is completed; reopen it before editing",
                task.task_id
            )));
        }
        if let Some(description) = description {
            task.description = description;
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if let Some(category) = category {
            task.category = category;
        }
        Ok(())
    })?;

    let task = updated.ok_or_else(|| not_found(task_id))?;
    tracing::info!(task_id, username = %user.username, "task edited");
    Ok(TaskResult {
        verb: "Updated",
        task,
    })
}

/// Mark a pending task completed by the logged-in user.
pub fn task_complete(storage: &Storage, task_id: &str) -> Result<TaskResult> {
    let user = current_user(storage)?;
    let task = storage.get_task(task_id)?;
    if task.is_completed {
        return Err(Error::InvalidInput(format!(
            "Task {} is already completed",
            task_id
        )));
    }

    let task = storage
        .complete_task(task_id, &user.username)?
        .ok_or_else(|| not_found(task_id))?;
    Ok(TaskResult {
        verb: "Completed",
        task,
    })
}

/// Return a completed task to pending. Administrators only.
pub fn task_reopen(storage: &Storage, task_id: &str) -> Result<TaskResult> {
    let user = current_user(storage)?;
    require_admin(&user, "reopen tasks")?;
    let task = storage.get_task(task_id)?;
    if !task.is_completed {
        return Err(Error::InvalidInput(format!(
            "Task {} is not completed",
            task_id
        )));
    }

    let task = storage
        .reopen_task(task_id)?
        .ok_or_else(|| not_found(task_id))?;
    Ok(TaskResult {
        verb: "Reopened",
        task,
    })
}

#[derive(Debug, Serialize)]
pub struct TaskDeleted {
    pub task_id: String,
    pub removed: usize,
}

impl CommandResult for TaskDeleted {
    fn to_human(&self) -> String {
        format!("Deleted task {}", self.task_id)
    }
}

pub fn task_delete(storage: &Storage, task_id: &str) -> Result<TaskDeleted> {
    let user = current_user(storage)?;
    let task = storage.get_task(task_id)?;
    require_owner_or_admin(&user, &task, "delete")?;

    let removed = storage.remove_task(task_id)?;
    if removed == 0 {
        return Err(not_found(task_id));
    }
    Ok(TaskDeleted {
        task_id: task_id.to_string(),
        removed,
    })
}
