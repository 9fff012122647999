//! Display ordering for task lists.
//!
//! Pending tasks: highest priority first, then oldest first.
//! Completed tasks: most recently completed first. A task flagged completed
//! without a completion time sorts as if completed at the earliest instant.

use crate::models::Task;
use chrono::NaiveDateTime;
use std::cmp::{Ordering, Reverse};

/// Order pending tasks by priority descending, then creation time ascending.
pub fn sort_pending(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| (Reverse(t.priority), t.created_at));
}

/// Order completed tasks by completion time descending.
pub fn sort_completed(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| compare_completion(b, a));
}

fn compare_completion(a: &Task, b: &Task) -> Ordering {
    let at = |t: &Task| t.completed_at.unwrap_or(NaiveDateTime::MIN);
    at(a).cmp(&at(b))
}

/// Split tasks into (pending, completed), each in display order.
pub fn split_for_display(tasks: &[Task]) -> (Vec<Task>, Vec<Task>) {
    let (mut completed, mut pending): (Vec<Task>, Vec<Task>) =
        tasks.iter().cloned().partition(|t| t.is_completed);
    sort_pending(&mut pending);
    sort_completed(&mut completed);
    (pending, completed)
}
