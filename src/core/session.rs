//! Session-date partitioning of the task list.

use crate::models::Task;
use chrono::NaiveDate;

/// Whether `task` belongs to the `session` partition.
/// Legacy tasks without a session date only show up on `today`.
pub fn in_session(task: &Task, session: NaiveDate, today: NaiveDate) -> bool {
    match task.session_date {
        Some(d) => d == session,
        None => session == today,
    }
}

pub fn filter_session(tasks: Vec<Task>, session: NaiveDate, today: NaiveDate) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|t| in_session(t, session, today))
        .collect()
}
