use super::timer_log::TimerLog;
use crate::utils::date::now_ms;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named unit of tracked work.
///
/// Only top-level tasks are known to the server. Subtasks live inside their
/// root and are persisted together with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Own tracked seconds, excluding subtasks.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    /// Work-day partition; `None` for legacy records (treated as today).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_date: Option<NaiveDate>,
    #[serde(default)]
    pub timer_logs: Vec<TimerLog>,
    #[serde(default)]
    pub subtasks: Vec<Task>,
}

impl Task {
    /// Fresh task with a new id and both timestamps set to now.
    pub fn new(name: &str, session_date: Option<NaiveDate>) -> Self {
        let now = now_ms();
        Self {
            id: new_task_id(),
            name: name.trim().to_string(),
            duration: 0,
            created_at: now,
            updated_at: now,
            session_date,
            timer_logs: Vec::new(),
            subtasks: Vec::new(),
        }
    }

    /// Refresh `updated_at`; must follow every sync-relevant mutation.
    pub fn touch(&mut self) {
        // strictly increasing so two edits within the same millisecond still differ
        self.updated_at = now_ms().max(self.updated_at + 1);
    }

    pub fn has_subtasks(&self) -> bool {
        !self.subtasks.is_empty()
    }

    /// Own duration plus every nested subtask.
    pub fn total_duration(&self) -> u64 {
        self.duration + self.subtasks.iter().map(Task::total_duration).sum::<u64>()
    }

    /// Number of nodes in this tree, the task itself included.
    pub fn node_count(&self) -> usize {
        1 + self.subtasks.iter().map(Task::node_count).sum::<usize>()
    }

    /// Copy suitable for the server: subtasks never leave the client.
    pub fn for_upload(&self) -> Task {
        Task {
            subtasks: Vec::new(),
            ..self.clone()
        }
    }
}

pub fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}
