//! Local task store contract.
//!
//! The store persists root tasks keyed by id. A root and its subtask tree
//! form one record: there is no partial-tree write, callers mutate the tree
//! in memory and [`TaskStore::overwrite`] the root.

mod memory;
mod sqlite;

pub use memory::MemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use crate::errors::AppResult;
use crate::models::{Task, TimerLog};
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new record; fails with `DuplicateKey` when the id exists.
    async fn add(&self, task: Task) -> AppResult<Task>;

    async fn get(&self, id: &str) -> AppResult<Option<Task>>;

    /// Apply `patch` to an existing record and stamp `updated_at`.
    /// Fails with `NotFound` when the id is absent.
    async fn update(&self, id: &str, patch: TaskPatch) -> AppResult<Task>;

    /// Upsert the record as given (timestamps untouched).
    async fn overwrite(&self, task: Task) -> AppResult<Task>;

    /// Upsert every record or none of them.
    async fn overwrite_all(&self, tasks: Vec<Task>) -> AppResult<usize>;

    /// All records ordered by `created_at` descending.
    async fn list_all(&self) -> AppResult<Vec<Task>>;

    /// Fails with `NotFound` when the id is absent.
    async fn delete(&self, id: &str) -> AppResult<()>;

    async fn clear(&self) -> AppResult<()>;
}

/// Partial update for [`TaskStore::update`]; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub duration: Option<u64>,
    pub session_date: Option<Option<NaiveDate>>,
    pub timer_logs: Option<Vec<TimerLog>>,
    pub subtasks: Option<Vec<Task>>,
}

impl TaskPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn duration(secs: u64) -> Self {
        Self {
            duration: Some(secs),
            ..Self::default()
        }
    }

    /// Write the set fields into `task` and refresh its `updated_at`.
    pub fn apply(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(duration) = self.duration {
            task.duration = duration;
        }
        if let Some(date) = self.session_date {
            task.session_date = date;
        }
        if let Some(logs) = self.timer_logs {
            task.timer_logs = logs;
        }
        if let Some(subtasks) = self.subtasks {
            task.subtasks = subtasks;
        }
        task.touch();
    }
}

/// Newest first; equal timestamps fall back to id for a stable order.
pub(crate) fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}
