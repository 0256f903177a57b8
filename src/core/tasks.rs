use crate::core::hierarchy::{self, insert_subtask, update_node};
use crate::core::session::in_session;
use crate::errors::{AppError, AppResult};
use crate::models::Task;
use crate::store::TaskStore;
use crate::utils::date::today;
use chrono::NaiveDate;

/// Local task operations that do not involve the server.
pub struct TaskLogic;

fn checked_name(name: &str) -> AppResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("task name must not be empty".into()));
    }
    Ok(name)
}

impl TaskLogic {
    pub async fn create<S: TaskStore + ?Sized>(
        store: &S,
        name: &str,
        session: NaiveDate,
    ) -> AppResult<Task> {
        let task = Task::new(checked_name(name)?, Some(session));
        store.add(task).await
    }

    /// New subtask under `parent_id`; returns the subtask.
    pub async fn add_subtask<S: TaskStore + ?Sized>(
        store: &S,
        parent_id: &str,
        name: &str,
    ) -> AppResult<Task> {
        let parent = hierarchy::resolve_required(store, parent_id).await?;
        let subtask = Task::new(checked_name(name)?, parent.root.session_date);
        insert_subtask(store, parent_id, subtask.clone()).await?;
        Ok(subtask)
    }

    /// Manual duration edit; may lower the value.
    pub async fn set_duration<S: TaskStore + ?Sized>(
        store: &S,
        id: &str,
        secs: u64,
    ) -> AppResult<Task> {
        let (_, task) = update_node(store, id, |t| {
            t.duration = secs;
            Ok(t.clone())
        })
        .await?;
        Ok(task)
    }

    /// In-place rename of any node (no split semantics).
    pub async fn rename_in_place<S: TaskStore + ?Sized>(
        store: &S,
        id: &str,
        name: &str,
    ) -> AppResult<Task> {
        let name = checked_name(name)?.to_string();
        let (_, task) = update_node(store, id, move |t| {
            t.name = name;
            Ok(t.clone())
        })
        .await?;
        Ok(task)
    }

    /// Accept either an id or a task name from the session; ids win.
    pub async fn lookup<S: TaskStore + ?Sized>(
        store: &S,
        key: &str,
        session: NaiveDate,
    ) -> AppResult<Option<Task>> {
        if let Some(found) = hierarchy::resolve(store, key).await? {
            return Ok(Some(found.task().clone()));
        }

        let today = today();
        let wanted = key.trim().to_lowercase();
        Ok(store
            .list_all()
            .await?
            .into_iter()
            .find(|t| in_session(t, session, today) && t.name.to_lowercase() == wanted))
    }
}
