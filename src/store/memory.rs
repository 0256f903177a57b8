use super::{TaskPatch, TaskStore, sort_newest_first};
use crate::errors::{AppError, AppResult};
use crate::models::Task;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Volatile store used by tests and by callers that do not need durability.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<String, Task>>,
    unavailable: AtomicBool,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `StorageUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::StorageUnavailable(
                "memory store switched off".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn add(&self, task: Task) -> AppResult<Task> {
        self.check()?;
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(AppError::DuplicateKey(task.id));
        }
        tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn get(&self, id: &str) -> AppResult<Option<Task>> {
        self.check()?;
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> AppResult<Task> {
        self.check()?;
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        patch.apply(task);
        Ok(task.clone())
    }

    async fn overwrite(&self, task: Task) -> AppResult<Task> {
        self.check()?;
        self.tasks
            .write()
            .await
            .insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn overwrite_all(&self, tasks: Vec<Task>) -> AppResult<usize> {
        self.check()?;
        let n = tasks.len();
        let mut map = self.tasks.write().await;
        for task in tasks {
            map.insert(task.id.clone(), task);
        }
        Ok(n)
    }

    async fn list_all(&self) -> AppResult<Vec<Task>> {
        self.check()?;
        let mut all: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.check()?;
        match self.tasks.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(id.to_string())),
        }
    }

    async fn clear(&self) -> AppResult<()> {
        self.check()?;
        self.tasks.write().await.clear();
        Ok(())
    }
}
