use super::{TaskPatch, TaskStore};
use crate::db::initialize::init_db;
use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::Task;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Durable store on top of the SQLite `tasks` table.
#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: Arc<Mutex<DbPool>>,
}

impl SqliteTaskStore {
    /// Open the database at `path` and bring its schema up to date.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self::from_pool(pool))
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: DbPool) -> Self {
        Self {
            pool: Arc::new(Mutex::new(pool)),
        }
    }

    /// Record a user-visible mutation in the audit table (never fails).
    pub async fn audit(&self, operation: &str, target: &str, message: &str) {
        let pool = self.pool.lock().await;
        ttlog_quiet(&pool.conn, operation, target, message);
    }

    pub async fn audit_entries(&self) -> AppResult<Vec<(i64, String, String, String, String)>> {
        let pool = self.pool.lock().await;
        crate::db::log::load_log(&pool.conn)
    }

    pub async fn load_timer_state(&self) -> AppResult<Option<String>> {
        let pool = self.pool.lock().await;
        queries::load_active_timer(&pool.conn)
    }

    pub async fn save_timer_state(&self, payload: &str) -> AppResult<()> {
        let pool = self.pool.lock().await;
        queries::save_active_timer(&pool.conn, payload)
    }

    pub async fn clear_timer_state(&self) -> AppResult<()> {
        let pool = self.pool.lock().await;
        queries::clear_active_timer(&pool.conn)
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn add(&self, task: Task) -> AppResult<Task> {
        let pool = self.pool.lock().await;
        if queries::task_exists(&pool.conn, &task.id)? {
            return Err(AppError::DuplicateKey(task.id));
        }
        queries::insert_task(&pool.conn, &task)?;
        Ok(task)
    }

    async fn get(&self, id: &str) -> AppResult<Option<Task>> {
        let pool = self.pool.lock().await;
        queries::load_task(&pool.conn, id)
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> AppResult<Task> {
        let mut pool = self.pool.lock().await;
        let tx = pool.conn.transaction()?;

        let mut task =
            queries::load_task(&tx, id)?.ok_or_else(|| AppError::NotFound(id.to_string()))?;
        patch.apply(&mut task);
        queries::upsert_task(&tx, &task)?;

        tx.commit()?;
        Ok(task)
    }

    async fn overwrite(&self, task: Task) -> AppResult<Task> {
        let pool = self.pool.lock().await;
        queries::upsert_task(&pool.conn, &task)?;
        Ok(task)
    }

    async fn overwrite_all(&self, tasks: Vec<Task>) -> AppResult<usize> {
        let mut pool = self.pool.lock().await;
        let tx = pool.conn.transaction()?;
        for task in &tasks {
            queries::upsert_task(&tx, task)?;
        }
        tx.commit()?;
        Ok(tasks.len())
    }

    async fn list_all(&self) -> AppResult<Vec<Task>> {
        let pool = self.pool.lock().await;
        queries::load_all_tasks(&pool.conn)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let pool = self.pool.lock().await;
        match queries::delete_task(&pool.conn, id)? {
            0 => Err(AppError::NotFound(id.to_string())),
            _ => Ok(()),
        }
    }

    async fn clear(&self) -> AppResult<()> {
        let pool = self.pool.lock().await;
        queries::clear_tasks(&pool.conn)?;
        Ok(())
    }
}
