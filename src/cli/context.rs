//! Per-process wiring: config, SQLite store, gateway and timer state.

use crate::config::Config;
use crate::core::{ActiveTimer, SyncEngine, TimerController};
use crate::errors::{AppError, AppResult};
use crate::gateway::{self, SharedGateway};
use crate::store::{SqliteTaskStore, TaskStore};
use crate::utils::date::{parse_date, today};
use crate::utils::path::expand_tilde;
use chrono::NaiveDate;
use std::sync::Arc;

pub struct AppContext {
    pub cfg: Config,
    pub store: Arc<SqliteTaskStore>,
}

impl AppContext {
    pub fn open(cfg: &Config) -> AppResult<Self> {
        let path = expand_tilde(&cfg.database);
        let store = SqliteTaskStore::open(&path.to_string_lossy())?;
        Ok(Self {
            cfg: cfg.clone(),
            store: Arc::new(store),
        })
    }

    pub fn dyn_store(&self) -> Arc<dyn TaskStore> {
        self.store.clone()
    }

    pub async fn gateway(&self) -> AppResult<SharedGateway> {
        gateway::connect(&self.cfg).await
    }

    pub async fn engine(&self) -> AppResult<SyncEngine> {
        Ok(SyncEngine::new(self.dyn_store(), self.gateway().await?))
    }

    /// Timer controller with the state left by a previous command.
    pub async fn timer(&self) -> AppResult<TimerController<SqliteTaskStore>> {
        let active = match self.store.load_timer_state().await? {
            Some(payload) => match serde_json::from_str::<ActiveTimer>(&payload) {
                Ok(t) => Some(t),
                Err(e) => {
                    log::warn!("discarding unreadable timer state: {e}");
                    None
                }
            },
            None => None,
        };
        Ok(TimerController::resume(self.store.clone(), active))
    }

    pub async fn save_timer(&self, timer: &TimerController<SqliteTaskStore>) -> AppResult<()> {
        match timer.active() {
            Some(active) => {
                let payload = serde_json::to_string(active)?;
                self.store.save_timer_state(&payload).await
            }
            None => self.store.clear_timer_state().await,
        }
    }

    /// Commit a detached timer that belongs to another session than `date`.
    pub async fn leave_other_sessions(&self, date: NaiveDate) -> AppResult<()> {
        let mut timer = self.timer().await?;
        if let Some(task) = timer.switch_session(date, today()).await? {
            self.save_timer(&timer).await?;
            self.store
                .audit("stop", &task.id, &format!("Timer committed on session switch to {date}"))
                .await;
            crate::ui::messages::info(format!(
                "Timer on '{}' stopped before switching to {}",
                task.name, date
            ));
        }
        Ok(())
    }
}

/// `--date` value or today.
pub fn session_date(arg: &Option<String>) -> AppResult<NaiveDate> {
    match arg {
        Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone())),
        None => Ok(today()),
    }
}
