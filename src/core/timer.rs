//! Timer / session controller.
//!
//! Timer logs are two-phase: the running session's marks stay in the
//! in-flight buffer of [`ActiveTimer`] and are appended to the task's
//! persisted logs only when the timer stops (or is flushed before a session
//! switch). Ticks persist the running duration on a best-effort basis.

use crate::core::hierarchy::{resolve_required, update_node};
use crate::errors::{AppError, AppResult};
use crate::models::{Task, TimerLog};
use crate::store::TaskStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The one running timer, client-wide.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimer {
    pub task_id: String,
    pub task_name: String,
    /// Session of the timed task's root.
    #[serde(default)]
    pub session_date: Option<NaiveDate>,
    pub started_at: DateTime<Utc>,
    /// Task duration when the timer started.
    pub base_duration: u64,
    /// Uncommitted log marks of this run.
    pub pending_logs: Vec<TimerLog>,
}

impl ActiveTimer {
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }

    pub fn duration_at(&self, now: DateTime<Utc>) -> u64 {
        self.base_duration + self.elapsed_at(now)
    }
}

pub struct TimerController<S: TaskStore + ?Sized> {
    store: Arc<S>,
    active: Option<ActiveTimer>,
}

impl<S: TaskStore + ?Sized> TimerController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            active: None,
        }
    }

    /// Controller picking up a timer saved by a previous process.
    pub fn resume(store: Arc<S>, active: Option<ActiveTimer>) -> Self {
        Self { store, active }
    }

    pub fn active(&self) -> Option<&ActiveTimer> {
        self.active.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Start timing `id`; a running timer on another task is committed first.
    pub async fn start(&mut self, id: &str) -> AppResult<ActiveTimer> {
        self.start_at(id, Utc::now()).await
    }

    pub async fn start_at(&mut self, id: &str, now: DateTime<Utc>) -> AppResult<ActiveTimer> {
        if let Some(current) = &self.active
            && current.task_id == id
        {
            return Ok(current.clone());
        }
        if self.active.is_some() {
            self.stop_at(now).await?;
        }

        let resolved = resolve_required(self.store.as_ref(), id).await?;
        let task = resolved.task();
        let timer = ActiveTimer {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            session_date: resolved.root.session_date,
            started_at: now,
            base_duration: task.duration,
            pending_logs: vec![TimerLog::start(now, task.duration)],
        };

        log::debug!("timer started on {} at {}s", timer.task_id, timer.base_duration);
        self.active = Some(timer.clone());
        Ok(timer)
    }

    /// Persist the running duration. Failures are logged and swallowed so a
    /// broken store never interrupts the timer.
    pub async fn tick(&self) {
        self.tick_at(Utc::now()).await;
    }

    pub async fn tick_at(&self, now: DateTime<Utc>) {
        let Some(timer) = &self.active else {
            return;
        };
        let duration = timer.duration_at(now);
        let result = update_node(self.store.as_ref(), &timer.task_id, |t| {
            t.duration = duration;
            Ok(())
        })
        .await;

        if let Err(e) = result {
            log::warn!("autosave of {} failed: {}", timer.task_id, e);
        }
    }

    /// Stop the timer and commit duration plus in-flight logs.
    /// Returns the committed task, or `None` if nothing was running or the
    /// task disappeared meanwhile.
    pub async fn stop(&mut self) -> AppResult<Option<Task>> {
        self.stop_at(Utc::now()).await
    }

    pub async fn stop_at(&mut self, now: DateTime<Utc>) -> AppResult<Option<Task>> {
        let Some(mut timer) = self.active.take() else {
            return Ok(None);
        };

        let duration = timer.duration_at(now);
        timer.pending_logs.push(TimerLog::stop(now, duration));

        let pending = timer.pending_logs.clone();
        let result = update_node(self.store.as_ref(), &timer.task_id, move |t| {
            t.duration = duration;
            t.timer_logs.extend(pending);
            Ok(t.clone())
        })
        .await;

        match result {
            Ok((_, task)) => Ok(Some(task)),
            Err(AppError::NotFound(id)) => {
                log::warn!("timer stopped for {id}, but the task no longer exists");
                Ok(None)
            }
            Err(e) => {
                // keep the session so a later stop can retry the commit
                timer.pending_logs.pop();
                self.active = Some(timer);
                Err(e)
            }
        }
    }

    /// Keep the running timer on `task` after `old_id` was renamed or split
    /// into it. Returns whether the timer was affected.
    pub fn follow_rename(&mut self, old_id: &str, task: &Task) -> bool {
        match &mut self.active {
            Some(timer) if timer.task_id == old_id => {
                timer.task_id = task.id.clone();
                timer.task_name = task.name.clone();
                true
            }
            _ => false,
        }
    }

    /// Drop the running timer without committing it (its task is gone).
    pub fn discard(&mut self) -> Option<ActiveTimer> {
        self.active.take()
    }

    /// Moving to another session date commits a timer running in a
    /// different partition. Returns the committed task, if any.
    pub async fn switch_session(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<Option<Task>> {
        let leaving = self
            .active
            .as_ref()
            .is_some_and(|t| t.session_date.unwrap_or(today) != date);
        if leaving { self.stop().await } else { Ok(None) }
    }
}
