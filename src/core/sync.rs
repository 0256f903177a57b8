//! Reconciliation engine: merge-on-load and the user-directed resolution
//! actions (push, pull, split-on-rename, delete with server reset, bulk
//! upload).
//!
//! Nothing here is cached between calls: every action re-reads the store
//! right before it mutates, since timer ticks may write concurrently.

use crate::core::compare::compare_tasks;
use crate::core::confirm::Confirm;
use crate::core::hierarchy::{self, remove_subtask};
use crate::core::session::filter_session;
use crate::core::tasks::TaskLogic;
use crate::errors::{AppError, AppResult};
use crate::gateway::TaskGateway;
use crate::models::{SyncStatus, Task, TaskView};
use crate::store::TaskStore;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Result of a merge-on-load pass for one session date.
#[derive(Debug, Clone)]
pub struct SessionLoad {
    pub date: NaiveDate,
    pub tasks: Vec<TaskView>,
    /// Server tasks materialized locally during this pass.
    pub imported: Vec<String>,
    /// The server could not be reached; statuses were computed against an
    /// empty server set.
    pub offline: bool,
}

impl SessionLoad {
    pub fn total_duration(&self) -> u64 {
        self.tasks.iter().map(|v| v.task.total_duration()).sum()
    }

    pub fn needing_upload(&self) -> Vec<&TaskView> {
        self.tasks
            .iter()
            .filter(|v| v.sync_status.needs_upload())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum PullOutcome {
    Pulled(TaskView),
    Cancelled,
}

#[derive(Debug, Clone)]
pub enum RenameOutcome {
    /// Server-known root: a new local task replaced the old id.
    Split { old_id: String, task: Task },
    Renamed(Task),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// `server_reset` tells whether the server copy was zeroed first.
    Deleted { server_reset: bool },
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl UploadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct SyncEngine {
    store: Arc<dyn TaskStore>,
    gateway: Arc<dyn TaskGateway>,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn TaskStore>, gateway: Arc<dyn TaskGateway>) -> Self {
        Self { store, gateway }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<dyn TaskGateway> {
        &self.gateway
    }

    // ---------------------------------------------------------------
    // Merge-on-load
    // ---------------------------------------------------------------

    /// Auto-download server tasks missing locally, then list the session
    /// with a freshly computed status per task. Never uploads anything.
    pub async fn load_session(&self, date: NaiveDate, today: NaiveDate) -> AppResult<SessionLoad> {
        // 1) server side, offline on failure
        let (server_tasks, offline) = match self.gateway.fetch_by_date(date).await {
            Ok(list) => (list, false),
            Err(e) => {
                log::warn!("fetching {date} from {} failed, working offline: {e}", self.gateway.name());
                (Vec::new(), true)
            }
        };

        // 2) local ids
        let local_ids: HashSet<String> = self
            .store
            .list_all()
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        // 3) materialize server-only tasks
        let mut imported = Vec::new();
        for server in &server_tasks {
            if local_ids.contains(&server.id) {
                continue;
            }
            let mut incoming = server.clone();
            incoming.session_date = Some(date);
            incoming.subtasks = Vec::new();
            self.store.overwrite(incoming).await?;
            imported.push(server.id.clone());
        }
        if !imported.is_empty() {
            log::info!("imported {} task(s) from server for {date}", imported.len());
        }

        // 4) reload and filter to the partition
        let session = filter_session(self.store.list_all().await?, date, today);

        // 5) status against the step 1 snapshot
        let by_id: HashMap<&str, &Task> = server_tasks.iter().map(|t| (t.id.as_str(), t)).collect();
        let tasks = session
            .into_iter()
            .map(|task| {
                let sync_status = compare_tasks(&task, by_id.get(task.id.as_str()).copied());
                TaskView { task, sync_status }
            })
            .collect();

        Ok(SessionLoad {
            date,
            tasks,
            imported,
            offline,
        })
    }

    /// Opportunistic single-task status; `None` when it cannot be determined.
    pub async fn lookup_status(&self, id: &str) -> Option<SyncStatus> {
        let local = match self.store.get(id).await {
            Ok(Some(t)) => t,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("status lookup for {id}: local read failed: {e}");
                return None;
            }
        };
        match self.gateway.fetch_by_id(id).await {
            Ok(server) => Some(compare_tasks(&local, server.as_ref())),
            Err(e) => {
                log::warn!("status lookup for {id}: server unreachable: {e}");
                None
            }
        }
    }

    // ---------------------------------------------------------------
    // Push / pull
    // ---------------------------------------------------------------

    async fn require_root(&self, id: &str) -> AppResult<Task> {
        let resolved = hierarchy::resolve_required(self.store.as_ref(), id).await?;
        if !resolved.is_root() {
            return Err(AppError::Validation(format!(
                "{id} is a subtask; only top-level tasks are synchronized"
            )));
        }
        Ok(resolved.root)
    }

    /// Upload one root task and merge the server response back.
    pub async fn push(&self, id: &str) -> AppResult<TaskView> {
        let local = self.require_root(id).await?;
        let saved = self.gateway.upsert(&local.for_upload()).await?;

        // the store may have moved on while the request was in flight
        let Some(current) = self.store.get(id).await? else {
            log::warn!("{id} was removed locally during push");
            return Ok(TaskView {
                sync_status: SyncStatus::Consistent,
                task: saved,
            });
        };

        let merged = if current.updated_at == local.updated_at {
            let merged = merge_push_response(&current, saved.clone());
            self.store.overwrite(merged).await?
        } else {
            log::info!("{id} changed locally during push, keeping local copy");
            current
        };

        Ok(TaskView {
            sync_status: compare_tasks(&merged, Some(&saved)),
            task: merged,
        })
    }

    /// Replace the local copy with the server's. Discarding local subtasks
    /// needs explicit confirmation.
    pub async fn pull(&self, id: &str, confirm: &dyn Confirm) -> AppResult<PullOutcome> {
        if let Some(resolved) = hierarchy::resolve(self.store.as_ref(), id).await?
            && !resolved.is_root()
        {
            return Err(AppError::Validation(format!(
                "{id} is a subtask; only top-level tasks are synchronized"
            )));
        }

        let mut incoming = self
            .gateway
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{id} (not on server)")))?;

        let local = self.store.get(id).await?;
        if let Some(local) = &local
            && local.has_subtasks()
        {
            let prompt = format!(
                "Pulling '{}' replaces the local copy and discards its {} subtask(s). Continue?",
                local.name,
                local.node_count() - 1
            );
            if !confirm.confirm(&prompt) {
                return Ok(PullOutcome::Cancelled);
            }
        }

        incoming.subtasks = Vec::new();
        if incoming.session_date.is_none() {
            incoming.session_date = local.as_ref().and_then(|l| l.session_date);
        }
        let saved = self.store.overwrite(incoming).await?;

        Ok(PullOutcome::Pulled(TaskView {
            sync_status: SyncStatus::Consistent,
            task: saved,
        }))
    }

    // ---------------------------------------------------------------
    // Rename / delete
    // ---------------------------------------------------------------

    /// Rename with split semantics for server-known roots.
    ///
    /// The renamed copy gets a fresh id and timestamps; the old local id is
    /// dropped so the untouched server record is re-materialized by the
    /// next merge-on-load.
    pub async fn rename(&self, id: &str, new_name: &str) -> AppResult<RenameOutcome> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("task name must not be empty".into()));
        }

        let resolved = hierarchy::resolve_required(self.store.as_ref(), id).await?;
        if !resolved.is_root() {
            let task = TaskLogic::rename_in_place(self.store.as_ref(), id, name).await?;
            return Ok(RenameOutcome::Renamed(task));
        }

        if self.gateway.fetch_by_id(id).await?.is_none() {
            let task = TaskLogic::rename_in_place(self.store.as_ref(), id, name).await?;
            return Ok(RenameOutcome::Renamed(task));
        }

        let old = resolved.root;
        let fresh = Task::new(name, old.session_date);
        let forked = Task {
            id: fresh.id,
            name: fresh.name,
            created_at: fresh.created_at,
            updated_at: fresh.updated_at,
            ..old.clone()
        };

        let forked = self.store.add(forked).await?;
        if let Err(e) = self.store.delete(&old.id).await {
            // undo the fork so the store is left as it was
            if let Err(undo) = self.store.delete(&forked.id).await {
                log::error!("rename of {}: could not remove fork {}: {undo}", old.id, forked.id);
            }
            return Err(e);
        }

        Ok(RenameOutcome::Split {
            old_id: old.id,
            task: forked,
        })
    }

    /// Delete a task. Server-known roots need confirmation and get a soft
    /// reset on the server (duration 0, no logs) before the local removal;
    /// a failing reset is logged and does not block the removal.
    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> AppResult<DeleteOutcome> {
        let resolved = hierarchy::resolve_required(self.store.as_ref(), id).await?;
        if !resolved.is_root() {
            remove_subtask(self.store.as_ref(), id).await?;
            return Ok(DeleteOutcome::Deleted {
                server_reset: false,
            });
        }

        let known = match self.gateway.fetch_by_id(id).await {
            Ok(server) => server.is_some(),
            Err(e) => {
                log::warn!("cannot tell whether {id} is on the server: {e}");
                true
            }
        };

        if !known {
            self.store.delete(id).await?;
            return Ok(DeleteOutcome::Deleted {
                server_reset: false,
            });
        }

        let prompt = format!(
            "'{}' is known to the server. Its server copy will be reset to 0 before deleting. Continue?",
            resolved.root.name
        );
        if !confirm.confirm(&prompt) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let mut reset = resolved.root.for_upload();
        reset.duration = 0;
        reset.timer_logs = Vec::new();
        reset.touch();

        let server_reset = match self.gateway.upsert(&reset).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("server reset of {id} failed, deleting locally anyway: {e}");
                false
            }
        };

        self.store.delete(id).await?;
        Ok(DeleteOutcome::Deleted { server_reset })
    }

    // ---------------------------------------------------------------
    // Bulk upload
    // ---------------------------------------------------------------

    /// Tasks of the session whose status is missing or inconsistent.
    pub async fn upload_candidates(&self, date: NaiveDate, today: NaiveDate) -> AppResult<Vec<TaskView>> {
        let load = self.load_session(date, today).await?;
        if load.offline {
            return Err(AppError::GatewayUnreachable(format!(
                "{} backend is not reachable",
                self.gateway.name()
            )));
        }
        Ok(load
            .tasks
            .into_iter()
            .filter(|v| v.sync_status.needs_upload())
            .collect())
    }

    /// Push each id in turn; a failure is recorded and the rest continue.
    pub async fn bulk_upload(&self, ids: &[String]) -> UploadReport {
        let mut report = UploadReport::default();
        for id in ids {
            match self.push(id).await {
                Ok(_) => report.uploaded.push(id.clone()),
                Err(e) => {
                    log::warn!("upload of {id} failed: {e}");
                    report.failed.push((id.clone(), e.to_string()));
                }
            }
        }
        report
    }
}

/// Fold the server's answer to a push into the local record.
///
/// For a parent the server reports the aggregate of parent and subtasks;
/// the local record keeps its own parent-only duration and its subtasks
/// and takes everything else from the server.
pub fn merge_push_response(local: &Task, saved: Task) -> Task {
    let duration = if local.has_subtasks() {
        local.duration
    } else {
        saved.duration
    };
    Task {
        duration,
        subtasks: local.subtasks.clone(),
        session_date: saved.session_date.or(local.session_date),
        ..saved
    }
}
