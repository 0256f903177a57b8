use super::TaskGateway;
use crate::errors::{AppError, AppResult};
use crate::models::Task;
use crate::utils::date::{format_date, last_days, now_ms, today};
use async_trait::async_trait;
use chrono::{Local, NaiveDate, TimeZone};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;

const SEED_NAMES: &[&str] = &[
    "Morning Standup",
    "Code Review",
    "Feature Development",
    "Bug Fixes",
    "Documentation",
    "Team Meeting",
    "Design Session",
    "Testing",
    "Deployment",
    "Research",
    "Learning",
    "Planning",
    "Client Call",
    "Refactoring",
    "Performance Optimization",
];

/// In-process stand-in for the sync server.
///
/// Behaves like the real server (normalization on upsert, newest-first
/// listings) and adds a fixed latency to every call. With a backing file the
/// state survives between processes.
pub struct SimulatedGateway {
    tasks: Mutex<HashMap<String, Task>>,
    file: Option<PathBuf>,
    latency: Duration,
}

impl SimulatedGateway {
    pub fn new(latency: Duration) -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            file: None,
            latency,
        }
    }

    /// Simulator persisted as a JSON array in `path` (created on first write).
    pub fn with_file(path: PathBuf, latency: Duration) -> AppResult<Self> {
        let tasks = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                let list: Vec<Task> = serde_json::from_str(&content)?;
                list.into_iter().map(|t| (t.id.clone(), t)).collect()
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            tasks: Mutex::new(tasks),
            file: Some(path),
            latency,
        })
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn persist(&self, tasks: &HashMap<String, Task>) -> AppResult<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&sorted(tasks.values().cloned().collect()))?;
        fs::write(path, json)
            .map_err(|e| AppError::GatewayUnreachable(format!("simulated store write: {e}")))
    }

    /// What the server does to an incoming record before storing it.
    fn normalize(mut task: Task) -> Task {
        let now = now_ms();
        if task.name.trim().is_empty() {
            task.name = "Untitled".to_string();
        }
        if task.session_date.is_none() {
            task.session_date = Some(today());
        }
        if task.created_at == 0 {
            task.created_at = now;
        }
        if task.updated_at == 0 {
            task.updated_at = now;
        }
        if task.has_subtasks() {
            task.duration = task.total_duration();
        }
        task
    }
}

fn sorted(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    tasks
}

fn seed_task(date: NaiveDate, index: usize, rng: &mut impl Rng) -> Task {
    let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
    let created_at = Local
        .from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.timestamp_millis() - (index as i64) * 3_600_000)
        .unwrap_or_else(now_ms);

    Task {
        id: format!("seed_{}_{}", format_date(&date), index),
        name: SEED_NAMES
            .choose(rng)
            .copied()
            .unwrap_or("Planning")
            .to_string(),
        duration: rng.gen_range(900..=7200),
        created_at,
        updated_at: created_at,
        session_date: Some(date),
        timer_logs: Vec::new(),
        subtasks: Vec::new(),
    }
}

#[async_trait]
impl TaskGateway for SimulatedGateway {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn health(&self) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_by_date(&self, date: NaiveDate) -> AppResult<Vec<Task>> {
        self.delay().await;
        let tasks = self.tasks.lock().await;
        Ok(sorted(
            tasks
                .values()
                .filter(|t| t.session_date == Some(date))
                .cloned()
                .collect(),
        ))
    }

    async fn fetch_by_id(&self, id: &str) -> AppResult<Option<Task>> {
        self.delay().await;
        Ok(self.tasks.lock().await.get(id).cloned())
    }

    async fn fetch_all(&self) -> AppResult<Vec<Task>> {
        self.delay().await;
        Ok(sorted(self.tasks.lock().await.values().cloned().collect()))
    }

    async fn upsert(&self, task: &Task) -> AppResult<Task> {
        self.delay().await;
        let saved = Self::normalize(task.clone());
        let mut tasks = self.tasks.lock().await;
        tasks.insert(saved.id.clone(), saved.clone());
        self.persist(&tasks)?;
        Ok(saved)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.delay().await;
        let mut tasks = self.tasks.lock().await;
        if tasks.remove(id).is_some() {
            self.persist(&tasks)?;
        }
        Ok(())
    }

    async fn clear(&self) -> AppResult<usize> {
        self.delay().await;
        let mut tasks = self.tasks.lock().await;
        let n = tasks.len();
        tasks.clear();
        self.persist(&tasks)?;
        Ok(n)
    }

    async fn seed(&self) -> AppResult<usize> {
        self.delay().await;
        // ThreadRng is !Send, keep it out of the await points
        let created: Vec<Task> = {
            let mut rng = rand::thread_rng();
            let mut out = Vec::new();
            for date in last_days(30) {
                for i in 0..rng.gen_range(2..=5) {
                    out.push(seed_task(date, i, &mut rng));
                }
            }
            out
        };

        let n = created.len();
        let mut tasks = self.tasks.lock().await;
        for t in created {
            tasks.insert(t.id.clone(), t);
        }
        self.persist(&tasks)?;
        Ok(n)
    }
}
