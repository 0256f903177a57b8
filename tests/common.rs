#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use async_trait::async_trait;
use chrono::NaiveDate;
use rtimetracker::errors::{AppError, AppResult};
use rtimetracker::gateway::TaskGateway;
use rtimetracker::models::Task;
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn rtt() -> Command {
    cargo_bin_cmd!("rtimetracker")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimetracker.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Fresh JSON file for the simulated server
pub fn setup_sim_store(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimetracker_server.json", name));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Command bound to a test database and a file-backed simulated server
pub fn rtt_with(db: &str, sim: &str) -> Command {
    let mut cmd = rtt();
    cmd.args(["--db", db, "--backend", "simulated", "--sim-store", sim, "--test"]);
    cmd
}

/// Initialize the DB schema for `db`
pub fn init(db: &str) {
    rtt().args(["--db", db, "--test", "init"]).assert().success();
}

/// `list --json` output parsed; informational lines before the array are skipped
pub fn list_json(db: &str, sim: &str, date: &str) -> Vec<serde_json::Value> {
    let out = rtt_with(db, sim)
        .args(["list", "--date", date, "--json"])
        .output()
        .expect("run list");
    assert!(out.status.success(), "list failed: {:?}", out);
    let stdout = String::from_utf8_lossy(&out.stdout);
    let start = stdout.find('[').expect("json array in output");
    serde_json::from_str(&stdout[start..]).expect("valid json")
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

pub fn task_on(name: &str, date: &str, duration: u64) -> Task {
    let mut t = Task::new(name, Some(day(date)));
    t.duration = duration;
    t
}

/// Scriptable in-memory server.
///
/// `offline` fails every call; `fail_upsert` fails uploads of the listed
/// ids; `aggregate` makes upserts answer with the aggregate duration the
/// real server reports for parents (own duration plus `extra`).
#[derive(Default)]
pub struct FakeGateway {
    pub tasks: Mutex<HashMap<String, Task>>,
    pub offline: AtomicBool,
    pub fail_upsert: Mutex<HashSet<String>>,
    pub aggregate: Mutex<HashMap<String, u64>>,
    pub upserts: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let gw = Self::default();
        {
            let mut map = gw.tasks.lock().unwrap();
            for t in tasks {
                map.insert(t.id.clone(), t);
            }
        }
        gw
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fail_upsert_of(&self, id: &str) {
        self.fail_upsert.lock().unwrap().insert(id.to_string());
    }

    pub fn aggregate_for(&self, id: &str, extra: u64) {
        self.aggregate.lock().unwrap().insert(id.to_string(), extra);
    }

    pub fn stored(&self, id: &str) -> Option<Task> {
        self.tasks.lock().unwrap().get(id).cloned()
    }

    fn check(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::GatewayUnreachable("fake server offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskGateway for FakeGateway {
    fn name(&self) -> &str {
        "fake"
    }

    async fn health(&self) -> AppResult<()> {
        self.check()
    }

    async fn fetch_by_date(&self, date: NaiveDate) -> AppResult<Vec<Task>> {
        self.check()?;
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.session_date == Some(date))
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: &str) -> AppResult<Option<Task>> {
        self.check()?;
        Ok(self.stored(id))
    }

    async fn fetch_all(&self) -> AppResult<Vec<Task>> {
        self.check()?;
        Ok(self.tasks.lock().unwrap().values().cloned().collect())
    }

    async fn upsert(&self, task: &Task) -> AppResult<Task> {
        self.check()?;
        if self.fail_upsert.lock().unwrap().contains(&task.id) {
            return Err(AppError::GatewayUnreachable(format!("upsert of {} rejected", task.id)));
        }
        self.upserts.fetch_add(1, Ordering::SeqCst);

        let mut saved = task.clone();
        if let Some(extra) = self.aggregate.lock().unwrap().get(&task.id) {
            saved.duration += extra;
        }
        self.tasks.lock().unwrap().insert(saved.id.clone(), saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.check()?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.tasks.lock().unwrap().remove(id);
        Ok(())
    }

    async fn clear(&self) -> AppResult<usize> {
        self.check()?;
        let mut map = self.tasks.lock().unwrap();
        let n = map.len();
        map.clear();
        Ok(n)
    }

    async fn seed(&self) -> AppResult<usize> {
        self.check()?;
        Ok(0)
    }
}
