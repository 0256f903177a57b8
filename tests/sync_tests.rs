use rtimetracker::core::{AutoConfirm, DeleteOutcome, PullOutcome, RenameOutcome, SyncEngine, TaskLogic, compare_tasks};
use rtimetracker::errors::AppError;
use rtimetracker::models::{SyncStatus, Task, TimerLog};
use rtimetracker::store::{MemoryTaskStore, TaskStore};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::Ordering;

mod common;
use common::{FakeGateway, day, task_on};

const DATE: &str = "2025-03-10";

fn setup(server: Vec<Task>) -> (Arc<MemoryTaskStore>, Arc<FakeGateway>, SyncEngine) {
    let store = Arc::new(MemoryTaskStore::new());
    let gw = Arc::new(FakeGateway::with_tasks(server));
    let engine = SyncEngine::new(store.clone(), gw.clone());
    (store, gw, engine)
}

fn status_of(load: &rtimetracker::core::SessionLoad, id: &str) -> SyncStatus {
    load.tasks
        .iter()
        .find(|v| v.task.id == id)
        .map(|v| v.sync_status)
        .expect("task in session")
}

// ---------------------------------------------------------------
// compare
// ---------------------------------------------------------------

#[test]
fn compare_is_consistent_on_equal_fields() {
    let t = task_on("Review", DATE, 120);
    assert_eq!(compare_tasks(&t, Some(&t.clone())), SyncStatus::Consistent);
    assert_eq!(compare_tasks(&t, None), SyncStatus::Missing);
}

#[test]
fn compare_flags_name_duration_and_log_count() {
    let local = task_on("Review", DATE, 120);

    let mut other = local.clone();
    other.duration = 121;
    assert_eq!(compare_tasks(&local, Some(&other)), SyncStatus::Inconsistent);

    let mut other = local.clone();
    other.name = "review".into();
    assert_eq!(compare_tasks(&local, Some(&other)), SyncStatus::Inconsistent);

    let mut other = local.clone();
    other.timer_logs.push(TimerLog::start(Utc::now(), 0));
    assert_eq!(compare_tasks(&local, Some(&other)), SyncStatus::Inconsistent);
}

#[test]
fn compare_ignores_timestamps_and_subtasks() {
    let local = task_on("Review", DATE, 120);
    let mut other = local.clone();
    other.updated_at += 10_000;
    other.subtasks.push(task_on("child", DATE, 5));
    assert_eq!(compare_tasks(&local, Some(&other)), SyncStatus::Consistent);
}

// ---------------------------------------------------------------
// merge-on-load
// ---------------------------------------------------------------

#[tokio::test]
async fn load_imports_server_only_tasks_as_consistent() {
    let remote = task_on("Remote", DATE, 300);
    let (store, _gw, engine) = setup(vec![remote.clone()]);

    let load = engine.load_session(day(DATE), day(DATE)).await.unwrap();

    assert!(!load.offline);
    assert_eq!(load.imported, vec![remote.id.clone()]);
    assert_eq!(status_of(&load, &remote.id), SyncStatus::Consistent);
    assert!(store.get(&remote.id).await.unwrap().is_some());
}

#[tokio::test]
async fn load_is_idempotent() {
    let remote = task_on("Remote", DATE, 300);
    let (store, _gw, engine) = setup(vec![remote.clone()]);
    store.add(task_on("Local", DATE, 10)).await.unwrap();

    let first = engine.load_session(day(DATE), day(DATE)).await.unwrap();
    let second = engine.load_session(day(DATE), day(DATE)).await.unwrap();

    assert!(second.imported.is_empty());
    assert_eq!(first.tasks.len(), second.tasks.len());
    for v in &first.tasks {
        assert_eq!(status_of(&second, &v.task.id), v.sync_status);
    }
}

#[tokio::test]
async fn load_classifies_local_copies() {
    let same = task_on("Same", DATE, 60);
    let drifted = task_on("Drifted", DATE, 60);
    let (store, _gw, engine) = setup(vec![same.clone(), drifted.clone()]);

    store.add(same.clone()).await.unwrap();
    let mut local_drift = drifted.clone();
    local_drift.duration = 90;
    store.add(local_drift).await.unwrap();
    let local_only = store.add(task_on("Local only", DATE, 5)).await.unwrap();

    let load = engine.load_session(day(DATE), day(DATE)).await.unwrap();

    assert!(load.imported.is_empty());
    assert_eq!(status_of(&load, &same.id), SyncStatus::Consistent);
    assert_eq!(status_of(&load, &drifted.id), SyncStatus::Inconsistent);
    assert_eq!(status_of(&load, &local_only.id), SyncStatus::Missing);
    assert_eq!(load.needing_upload().len(), 2);
    // inconsistent local copy is never overwritten by the load
    assert_eq!(store.get(&drifted.id).await.unwrap().unwrap().duration, 90);
}

#[tokio::test]
async fn load_strips_subtasks_and_pins_session_of_imported_tasks() {
    let mut remote = task_on("Remote", DATE, 30);
    remote.subtasks.push(task_on("stray", DATE, 1));
    let (store, _gw, engine) = setup(vec![remote.clone()]);

    engine.load_session(day(DATE), day(DATE)).await.unwrap();

    let saved = store.get(&remote.id).await.unwrap().unwrap();
    assert!(saved.subtasks.is_empty());
    assert_eq!(saved.session_date, Some(day(DATE)));
}

#[tokio::test]
async fn load_goes_offline_when_server_fails() {
    let (store, gw, engine) = setup(vec![task_on("Remote", DATE, 1)]);
    let local = store.add(task_on("Local", DATE, 5)).await.unwrap();
    gw.set_offline(true);

    let load = engine.load_session(day(DATE), day(DATE)).await.unwrap();

    assert!(load.offline);
    assert!(load.imported.is_empty());
    assert_eq!(load.tasks.len(), 1);
    assert_eq!(status_of(&load, &local.id), SyncStatus::Missing);
}

#[tokio::test]
async fn load_only_lists_the_requested_session() {
    let (store, _gw, engine) = setup(vec![]);
    store.add(task_on("Monday", "2025-03-10", 1)).await.unwrap();
    store.add(task_on("Tuesday", "2025-03-11", 1)).await.unwrap();

    let load = engine.load_session(day("2025-03-11"), day("2025-03-11")).await.unwrap();
    assert_eq!(load.tasks.len(), 1);
    assert_eq!(load.tasks[0].task.name, "Tuesday");
}

// ---------------------------------------------------------------
// push / pull
// ---------------------------------------------------------------

#[tokio::test]
async fn push_keeps_parent_only_duration() {
    let (store, gw, engine) = setup(vec![]);
    let parent = TaskLogic::create(store.as_ref(), "Parent", day(DATE)).await.unwrap();
    TaskLogic::set_duration(store.as_ref(), &parent.id, 50).await.unwrap();
    let a = TaskLogic::add_subtask(store.as_ref(), &parent.id, "A").await.unwrap();
    let b = TaskLogic::add_subtask(store.as_ref(), &parent.id, "B").await.unwrap();
    TaskLogic::set_duration(store.as_ref(), &a.id, 100).await.unwrap();
    TaskLogic::set_duration(store.as_ref(), &b.id, 200).await.unwrap();
    gw.aggregate_for(&parent.id, 300);

    let view = engine.push(&parent.id).await.unwrap();

    let local = store.get(&parent.id).await.unwrap().unwrap();
    assert_eq!(local.duration, 50);
    assert_eq!(local.subtasks.len(), 2);
    assert_eq!(view.task.duration, 50);

    let remote = gw.stored(&parent.id).unwrap();
    assert_eq!(remote.duration, 350);
    assert!(remote.subtasks.is_empty());
}

#[tokio::test]
async fn push_makes_plain_task_consistent() {
    let (store, _gw, engine) = setup(vec![]);
    let task = store.add(task_on("Plain", DATE, 42)).await.unwrap();

    let view = engine.push(&task.id).await.unwrap();
    assert_eq!(view.sync_status, SyncStatus::Consistent);

    let load = engine.load_session(day(DATE), day(DATE)).await.unwrap();
    assert_eq!(status_of(&load, &task.id), SyncStatus::Consistent);
}

#[tokio::test]
async fn push_rejects_subtasks() {
    let (store, _gw, engine) = setup(vec![]);
    let parent = store.add(task_on("Parent", DATE, 0)).await.unwrap();
    let sub = TaskLogic::add_subtask(store.as_ref(), &parent.id, "Child").await.unwrap();

    let err = engine.push(&sub.id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn pull_asks_before_dropping_subtasks() {
    let remote = task_on("Shared", DATE, 900);
    let (store, _gw, engine) = setup(vec![remote.clone()]);
    let mut local = remote.clone();
    local.duration = 10;
    local.subtasks.push(task_on("Child", DATE, 5));
    store.add(local).await.unwrap();

    let outcome = engine.pull(&remote.id, &AutoConfirm(false)).await.unwrap();
    assert!(matches!(outcome, PullOutcome::Cancelled));
    assert_eq!(store.get(&remote.id).await.unwrap().unwrap().subtasks.len(), 1);

    let outcome = engine.pull(&remote.id, &AutoConfirm(true)).await.unwrap();
    let PullOutcome::Pulled(view) = outcome else {
        panic!("expected a pull");
    };
    assert_eq!(view.sync_status, SyncStatus::Consistent);
    let saved = store.get(&remote.id).await.unwrap().unwrap();
    assert_eq!(saved.duration, 900);
    assert!(saved.subtasks.is_empty());
}

#[tokio::test]
async fn pull_of_unknown_server_task_is_not_found() {
    let (store, _gw, engine) = setup(vec![]);
    let local = store.add(task_on("Local", DATE, 1)).await.unwrap();

    let err = engine.pull(&local.id, &AutoConfirm(true)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

// ---------------------------------------------------------------
// rename
// ---------------------------------------------------------------

#[tokio::test]
async fn rename_splits_server_known_task() {
    let remote = task_on("Old name", DATE, 120);
    let (store, gw, engine) = setup(vec![remote.clone()]);
    engine.load_session(day(DATE), day(DATE)).await.unwrap();

    let outcome = engine.rename(&remote.id, "New name").await.unwrap();
    let RenameOutcome::Split { old_id, task } = outcome else {
        panic!("expected a split");
    };
    assert_eq!(old_id, remote.id);
    assert_ne!(task.id, remote.id);
    assert_eq!(task.name, "New name");
    assert_eq!(task.duration, 120);

    assert!(store.get(&remote.id).await.unwrap().is_none());
    assert_eq!(gw.stored(&remote.id).unwrap().name, "Old name");

    // next load brings the untouched server record back
    let load = engine.load_session(day(DATE), day(DATE)).await.unwrap();
    assert_eq!(load.imported, vec![remote.id.clone()]);
    assert_eq!(status_of(&load, &task.id), SyncStatus::Missing);
}

#[tokio::test]
async fn rename_local_only_task_in_place() {
    let (store, _gw, engine) = setup(vec![]);
    let task = store.add(task_on("Draft", DATE, 1)).await.unwrap();

    let outcome = engine.rename(&task.id, "Final").await.unwrap();
    assert!(matches!(outcome, RenameOutcome::Renamed(ref t) if t.id == task.id));
    assert_eq!(store.get(&task.id).await.unwrap().unwrap().name, "Final");
}

#[tokio::test]
async fn rename_fails_when_server_is_unreachable() {
    let (store, gw, engine) = setup(vec![]);
    let task = store.add(task_on("Draft", DATE, 1)).await.unwrap();
    gw.set_offline(true);

    let err = engine.rename(&task.id, "Final").await.unwrap_err();
    assert!(err.is_gateway());
    assert_eq!(store.get(&task.id).await.unwrap().unwrap().name, "Draft");
}

// ---------------------------------------------------------------
// delete
// ---------------------------------------------------------------

#[tokio::test]
async fn delete_known_task_soft_resets_server() {
    let mut remote = task_on("Shared", DATE, 600);
    remote.timer_logs.push(TimerLog::start(Utc::now(), 0));
    let (store, gw, engine) = setup(vec![remote.clone()]);
    store.add(remote.clone()).await.unwrap();

    let outcome = engine.delete(&remote.id, &AutoConfirm(false)).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert!(store.get(&remote.id).await.unwrap().is_some());

    let outcome = engine.delete(&remote.id, &AutoConfirm(true)).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted { server_reset: true });
    assert!(store.get(&remote.id).await.unwrap().is_none());

    let server = gw.stored(&remote.id).expect("soft delete keeps the record");
    assert_eq!(server.duration, 0);
    assert!(server.timer_logs.is_empty());
    assert_eq!(gw.deletes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn delete_proceeds_when_server_reset_fails() {
    let remote = task_on("Shared", DATE, 600);
    let (store, gw, engine) = setup(vec![remote.clone()]);
    store.add(remote.clone()).await.unwrap();
    gw.fail_upsert_of(&remote.id);

    let outcome = engine.delete(&remote.id, &AutoConfirm(true)).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted { server_reset: false });
    assert!(store.get(&remote.id).await.unwrap().is_none());
    assert_eq!(gw.stored(&remote.id).unwrap().duration, 600);
}

#[tokio::test]
async fn delete_local_only_and_subtask_without_confirmation() {
    let (store, gw, engine) = setup(vec![]);
    let parent = store.add(task_on("Parent", DATE, 0)).await.unwrap();
    let child = TaskLogic::add_subtask(store.as_ref(), &parent.id, "Child").await.unwrap();

    let outcome = engine.delete(&child.id, &AutoConfirm(false)).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted { server_reset: false });
    assert!(store.get(&parent.id).await.unwrap().unwrap().subtasks.is_empty());

    let outcome = engine.delete(&parent.id, &AutoConfirm(false)).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted { server_reset: false });
    assert!(store.list_all().await.unwrap().is_empty());
    assert_eq!(gw.upserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn delete_of_unknown_id_is_not_found() {
    let (_store, _gw, engine) = setup(vec![]);
    let err = engine.delete("nope", &AutoConfirm(true)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

// ---------------------------------------------------------------
// bulk upload
// ---------------------------------------------------------------

#[tokio::test]
async fn bulk_upload_continues_past_failures() {
    let (store, gw, engine) = setup(vec![]);
    let a = store.add(task_on("A", DATE, 1)).await.unwrap();
    let b = store.add(task_on("B", DATE, 2)).await.unwrap();
    let c = store.add(task_on("C", DATE, 3)).await.unwrap();
    gw.fail_upsert_of(&b.id);

    let ids = vec![a.id.clone(), b.id.clone(), c.id.clone()];
    let report = engine.bulk_upload(&ids).await;

    assert!(!report.is_clean());
    assert_eq!(report.uploaded, vec![a.id.clone(), c.id.clone()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, b.id);
    assert!(gw.stored(&c.id).is_some());
}

#[tokio::test]
async fn upload_candidates_need_the_server() {
    let (store, gw, engine) = setup(vec![]);
    store.add(task_on("A", DATE, 1)).await.unwrap();

    let candidates = engine.upload_candidates(day(DATE), day(DATE)).await.unwrap();
    assert_eq!(candidates.len(), 1);

    gw.set_offline(true);
    let err = engine.upload_candidates(day(DATE), day(DATE)).await.unwrap_err();
    assert!(err.is_gateway());
}

#[tokio::test]
async fn lookup_status_is_none_when_offline() {
    let (store, gw, engine) = setup(vec![]);
    let a = store.add(task_on("A", DATE, 1)).await.unwrap();

    assert_eq!(engine.lookup_status(&a.id).await, Some(SyncStatus::Missing));
    gw.set_offline(true);
    assert_eq!(engine.lookup_status(&a.id).await, None);
}
