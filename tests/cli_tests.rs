use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init, list_json, rtt, rtt_with, setup_sim_store, setup_test_db};

const DATE: &str = "2025-08-04";

fn ids(tasks: &[serde_json::Value]) -> Vec<String> {
    tasks
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

fn add(db: &str, sim: &str, name: &str) -> String {
    rtt_with(db, sim)
        .args(["add", name, "--date", DATE])
        .assert()
        .success();
    list_json(db, sim, DATE)
        .into_iter()
        .find(|t| t["name"] == name)
        .and_then(|t| t["id"].as_str().map(str::to_string))
        .expect("task listed")
}

#[test]
fn init_creates_the_database() {
    let db = setup_test_db("cli_init");
    rtt()
        .args(["--db", &db, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("initialization completed"));
    assert!(fs::metadata(&db).is_ok());
}

#[test]
fn new_task_is_missing_until_pushed() {
    let db = setup_test_db("cli_push");
    let sim = setup_sim_store("cli_push");
    init(&db);

    let id = add(&db, &sim, "Write report");
    let tasks = list_json(&db, &sim, DATE);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["syncStatus"], "missing");

    rtt_with(&db, &sim)
        .args(["push", &id])
        .assert()
        .success()
        .stdout(contains("uploaded"));

    let tasks = list_json(&db, &sim, DATE);
    assert_eq!(tasks[0]["syncStatus"], "consistent");
}

#[test]
fn list_table_shows_status_and_total() {
    let db = setup_test_db("cli_table");
    let sim = setup_sim_store("cli_table");
    init(&db);
    let id = add(&db, &sim, "Planning");

    rtt_with(&db, &sim)
        .args(["sub", &id, "Agenda"])
        .assert()
        .success();

    rtt_with(&db, &sim)
        .args(["list", "--date", DATE])
        .assert()
        .success()
        .stdout(contains("Planning").and(contains("└ Agenda")).and(contains("missing")).and(contains("Total:")));
}

#[test]
fn seeded_server_tasks_are_imported_on_list() {
    let db = setup_test_db("cli_seed");
    let sim = setup_sim_store("cli_seed");
    init(&db);

    rtt_with(&db, &sim)
        .args(["server", "seed"])
        .assert()
        .success()
        .stdout(contains("Seeded"));

    let out = rtt_with(&db, &sim).args(["list", "--json"]).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let tasks: Vec<serde_json::Value> = serde_json::from_str(&stdout[stdout.find('[').unwrap()..]).unwrap();
    assert!(tasks.len() >= 2);
    assert!(tasks.iter().all(|t| t["syncStatus"] == "consistent"));
}

#[test]
fn edit_duration_accepts_clock_formats() {
    let db = setup_test_db("cli_edit");
    let sim = setup_sim_store("cli_edit");
    init(&db);
    let id = add(&db, &sim, "Edit me");

    rtt_with(&db, &sim)
        .args(["edit", &id, "--duration", "1:30:00"])
        .assert()
        .success()
        .stdout(contains("01:30:00"));
    assert_eq!(list_json(&db, &sim, DATE)[0]["duration"], 5400);

    rtt_with(&db, &sim)
        .args(["edit", &id, "--duration", "1:xx"])
        .assert()
        .failure()
        .stderr(contains("Invalid time"));
}

#[test]
fn rename_of_pushed_task_splits_it() {
    let db = setup_test_db("cli_rename");
    let sim = setup_sim_store("cli_rename");
    init(&db);
    let id = add(&db, &sim, "Old title");
    rtt_with(&db, &sim).args(["push", &id]).assert().success();

    rtt_with(&db, &sim)
        .args(["rename", &id, "New title"])
        .assert()
        .success()
        .stdout(contains("as new task"));

    // the server copy comes back under its old name next to the new task
    let tasks = list_json(&db, &sim, DATE);
    assert_eq!(tasks.len(), 2);
    assert!(ids(&tasks).contains(&id));
    let renamed = tasks.iter().find(|t| t["name"] == "New title").unwrap();
    assert_eq!(renamed["syncStatus"], "missing");
}

#[test]
fn running_timer_survives_a_rename_split() {
    let db = setup_test_db("cli_rename_timer");
    let sim = setup_sim_store("cli_rename_timer");
    init(&db);
    let id = add(&db, &sim, "Old title");
    rtt_with(&db, &sim).args(["push", &id]).assert().success();

    rtt_with(&db, &sim).args(["start", &id, "--date", DATE]).assert().success();
    rtt_with(&db, &sim)
        .args(["rename", &id, "New title"])
        .assert()
        .success()
        .stdout(contains("as new task"));

    rtt_with(&db, &sim)
        .args(["stop"])
        .assert()
        .success()
        .stdout(contains("Timer stopped on 'New title'"));

    let tasks = list_json(&db, &sim, DATE);
    let renamed = tasks.iter().find(|t| t["name"] == "New title").unwrap();
    assert_eq!(renamed["timerLogs"].as_array().unwrap().len(), 2);
}

#[test]
fn delete_of_pushed_task_resets_the_server_copy() {
    let db = setup_test_db("cli_del");
    let sim = setup_sim_store("cli_del");
    init(&db);
    let id = add(&db, &sim, "Short lived");
    rtt_with(&db, &sim).args(["edit", &id, "--duration", "600"]).assert().success();
    rtt_with(&db, &sim).args(["push", &id]).assert().success();

    rtt_with(&db, &sim)
        .args(["del", &id, "--yes"])
        .assert()
        .success()
        .stdout(contains("server copy reset to 0"));

    let server: Vec<serde_json::Value> = serde_json::from_str(&fs::read_to_string(&sim).unwrap()).unwrap();
    let copy = server.iter().find(|t| t["id"] == id.as_str()).unwrap();
    assert_eq!(copy["duration"], 0);
    assert_eq!(copy["timerLogs"].as_array().unwrap().len(), 0);
}

#[test]
fn delete_local_task_needs_no_confirmation() {
    let db = setup_test_db("cli_del_local");
    let sim = setup_sim_store("cli_del_local");
    init(&db);
    let id = add(&db, &sim, "Scratch");

    rtt_with(&db, &sim)
        .args(["del", &id])
        .assert()
        .success()
        .stdout(contains("local only"));
    assert!(list_json(&db, &sim, DATE).is_empty());
}

#[test]
fn timer_start_status_stop() {
    let db = setup_test_db("cli_timer");
    let sim = setup_sim_store("cli_timer");
    init(&db);

    rtt_with(&db, &sim)
        .args(["start", "Focus", "--date", DATE])
        .assert()
        .success()
        .stdout(contains("Created task 'Focus'"));

    rtt_with(&db, &sim)
        .args(["status"])
        .assert()
        .success()
        .stdout(contains("'Focus' running"));

    rtt_with(&db, &sim)
        .args(["stop"])
        .assert()
        .success()
        .stdout(contains("Timer stopped on 'Focus'"));

    rtt_with(&db, &sim)
        .args(["status"])
        .assert()
        .success()
        .stdout(contains("No timer running"));

    let tasks = list_json(&db, &sim, DATE);
    assert_eq!(tasks[0]["timerLogs"].as_array().unwrap().len(), 2);
}

#[test]
fn upload_all_pushes_every_candidate() {
    let db = setup_test_db("cli_upload");
    let sim = setup_sim_store("cli_upload");
    init(&db);
    add(&db, &sim, "One");
    add(&db, &sim, "Two");

    rtt_with(&db, &sim)
        .args(["upload", "--date", DATE, "--all"])
        .assert()
        .success()
        .stdout(contains("2 task(s) uploaded"));

    rtt_with(&db, &sim)
        .args(["upload", "--date", DATE, "--all"])
        .assert()
        .success()
        .stdout(contains("nothing to upload"));
}

#[test]
fn pull_of_local_only_task_fails() {
    let db = setup_test_db("cli_pull");
    let sim = setup_sim_store("cli_pull");
    init(&db);
    let id = add(&db, &sim, "Local");

    rtt_with(&db, &sim)
        .args(["pull", &id, "--yes"])
        .assert()
        .failure()
        .stderr(contains("not on server"));
}

#[test]
fn invalid_date_is_rejected() {
    let db = setup_test_db("cli_bad_date");
    let sim = setup_sim_store("cli_bad_date");
    init(&db);

    rtt_with(&db, &sim)
        .args(["list", "--date", "2025-13-40"])
        .assert()
        .failure()
        .stderr(contains("Invalid date"));
}

#[test]
fn audit_log_records_mutations() {
    let db = setup_test_db("cli_log");
    let sim = setup_sim_store("cli_log");
    init(&db);
    add(&db, &sim, "Logged");

    rtt_with(&db, &sim)
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("add").and(contains("init")));
}
