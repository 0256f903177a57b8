use crate::errors::{AppError, AppResult};
use crate::models::{Task, TimerLog};
use crate::utils::date::{format_date, parse_date};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const TASK_COLUMNS: &str =
    "id, name, duration, session_date, created_at, updated_at, timer_logs, subtasks";

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

pub fn map_row(row: &Row) -> Result<Task> {
    let session_date = match row.get::<_, Option<String>>("session_date")? {
        Some(s) if !s.is_empty() => {
            Some(parse_date(&s).ok_or_else(|| conversion_error(3, AppError::InvalidDate(s)))?)
        }
        _ => None,
    };

    let logs_json: String = row.get("timer_logs")?;
    let timer_logs: Vec<TimerLog> =
        serde_json::from_str(&logs_json).map_err(|e| conversion_error(6, AppError::Json(e)))?;

    let subtasks_json: String = row.get("subtasks")?;
    let subtasks: Vec<Task> =
        serde_json::from_str(&subtasks_json).map_err(|e| conversion_error(7, AppError::Json(e)))?;

    Ok(Task {
        id: row.get("id")?,
        name: row.get("name")?,
        duration: row.get::<_, i64>("duration")?.max(0) as u64,
        session_date,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        timer_logs,
        subtasks,
    })
}

fn encode(task: &Task) -> AppResult<(i64, Option<String>, String, String)> {
    let duration = i64::try_from(task.duration).map_err(|_| {
        AppError::Validation(format!("duration of {} is out of range: {}", task.id, task.duration))
    })?;
    Ok((
        duration,
        task.session_date.as_ref().map(format_date),
        serde_json::to_string(&task.timer_logs)?,
        serde_json::to_string(&task.subtasks)?,
    ))
}

pub fn load_task(conn: &Connection, id: &str) -> AppResult<Option<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
    let task = conn.query_row(&sql, [id], map_row).optional()?;
    Ok(task)
}

/// Every root task, newest first.
pub fn load_all_tasks(conn: &Connection) -> AppResult<Vec<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, rowid DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn task_exists(conn: &Connection, id: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM tasks WHERE id = ?1")?;
    Ok(stmt.exists([id])?)
}

pub fn insert_task(conn: &Connection, task: &Task) -> AppResult<()> {
    let (duration, date, logs, subtasks) = encode(task)?;
    conn.execute(
        "INSERT INTO tasks (id, name, duration, session_date, created_at, updated_at, timer_logs, subtasks)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            task.id,
            task.name,
            duration,
            date,
            task.created_at,
            task.updated_at,
            logs,
            subtasks,
        ],
    )?;
    Ok(())
}

/// Insert or replace the whole row (root plus its subtask tree).
pub fn upsert_task(conn: &Connection, task: &Task) -> AppResult<()> {
    let (duration, date, logs, subtasks) = encode(task)?;
    conn.execute(
        "INSERT INTO tasks (id, name, duration, session_date, created_at, updated_at, timer_logs, subtasks)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             duration = excluded.duration,
             session_date = excluded.session_date,
             created_at = excluded.created_at,
             updated_at = excluded.updated_at,
             timer_logs = excluded.timer_logs,
             subtasks = excluded.subtasks",
        params![
            task.id,
            task.name,
            duration,
            date,
            task.created_at,
            task.updated_at,
            logs,
            subtasks,
        ],
    )?;
    Ok(())
}

/// Returns the number of removed rows (0 or 1).
pub fn delete_task(conn: &Connection, id: &str) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?)
}

pub fn clear_tasks(conn: &Connection) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM tasks", [])?)
}

pub fn load_active_timer(conn: &Connection) -> AppResult<Option<String>> {
    let payload = conn
        .query_row("SELECT payload FROM active_timer WHERE slot = 1", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(payload)
}

pub fn save_active_timer(conn: &Connection, payload: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO active_timer (slot, payload) VALUES (1, ?1)
         ON CONFLICT(slot) DO UPDATE SET payload = excluded.payload",
        [payload],
    )?;
    Ok(())
}

pub fn clear_active_timer(conn: &Connection) -> AppResult<()> {
    conn.execute("DELETE FROM active_timer", [])?;
    Ok(())
}
