use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Create the `tasks` table. Logs and subtasks are stored as JSON text;
/// a root task and its whole subtask tree are a single row.
fn create_tasks_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id            TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            duration      INTEGER NOT NULL DEFAULT 0,
            session_date  TEXT,
            created_at    INTEGER NOT NULL,
            updated_at    INTEGER NOT NULL DEFAULT 0,
            timer_logs    TEXT NOT NULL DEFAULT '[]',
            subtasks      TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_session_date ON tasks(session_date);
        CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
        "#,
    )?;
    Ok(())
}

/// Databases created before subtasks / updated_at existed get the columns added.
fn migrate_task_columns(conn: &Connection) -> Result<()> {
    if !table_has_column(conn, "tasks", "subtasks")? {
        log::info!("adding 'subtasks' column to tasks table");
        conn.execute(
            "ALTER TABLE tasks ADD COLUMN subtasks TEXT NOT NULL DEFAULT '[]'",
            [],
        )?;
        mark_applied(conn, "add_subtasks_column", "Added subtasks to tasks")?;
    }

    if !table_has_column(conn, "tasks", "updated_at")? {
        log::info!("adding 'updated_at' column to tasks table");
        conn.execute_batch(
            r#"
            ALTER TABLE tasks ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0;
            UPDATE tasks SET updated_at = created_at WHERE updated_at = 0;
            "#,
        )?;
        mark_applied(conn, "add_updated_at_column", "Added updated_at to tasks")?;
    }

    Ok(())
}

/// Single-row table holding the detached (start/stop) timer session.
fn create_active_timer_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS active_timer (
            slot     INTEGER PRIMARY KEY CHECK(slot = 1),
            payload  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Public entry point: run all pending migrations. Idempotent.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    if table_exists(conn, "tasks")? {
        migrate_task_columns(conn)?;
    }
    create_tasks_table(conn)?;
    create_active_timer_table(conn)?;

    Ok(())
}
