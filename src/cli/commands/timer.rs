use crate::cli::context::{AppContext, session_date};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::{ActiveTimer, TaskLogic, TimerController};
use crate::errors::AppResult;
use crate::store::SqliteTaskStore;
use crate::ui::messages::{info, success};
use crate::utils::time::{format_duration, secs2readable};
use chrono::{NaiveDate, Utc};
use std::io::Write;
use std::time::Duration;

/// Handle `start`, `stop`, `status` and `track`.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Start { task, date } => {
            let date = session_date(date)?;
            let ctx = AppContext::open(cfg)?;
            let mut timer = ctx.timer().await?;

            let active = start_on(&ctx, &mut timer, task, date).await?;
            ctx.save_timer(&timer).await?;

            success(format!(
                "Timer started on '{}' at {}",
                active.task_name,
                format_duration(active.base_duration)
            ));
        }

        Commands::Stop => {
            let ctx = AppContext::open(cfg)?;
            let mut timer = ctx.timer().await?;
            stop_and_report(&ctx, &mut timer).await?;
        }

        Commands::Status => {
            let ctx = AppContext::open(cfg)?;
            let timer = ctx.timer().await?;
            match timer.active() {
                Some(active) => {
                    let now = Utc::now();
                    info(format!(
                        "⏱  '{}' running for {} (total {})",
                        active.task_name,
                        secs2readable(active.elapsed_at(now)),
                        format_duration(active.duration_at(now))
                    ));
                }
                None => info("No timer running."),
            }
        }

        Commands::Track { task, date } => {
            let date = session_date(date)?;
            let ctx = AppContext::open(cfg)?;
            let mut timer = ctx.timer().await?;

            let active = start_on(&ctx, &mut timer, task, date).await?;
            ctx.save_timer(&timer).await?;
            info(format!("Tracking '{}', press Ctrl-C to stop.", active.task_name));

            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        timer.tick().await;
                        if let Some(a) = timer.active() {
                            print!("\r⏱  {}  {}", a.task_name, format_duration(a.duration_at(Utc::now())));
                            let _ = std::io::stdout().flush();
                        }
                    }
                    _ = &mut ctrl_c => {
                        println!();
                        break;
                    }
                }
            }

            stop_and_report(&ctx, &mut timer).await?;
        }

        _ => {}
    }

    Ok(())
}

/// Resolve `key` (id or session task name, created when unknown) and start.
async fn start_on(
    ctx: &AppContext,
    timer: &mut TimerController<SqliteTaskStore>,
    key: &str,
    date: NaiveDate,
) -> AppResult<ActiveTimer> {
    let task = match TaskLogic::lookup(ctx.store.as_ref(), key, date).await? {
        Some(t) => t,
        None => {
            let t = TaskLogic::create(ctx.store.as_ref(), key, date).await?;
            ctx.store
                .audit("add", &t.id, &format!("Created '{}' on timer start", t.name))
                .await;
            info(format!("Created task '{}' [{}]", t.name, t.id));
            t
        }
    };

    if let Some(previous) = timer.active()
        && previous.task_id != task.id
    {
        info(format!("Stopping timer on '{}' first.", previous.task_name));
    }

    let previous_id = timer.active().map(|a| a.task_id.clone());
    let active = timer.start(&task.id).await?;
    if let Some(prev) = previous_id
        && prev != active.task_id
    {
        ctx.store.audit("stop", &prev, "Timer stopped by a new start").await;
    }
    ctx.store
        .audit("start", &active.task_id, &format!("Timer started on '{}'", active.task_name))
        .await;
    Ok(active)
}

async fn stop_and_report(
    ctx: &AppContext,
    timer: &mut TimerController<SqliteTaskStore>,
) -> AppResult<()> {
    if !timer.is_running() {
        info("No timer running.");
        return Ok(());
    }

    let committed = timer.stop().await?;
    ctx.save_timer(timer).await?;

    match committed {
        Some(task) => {
            ctx.store
                .audit("stop", &task.id, &format!("Duration now {}s", task.duration))
                .await;
            success(format!(
                "Timer stopped on '{}': {}",
                task.name,
                format_duration(task.duration)
            ));
        }
        None => info("Timer stopped; the task no longer exists."),
    }
    Ok(())
}
