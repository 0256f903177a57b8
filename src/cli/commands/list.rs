use crate::cli::context::{AppContext, session_date};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::{Task, TaskView};
use crate::ui::messages::{header, info, warning};
use crate::utils::colors::{BOLD, GREY, RESET, colorize_duration, colorize_status};
use crate::utils::date::{format_date, next_day, previous_day, today};
use crate::utils::time::format_duration;

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        date,
        prev,
        next,
        json,
    } = cmd
    {
        let mut day = session_date(date)?;
        if *prev {
            day = previous_day(day);
        } else if *next {
            day = next_day(day);
        }

        let ctx = AppContext::open(cfg)?;
        ctx.leave_other_sessions(day).await?;

        let engine = ctx.engine().await?;
        let load = engine.load_session(day, today()).await?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&load.tasks)?);
            return Ok(());
        }

        header(format!(
            "Tasks for {} ({} backend)",
            format_date(&day),
            engine.gateway().name()
        ));

        if load.offline {
            warning("Server unreachable: showing local tasks only.");
        }
        if !load.imported.is_empty() {
            info(format!("Imported {} task(s) from the server.", load.imported.len()));
        }

        if load.tasks.is_empty() {
            println!("{GREY}No tasks for this session.{RESET}");
            return Ok(());
        }

        let name_w = load
            .tasks
            .iter()
            .map(|v| widest_name(&v.task, 0))
            .max()
            .unwrap_or(4)
            .clamp(4, 48);

        println!(
            "{BOLD}{:<36}  {:<name_w$}  {:>9}  STATUS{RESET}",
            "ID",
            "NAME",
            "DURATION",
            name_w = name_w
        );

        for view in &load.tasks {
            print_view(view, name_w);
        }

        println!();
        println!(
            "{BOLD}Total:{RESET} {}",
            format_duration(load.total_duration())
        );
    }

    Ok(())
}

fn widest_name(task: &Task, depth: usize) -> usize {
    let own = task.name.chars().count() + depth * 2;
    task.subtasks
        .iter()
        .map(|s| widest_name(s, depth + 1))
        .fold(own, usize::max)
}

fn print_view(view: &TaskView, name_w: usize) {
    let t = &view.task;
    println!(
        "{:<36}  {:<name_w$}  {:>9}  {}",
        t.id,
        t.name,
        colorize_duration(&format_duration(t.duration), t.duration),
        colorize_status(view.sync_status),
        name_w = name_w
    );
    for sub in &t.subtasks {
        print_subtask(sub, 1, name_w);
    }
}

fn print_subtask(task: &Task, depth: usize, name_w: usize) {
    let label = format!("{}└ {}", "  ".repeat(depth - 1), task.name);
    println!(
        "{GREY}{:<36}{RESET}  {:<name_w$}  {:>9}  {GREY}local{RESET}",
        task.id,
        label,
        colorize_duration(&format_duration(task.duration), task.duration),
        name_w = name_w
    );
    for sub in &task.subtasks {
        print_subtask(sub, depth + 1, name_w);
    }
}
