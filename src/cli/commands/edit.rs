use crate::cli::context::AppContext;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::{RenameOutcome, TaskLogic};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::time::{format_duration, parse_duration};

/// Handle `edit --duration` and `rename`.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Edit { id, duration } => {
            let secs = parse_duration(duration)?;
            let ctx = AppContext::open(cfg)?;

            let task = TaskLogic::set_duration(ctx.store.as_ref(), id, secs).await?;

            ctx.store
                .audit("edit", &task.id, &format!("Duration set to {}s", secs))
                .await;
            success(format!(
                "Duration of '{}' set to {}",
                task.name,
                format_duration(task.duration)
            ));
        }

        Commands::Rename { id, name } => {
            let ctx = AppContext::open(cfg)?;
            let engine = ctx.engine().await?;

            let outcome = engine.rename(id, name).await?;

            // a detached timer must keep pointing at the live record
            let (old_id, renamed) = match &outcome {
                RenameOutcome::Split { old_id, task } => (old_id.as_str(), task),
                RenameOutcome::Renamed(task) => (task.id.as_str(), task),
            };
            let mut timer = ctx.timer().await?;
            if timer.follow_rename(old_id, renamed) {
                ctx.save_timer(&timer).await?;
            }

            match outcome {
                RenameOutcome::Split { old_id, task } => {
                    ctx.store
                        .audit("rename", &task.id, &format!("Split from {} as '{}'", old_id, task.name))
                        .await;
                    success(format!("Renamed to '{}' as new task [{}]", task.name, task.id));
                    info(format!(
                        "{} stays on the server under its old name and will be listed again on the next load.",
                        old_id
                    ));
                }
                RenameOutcome::Renamed(task) => {
                    ctx.store
                        .audit("rename", &task.id, &format!("Renamed to '{}'", task.name))
                        .await;
                    success(format!("Renamed to '{}'", task.name));
                }
            }
        }

        _ => {}
    }

    Ok(())
}
