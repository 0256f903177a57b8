use crate::cli::context::{AppContext, session_date};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::TaskLogic;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::date::format_date;

/// Handle `add` (new root task) and `sub` (new subtask).
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Add { name, date } => {
            let date = session_date(date)?;
            let ctx = AppContext::open(cfg)?;

            let task = TaskLogic::create(ctx.store.as_ref(), name, date).await?;

            ctx.store
                .audit("add", &task.id, &format!("Created '{}' for {}", task.name, format_date(&date)))
                .await;
            success(format!("Task '{}' created for {} [{}]", task.name, format_date(&date), task.id));
        }

        Commands::Sub { parent, name } => {
            let ctx = AppContext::open(cfg)?;

            let sub = TaskLogic::add_subtask(ctx.store.as_ref(), parent, name).await?;

            ctx.store
                .audit("add", &sub.id, &format!("Subtask '{}' under {}", sub.name, parent))
                .await;
            success(format!("Subtask '{}' added under {} [{}]", sub.name, parent, sub.id));
        }

        _ => {}
    }

    Ok(())
}
