use crate::cli::context::AppContext;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::{AutoConfirm, Confirm, DeleteOutcome, PromptConfirm};
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id, yes } = cmd {
        let ctx = AppContext::open(cfg)?;
        let engine = ctx.engine().await?;

        let confirm: Box<dyn Confirm> = if *yes {
            Box::new(AutoConfirm(true))
        } else {
            Box::new(PromptConfirm)
        };

        match engine.delete(id, confirm.as_ref()).await? {
            DeleteOutcome::Cancelled => {
                info("Operation cancelled.");
                return Ok(());
            }
            DeleteOutcome::Deleted { server_reset } => {
                let note = if server_reset {
                    "server copy reset to 0"
                } else {
                    "local only"
                };
                ctx.store.audit("del", id, &format!("Deleted ({note})")).await;
                success(format!("Task {} deleted ({}).", id, note));
            }
        }

        // a timer on the deleted task has nothing left to commit into
        let mut timer = ctx.timer().await?;
        if timer.active().is_some_and(|a| &a.task_id == id) {
            timer.discard();
            ctx.save_timer(&timer).await?;
            warning("The running timer belonged to this task and was discarded.");
        }
    }

    Ok(())
}
