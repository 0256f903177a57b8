use crate::cli::context::AppContext;
use crate::cli::parser::{Commands, ServerAction};
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Server { action } = cmd {
        let ctx = AppContext::open(cfg)?;
        let gateway = ctx.gateway().await?;

        match action {
            ServerAction::Health => {
                gateway.health().await?;
                success(format!("{} backend is healthy.", gateway.name()));
            }
            ServerAction::Seed => {
                let n = gateway.seed().await?;
                ctx.store
                    .audit("seed", gateway.name(), &format!("{n} sample tasks"))
                    .await;
                success(format!("Seeded {} sample tasks on the {} backend.", n, gateway.name()));
            }
            ServerAction::Clear => {
                let n = gateway.clear().await?;
                ctx.store
                    .audit("clear", gateway.name(), &format!("{n} tasks removed"))
                    .await;
                success(format!("Removed {} tasks from the {} backend.", n, gateway.name()));
            }
        }
    }

    Ok(())
}
