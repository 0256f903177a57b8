use crate::cli::context::AppContext;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::utils::colors::{RESET, color_for_operation};

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if !matches!(cmd, Commands::Log { print: true }) {
        return Ok(());
    }

    let ctx = AppContext::open(cfg)?;
    let entries = ctx.store.audit_entries().await?;

    let op_w = entries
        .iter()
        .map(|(_, _, op, target, _)| op_target(op, target).len())
        .max()
        .unwrap_or(10)
        .min(60);

    for (id, date, op, target, message) in &entries {
        let date = chrono::DateTime::parse_from_rfc3339(date)
            .map(|dt| dt.format("%FT%T%:z").to_string())
            .unwrap_or_else(|_| date.clone());

        println!(
            "{:>4}  {}  {}{:<op_w$}{}  {}",
            id,
            date,
            color_for_operation(op),
            op_target(op, target),
            RESET,
            message,
            op_w = op_w
        );
    }

    Ok(())
}

fn op_target(op: &str, target: &str) -> String {
    if target.is_empty() {
        op.to_string()
    } else {
        format!("{op} ({target})")
    }
}
