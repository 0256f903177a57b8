use crate::cli::context::{AppContext, session_date};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::{AutoConfirm, Confirm, PromptConfirm, PullOutcome};
use crate::errors::AppResult;
use crate::models::TaskView;
use crate::ui::messages::{error, header, info, success, warning};
use crate::utils::colors::colorize_status;
use crate::utils::date::today;
use crate::utils::time::format_duration;

/// Handle `push`, `pull` and `upload`.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Push { id } => {
            let ctx = AppContext::open(cfg)?;
            let engine = ctx.engine().await?;

            let view = engine.push(id).await?;
            ctx.store
                .audit("push", id, &format!("Uploaded to {}", engine.gateway().name()))
                .await;
            success(format!(
                "'{}' uploaded ({}), status {}",
                view.task.name,
                format_duration(view.task.duration),
                colorize_status(view.sync_status)
            ));
        }

        Commands::Pull { id, yes } => {
            let ctx = AppContext::open(cfg)?;
            let engine = ctx.engine().await?;

            let confirm: Box<dyn Confirm> = if *yes {
                Box::new(AutoConfirm(true))
            } else {
                Box::new(PromptConfirm)
            };

            match engine.pull(id, confirm.as_ref()).await? {
                PullOutcome::Cancelled => info("Operation cancelled."),
                PullOutcome::Pulled(view) => {
                    ctx.store
                        .audit("pull", id, &format!("Replaced from {}", engine.gateway().name()))
                        .await;
                    success(format!(
                        "'{}' replaced with the server copy ({})",
                        view.task.name,
                        format_duration(view.task.duration)
                    ));
                }
            }
        }

        Commands::Upload { date, all, ids } => {
            let date = session_date(date)?;
            let ctx = AppContext::open(cfg)?;
            let engine = ctx.engine().await?;

            let selected: Vec<String> = if !ids.is_empty() {
                ids.iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
            } else {
                let candidates = engine.upload_candidates(date, today()).await?;
                if candidates.is_empty() {
                    success(format!("Session {} is in sync, nothing to upload.", date));
                    return Ok(());
                }
                if *all {
                    candidates.into_iter().map(|v| v.task.id).collect()
                } else {
                    choose(&candidates)
                }
            };

            if selected.is_empty() {
                info("Nothing selected.");
                return Ok(());
            }

            let report = engine.bulk_upload(&selected).await;
            for id in &report.uploaded {
                ctx.store.audit("upload", id, "Uploaded in bulk").await;
            }
            for (id, reason) in &report.failed {
                error(format!("{}: {}", id, reason));
            }

            if report.is_clean() {
                success(format!("{} task(s) uploaded.", report.uploaded.len()));
            } else {
                warning(format!(
                    "{} uploaded, {} failed.",
                    report.uploaded.len(),
                    report.failed.len()
                ));
            }
        }

        _ => {}
    }

    Ok(())
}

/// Interactive pick from the upload candidates: comma separated
/// positions, `all`, or nothing to cancel.
fn choose(candidates: &[TaskView]) -> Vec<String> {
    header("Tasks to upload");
    for (i, v) in candidates.iter().enumerate() {
        println!(
            "{:>3}. {:<30} {:>10}  {}",
            i + 1,
            v.task.name,
            format_duration(v.task.duration),
            colorize_status(v.sync_status)
        );
    }

    let answer = crate::ui::messages::read_answer("Select (e.g. 1,3 or 'all', empty to cancel): ");
    parse_selection(&answer, candidates.len())
        .into_iter()
        .map(|i| candidates[i].task.id.clone())
        .collect()
}

/// Zero-based positions picked by `answer`; out of range and
/// unparsable entries are ignored.
fn parse_selection(answer: &str, len: usize) -> Vec<usize> {
    let answer = answer.trim();
    if answer.eq_ignore_ascii_case("all") {
        return (0..len).collect();
    }

    let mut picked = Vec::new();
    for part in answer.split(',') {
        if let Ok(n) = part.trim().parse::<usize>()
            && n >= 1
            && n <= len
            && !picked.contains(&(n - 1))
        {
            picked.push(n - 1);
        }
    }
    picked
}
