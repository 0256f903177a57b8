use crate::cli::context::{AppContext, session_date};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::{ExportLogic, ExportScope, import_document};
use crate::ui::messages::{success, warning};
use crate::utils::path::expand_tilde;
use std::fs;

/// Handle `export` and `import`.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Export {
            format,
            file,
            date,
            all,
            force,
        } => {
            let scope = if *all {
                ExportScope::All
            } else {
                ExportScope::Session(session_date(date)?)
            };
            let path = expand_tilde(file);
            let ctx = AppContext::open(cfg)?;

            let count = ExportLogic::export(ctx.store.as_ref(), *format, &path, scope, *force).await?;
            ctx.store
                .audit(
                    "export",
                    &path.display().to_string(),
                    &format!("{} task(s) as {}", count, format.as_str()),
                )
                .await;
        }

        Commands::Import { file } => {
            let path = expand_tilde(file);
            let content = fs::read_to_string(&path)?;
            let ctx = AppContext::open(cfg)?;

            let report = import_document(ctx.store.as_ref(), &content).await?;
            ctx.store
                .audit(
                    "import",
                    &path.display().to_string(),
                    &format!(
                        "{} inserted, {} updated, {} skipped",
                        report.inserted, report.updated, report.skipped
                    ),
                )
                .await;

            success(format!(
                "Import done: {} inserted, {} updated.",
                report.inserted, report.updated
            ));
            if report.skipped > 0 {
                warning(format!("{} invalid entries were skipped.", report.skipped));
            }
        }

        _ => {}
    }

    Ok(())
}
