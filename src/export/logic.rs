use crate::core::session::filter_session;
use crate::errors::AppResult;
use crate::export::document::{ExportDocument, TaskExportRow};
use crate::export::fs_utils::{ensure_parent_dir, ensure_writable};
use crate::export::writers::{write_csv, write_json};
use crate::export::{ExportFormat, notify_export_success};
use crate::store::TaskStore;
use crate::ui::messages::warning;
use crate::utils::date::today;
use chrono::NaiveDate;
use std::path::Path;

/// Which tasks an export covers.
#[derive(Debug, Clone, Copy)]
pub enum ExportScope {
    Session(NaiveDate),
    All,
}

/// High level export logic.
pub struct ExportLogic;

impl ExportLogic {
    /// Write the selected tasks to `file`; returns how many were written.
    pub async fn export<S: TaskStore + ?Sized>(
        store: &S,
        format: ExportFormat,
        file: &Path,
        scope: ExportScope,
        force: bool,
    ) -> AppResult<usize> {
        ensure_writable(file, force)?;
        ensure_parent_dir(file)?;

        let all = store.list_all().await?;
        let tasks = match scope {
            ExportScope::Session(date) => filter_session(all, date, today()),
            ExportScope::All => all,
        };

        if tasks.is_empty() {
            warning("No tasks found for the selected scope.");
        }
        let count = tasks.len();

        match format {
            ExportFormat::Json => {
                let doc = match scope {
                    ExportScope::Session(date) => ExportDocument::for_session(date, tasks),
                    ExportScope::All => ExportDocument::full(tasks),
                };
                write_json(&doc, file)?;
                notify_export_success("JSON", file, count);
            }
            ExportFormat::Csv => {
                let rows: Vec<TaskExportRow> = tasks.iter().map(TaskExportRow::from).collect();
                write_csv(&rows, file)?;
                notify_export_success("CSV", file, count);
            }
        }

        Ok(count)
    }
}
