//! Export / import of task lists (JSON document and CSV).

mod document;
mod fs_utils;
mod import;
pub mod logic;
mod writers;

pub use document::{EXPORT_VERSION, ExportDocument, TaskExportRow};
pub use import::{ImportReport, import_document, parse_document};
pub use logic::{ExportLogic, ExportScope};

use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;

pub(crate) fn notify_export_success(label: &str, path: &Path, count: usize) {
    success(format!("{label} export completed: {} ({count} task(s))", path.display()));
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}
