use crate::errors::AppResult;
use crate::export::document::{ExportDocument, TaskExportRow};
use std::fs;
use std::path::Path;

pub(crate) fn write_json(doc: &ExportDocument, path: &Path) -> AppResult<()> {
    let json = serde_json::to_string_pretty(doc)?;
    fs::write(path, json)?;
    Ok(())
}

/// CSV with header row derived from [`TaskExportRow`].
pub(crate) fn write_csv(rows: &[TaskExportRow], path: &Path) -> AppResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
