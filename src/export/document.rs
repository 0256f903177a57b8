use crate::models::Task;
use crate::utils::date::{format_date, format_ms};
use crate::utils::time::format_duration;
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const EXPORT_VERSION: u32 = 1;

/// File format shared by export and import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_date: Option<NaiveDate>,
    /// `"full"` when every session was exported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_type: Option<String>,
    pub exported_at: String,
    pub tasks: Vec<Task>,
}

impl ExportDocument {
    pub fn for_session(date: NaiveDate, tasks: Vec<Task>) -> Self {
        Self {
            version: EXPORT_VERSION,
            session_date: Some(date),
            export_type: None,
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            tasks,
        }
    }

    pub fn full(tasks: Vec<Task>) -> Self {
        Self {
            version: EXPORT_VERSION,
            session_date: None,
            export_type: Some("full".to_string()),
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            tasks,
        }
    }
}

/// Flat CSV row, one per root task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskExportRow {
    pub id: String,
    pub name: String,
    pub session_date: String,
    pub duration_secs: u64,
    pub duration: String,
    pub total_with_subtasks: String,
    pub subtasks: usize,
    pub timer_logs: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Task> for TaskExportRow {
    fn from(t: &Task) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            session_date: t.session_date.as_ref().map(format_date).unwrap_or_default(),
            duration_secs: t.duration,
            duration: format_duration(t.duration),
            total_with_subtasks: format_duration(t.total_duration()),
            subtasks: t.node_count() - 1,
            timer_logs: t.timer_logs.len(),
            created_at: format_ms(t.created_at),
            updated_at: format_ms(t.updated_at),
        }
    }
}
