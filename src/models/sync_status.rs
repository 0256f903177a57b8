use super::task::Task;
use serde::Serialize;
use std::fmt;

/// Relationship between a local task and its server copy.
/// Always recomputed, never stored.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Consistent,
    Inconsistent,
    Missing,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Consistent => "consistent",
            SyncStatus::Inconsistent => "inconsistent",
            SyncStatus::Missing => "missing",
        }
    }

    /// Tasks offered by the bulk upload.
    pub fn needs_upload(&self) -> bool {
        !matches!(self, SyncStatus::Consistent)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as shown for a session: record plus its computed status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub sync_status: SyncStatus,
}
