use crate::models::{SyncStatus, Task};

/// Classify a local task against its server copy.
///
/// Only name, duration and the number of timer logs are compared: logs are
/// append-only, so a count mismatch is enough to flag divergence.
pub fn compare_tasks(local: &Task, server: Option<&Task>) -> SyncStatus {
    let Some(server) = server else {
        return SyncStatus::Missing;
    };

    if local.duration != server.duration
        || local.name != server.name
        || local.timer_logs.len() != server.timer_logs.len()
    {
        SyncStatus::Inconsistent
    } else {
        SyncStatus::Consistent
    }
}
