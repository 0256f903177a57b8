use serde::{Deserialize, Serialize};

/// Kind of entry in a task's timer log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogEvent {
    Start,
    Stop,
}
