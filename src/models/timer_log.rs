use super::log_event::LogEvent;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One start/stop mark in a task's timing history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerLog {
    pub event: LogEvent,
    /// ISO-8601 timestamp.
    #[serde(deserialize_with = "timestamp_from_any")]
    pub timestamp: String,
    /// Task duration at the moment of the event.
    #[serde(default)]
    pub elapsed_seconds: u64,
}

impl TimerLog {
    pub fn new(event: LogEvent, at: DateTime<Utc>, elapsed_seconds: u64) -> Self {
        Self {
            event,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            elapsed_seconds,
        }
    }

    pub fn start(at: DateTime<Utc>, elapsed_seconds: u64) -> Self {
        Self::new(LogEvent::Start, at, elapsed_seconds)
    }

    pub fn stop(at: DateTime<Utc>, elapsed_seconds: u64) -> Self {
        Self::new(LogEvent::Stop, at, elapsed_seconds)
    }
}

/// Older servers stored the timestamp as epoch milliseconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
}

fn timestamp_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Text(s) => Ok(s),
        RawTimestamp::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {ms}"))),
    }
}
