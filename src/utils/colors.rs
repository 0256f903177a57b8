/// ANSI color helper utilities for terminal output.
use crate::models::SyncStatus;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

/// consistent → green, inconsistent → yellow, missing → red
pub fn color_for_status(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Consistent => GREEN,
        SyncStatus::Inconsistent => YELLOW,
        SyncStatus::Missing => RED,
    }
}

/// Grey out zero durations so tracked work stands out.
pub fn colorize_duration(value: &str, secs: u64) -> String {
    if secs == 0 {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

pub fn colorize_status(status: SyncStatus) -> String {
    let icon = match status {
        SyncStatus::Consistent => "✔",
        SyncStatus::Inconsistent => "≠",
        SyncStatus::Missing => "✘",
    };
    format!("{}{} {}{}", color_for_status(status), icon, status, RESET)
}

/// Operation colors for the audit log listing.
pub fn color_for_operation(op: &str) -> &'static str {
    match op {
        "add" | "import" => GREEN,
        "del" => RED,
        "edit" | "rename" => YELLOW,
        "push" | "pull" | "upload" => CYAN,
        "start" | "stop" => BLUE,
        "init" => MAGENTA,
        _ => RESET,
    }
}
