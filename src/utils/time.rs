//! Duration utilities: parsing user time strings and formatting seconds.

use crate::errors::{AppError, AppResult};

/// Parse a duration typed by the user into seconds.
///
/// Accepted forms: `SS`, `MM:SS`, `H:MM:SS`. Components are not range
/// checked, so `00:90:00` is ninety minutes (normalized to 1h 30m).
pub fn parse_duration(input: &str) -> AppResult<u64> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AppError::InvalidTime(input.to_string()));
    }

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() > 3 {
        return Err(AppError::InvalidTime(input.to_string()));
    }

    let mut values = Vec::with_capacity(parts.len());
    for p in &parts {
        let p = p.trim();
        if p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::InvalidTime(input.to_string()));
        }
        let v: u64 = p
            .parse()
            .map_err(|_| AppError::InvalidTime(input.to_string()))?;
        values.push(v);
    }

    let (h, m, sec) = match values.as_slice() {
        [sec] => (0, 0, *sec),
        [m, sec] => (0, *m, *sec),
        [h, m, sec] => (*h, *m, *sec),
        _ => return Err(AppError::InvalidTime(input.to_string())),
    };

    h.checked_mul(3600)
        .and_then(|hs| m.checked_mul(60).and_then(|ms| hs.checked_add(ms)))
        .and_then(|t| t.checked_add(sec))
        // stored as SQLite INTEGER
        .filter(|t| i64::try_from(*t).is_ok())
        .ok_or_else(|| AppError::InvalidTime(input.to_string()))
}

/// Seconds → `HH:MM:SS` (hours are not wrapped at 24).
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Seconds → short human form, e.g. `1h 05m` or `42s`.
pub fn secs2readable(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    if h > 0 {
        format!("{}h {:02}m", h, m)
    } else if m > 0 {
        format!("{}m {:02}s", m, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
