//! Date helpers: session dates (`YYYY-MM-DD`), navigation and epoch millis.

use chrono::{Days, Local, NaiveDate, Utc};

pub const DATE_FMT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FMT).ok()
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

pub fn previous_day(d: NaiveDate) -> NaiveDate {
    d.checked_sub_days(Days::new(1)).unwrap_or(d)
}

pub fn next_day(d: NaiveDate) -> NaiveDate {
    d.checked_add_days(Days::new(1)).unwrap_or(d)
}

/// The last `n` days ending today, most recent first.
pub fn last_days(n: u64) -> Vec<NaiveDate> {
    let today = today();
    (0..n)
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}

/// Epoch millis → local "YYYY-MM-DD HH:MM" for listings.
pub fn format_ms(ms: i64) -> String {
    chrono::DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "--".to_string())
}
