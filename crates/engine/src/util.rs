//! Helpers for the loosely formatted strings the finance API hands back.
//!
//! These are **not** part of the public API.

use chrono::{NaiveDate, NaiveDateTime};

use crate::period::DATE_FORMAT;

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Calendar date of an API timestamp (`YYYY-MM-DD`, optionally followed by a
/// time separated by a space or `T`).
pub(crate) fn api_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let head = trimmed.get(..10)?;
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

/// Full timestamp of an API value; a bare date is read as midnight.
pub(crate) fn api_date_time(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| api_date(trimmed).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Splits `YYYY-MM-DD HH:MM[:SS]` into its date and `HH:MM` parts.
///
/// A missing time part comes back as `00:00`.
pub(crate) fn split_date_time(value: &str) -> (String, String) {
    let trimmed = value.trim();
    let mut parts = trimmed.splitn(2, [' ', 'T']);
    let date = parts.next().unwrap_or_default().to_string();
    let time = parts
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.get(..5).unwrap_or(t).to_string())
        .unwrap_or_else(|| "00:00".to_string());
    (date, time)
}

/// Case-insensitive substring match; an empty needle matches everything.
pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_date_prefix() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(api_date("2024-03-15"), expected);
        assert_eq!(api_date("2024-03-15 12:30"), expected);
        assert_eq!(api_date("2024-03-15T12:30:00"), expected);
        assert_eq!(api_date("15/03"), None);
    }

    #[test]
    fn date_time_defaults_to_midnight() {
        let midnight = api_date_time("2024-03-15").unwrap();
        assert_eq!(midnight.format("%H:%M").to_string(), "00:00");
        let noon = api_date_time("2024-03-15 12:05").unwrap();
        assert_eq!(noon.format("%H:%M").to_string(), "12:05");
    }

    #[test]
    fn splits_date_and_time() {
        assert_eq!(
            split_date_time("2024-03-15 08:45:10"),
            ("2024-03-15".to_string(), "08:45".to_string())
        );
        assert_eq!(
            split_date_time("2024-03-15"),
            ("2024-03-15".to_string(), "00:00".to_string())
        );
    }
}
