//! Ledger date handling.
//!
//! Records carry dates in display form (`DD/MM/YYYY`); ISO (`YYYY-MM-DD`)
//! is accepted on input. Anything else is unparseable: the record is then
//! excluded from date-based computations but still counts in status-only
//! tallies. Weeks start on Sunday.

use chrono::{Datelike, Duration, NaiveDate};

/// Weekday labels indexed by [`weekday_index`] (Sunday first).
pub const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Parse a record date in either accepted form.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

/// Render a date in the ledger's display form.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Re-render a raw date string in display form.
///
/// ISO input is converted, display input passes through, anything else
/// becomes the empty string (the caller decides whether that is an error).
pub fn display_date(value: &str) -> String {
    match parse_date(value) {
        Some(date) => format_date(date),
        None => String::new(),
    }
}

/// First day (Sunday) of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 is valid for every month")
}

/// First day of the year containing `date`.
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("jan 1 is valid for every year")
}

/// Weekday index with Sunday = 0 (the ranking dimension key).
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Human label for a date's weekday.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[weekday_index(date) as usize]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // -- parsing tests --

    #[test]
    fn test_parse_display_form() {
        assert_eq!(parse_date("15/03/2026"), Some(d(2026, 3, 15)));
    }

    #[test]
    fn test_parse_iso_form() {
        assert_eq!(parse_date("2026-03-15"), Some(d(2026, 3, 15)));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_date("  01/01/2026 "), Some(d(2026, 1, 1)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2026/03/15"), None);
        assert_eq!(parse_date("32/01/2026"), None);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2026-03-15"), "15/03/2026");
        assert_eq!(display_date("15/03/2026"), "15/03/2026");
        assert_eq!(display_date("not a date"), "");
    }

    #[test]
    fn test_format_roundtrip() {
        let date = d(2026, 12, 3);
        assert_eq!(parse_date(&format_date(date)), Some(date));
    }

    // -- calendar boundary tests --

    #[test]
    fn test_week_starts_sunday() {
        // 2026-03-15 is a Sunday.
        assert_eq!(week_start(d(2026, 3, 15)), d(2026, 3, 15));
        assert_eq!(week_start(d(2026, 3, 16)), d(2026, 3, 15)); // Monday
        assert_eq!(week_start(d(2026, 3, 21)), d(2026, 3, 15)); // Saturday
    }

    #[test]
    fn test_week_start_crosses_month() {
        // 2026-04-01 is a Wednesday; its week starts 2026-03-29.
        assert_eq!(week_start(d(2026, 4, 1)), d(2026, 3, 29));
    }

    #[test]
    fn test_month_and_year_start() {
        assert_eq!(month_start(d(2026, 3, 15)), d(2026, 3, 1));
        assert_eq!(year_start(d(2026, 3, 15)), d(2026, 1, 1));
    }

    #[test]
    fn test_weekday_index_sunday_zero() {
        assert_eq!(weekday_index(d(2026, 3, 15)), 0); // Sunday
        assert_eq!(weekday_index(d(2026, 3, 16)), 1); // Monday
        assert_eq!(weekday_index(d(2026, 3, 21)), 6); // Saturday
        assert_eq!(weekday_name(d(2026, 3, 15)), "sunday");
    }
}
