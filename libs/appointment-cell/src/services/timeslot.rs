//! Pure clock arithmetic for the scheduling core. Times are wall-clock
//! `HH:MM` strings; dates are plain `YYYY-MM-DD` calendar dates.
//! Appointments never cross midnight, so minute-of-day arithmetic is
//! all the domain needs.

use std::sync::OnceLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Clinic-wide outer bound, distinct from any doctor's weekly window.
const BUSINESS_OPEN_MINUTES: i32 = 7 * 60;
const BUSINESS_CLOSE_MINUTES: i32 = 18 * 60;

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap())
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

/// Strict wire-format check: `HH:MM`, 00-23 hours, 00-59 minutes.
pub fn is_valid_time(s: &str) -> bool {
    time_regex().is_match(s)
}

/// `YYYY-MM-DD`, denoting a real calendar date no earlier than today.
/// "Today" is the current UTC date, so the comparison cannot drift with
/// the server's local timezone.
pub fn is_valid_date(s: &str) -> bool {
    if !date_regex().is_match(s) {
        return false;
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => date >= Utc::now().date_naive(),
        Err(_) => false,
    }
}

/// Minutes since midnight for a stored clock value. Accepts `HH:MM` and
/// the `HH:MM:SS` form the store returns for time columns.
pub fn parse_minutes(s: &str) -> Option<i32> {
    let mut parts = s.split(':');
    let hours: i32 = parts.next()?.parse().ok()?;
    let minutes: i32 = parts.next()?.parse().ok()?;
    if let Some(seconds) = parts.next() {
        let seconds: i32 = seconds.parse().ok()?;
        if !(0..60).contains(&seconds) {
            return None;
        }
    }
    if parts.next().is_some() {
        return None;
    }
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Render minutes-since-midnight back to `HH:MM`, wrapping on the
/// 24-hour clock.
pub fn format_minutes(total: i32) -> String {
    let wrapped = total.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

/// `time + minutes` as a new `HH:MM`, or `None` if `time` is not a
/// clock value.
pub fn add_minutes(time: &str, minutes: i32) -> Option<String> {
    parse_minutes(time).map(|t| format_minutes(t + minutes))
}

/// Start times from 07:00 through 18:00, boundary minute included.
pub fn is_business_hours(time: &str) -> bool {
    match parse_minutes(time) {
        Some(t) => (BUSINESS_OPEN_MINUTES..=BUSINESS_CLOSE_MINUTES).contains(&t),
        None => false,
    }
}

/// Half-open interval overlap on minutes since midnight. Touching
/// endpoints do not overlap.
pub fn overlaps(start_a: i32, end_a: i32, start_b: i32, end_b: i32) -> bool {
    start_a < end_b && start_b < end_a
}

/// String form of [`overlaps`] for `HH:MM` intervals. Inputs are
/// expected to be valid clock times; anything unparseable reports no
/// overlap.
pub fn intervals_overlap(start_a: &str, end_a: &str, start_b: &str, end_b: &str) -> bool {
    match (
        parse_minutes(start_a),
        parse_minutes(end_a),
        parse_minutes(start_b),
        parse_minutes(end_b),
    ) {
        (Some(sa), Some(ea), Some(sb), Some(eb)) => overlaps(sa, ea, sb, eb),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn valid_time_formats() {
        assert!(is_valid_time("00:00"));
        assert!(is_valid_time("09:30"));
        assert!(is_valid_time("23:59"));

        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("12:60"));
        assert!(!is_valid_time("9:30"));
        assert!(!is_valid_time("09:30:00"));
        assert!(!is_valid_time("0930"));
        assert!(!is_valid_time(""));
    }

    #[test]
    fn date_must_not_be_past() {
        let today = Utc::now().date_naive();
        let tomorrow = today + Duration::days(1);
        let yesterday = today - Duration::days(1);

        assert!(is_valid_date(&today.format("%Y-%m-%d").to_string()));
        assert!(is_valid_date(&tomorrow.format("%Y-%m-%d").to_string()));
        assert!(!is_valid_date(&yesterday.format("%Y-%m-%d").to_string()));
    }

    #[test]
    fn date_format_is_strict() {
        assert!(!is_valid_date("2030/01/15"));
        assert!(!is_valid_date("15-01-2030"));
        assert!(!is_valid_date("2030-13-01"));
        assert!(!is_valid_date("2030-02-30"));
        assert!(!is_valid_date("not-a-date"));
    }

    #[test]
    fn parse_accepts_stored_seconds_form() {
        assert_eq!(parse_minutes("08:00"), Some(480));
        assert_eq!(parse_minutes("08:00:00"), Some(480));
        assert_eq!(parse_minutes("17:30:59"), Some(1050));

        assert_eq!(parse_minutes("25:00"), None);
        assert_eq!(parse_minutes("08:61"), None);
        assert_eq!(parse_minutes("08:00:99"), None);
        assert_eq!(parse_minutes("08:00:00:00"), None);
        assert_eq!(parse_minutes("garbage"), None);
    }

    #[test]
    fn add_minutes_wraps_midnight() {
        assert_eq!(add_minutes("09:00", 30).as_deref(), Some("09:30"));
        assert_eq!(add_minutes("09:45", 30).as_deref(), Some("10:15"));
        assert_eq!(add_minutes("23:45", 30).as_deref(), Some("00:15"));
        assert_eq!(add_minutes("not-a-time", 30), None);
    }

    #[test]
    fn business_hours_boundaries_inclusive() {
        assert!(is_business_hours("07:00"));
        assert!(is_business_hours("12:00"));
        assert!(is_business_hours("18:00"));

        assert!(!is_business_hours("06:59"));
        assert!(!is_business_hours("18:01"));
        assert!(!is_business_hours("23:00"));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        assert!(!intervals_overlap("10:00", "10:30", "10:30", "11:00"));
        assert!(!intervals_overlap("10:30", "11:00", "10:00", "10:30"));
    }

    #[test]
    fn overlapping_intervals_detected() {
        assert!(intervals_overlap("10:00", "10:30", "10:15", "10:45"));
        assert!(intervals_overlap("10:15", "10:45", "10:00", "10:30"));
        // Containment in both directions.
        assert!(intervals_overlap("10:00", "11:00", "10:15", "10:30"));
        assert!(intervals_overlap("10:15", "10:30", "10:00", "11:00"));
        // Identical intervals.
        assert!(intervals_overlap("10:00", "10:30", "10:00", "10:30"));
    }
}
