//! Historical sampling window: the past `WINDOW_DAYS` days at `STEP_HOURS` intervals,
//! as UTC unix timestamps.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

pub const WINDOW_DAYS: u32 = 7;
pub const STEP_HOURS: u32 = 2;

const STEP_SECONDS: i64 = STEP_HOURS as i64 * 3600;

#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Invalid anchor date {input:?}: {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// The date the default window starts on.
pub fn default_anchor(today: NaiveDate) -> NaiveDate {
    today - Duration::days(WINDOW_DAYS as i64)
}

/// Parse a `YYYY-MM-DD` anchor and build the window starting at its midnight.
pub fn generate_window(date_from: &str, days: u32) -> Result<Vec<i64>, WindowError> {
    let anchor = NaiveDate::parse_from_str(date_from, "%Y-%m-%d").map_err(|source| {
        WindowError::InvalidDate {
            input: date_from.to_string(),
            source,
        }
    })?;

    Ok(window_from(anchor, days))
}

pub fn window_from(anchor: NaiveDate, days: u32) -> Vec<i64> {
    let start = anchor.and_time(NaiveTime::MIN).and_utc().timestamp();
    let points = (24 * days / STEP_HOURS) as i64;

    (0..points).map(|i| start + i * STEP_SECONDS).collect()
}

/// The default window for `today`: the `WINDOW_DAYS` days before it.
pub fn window_before(today: NaiveDate) -> Result<Vec<i64>, WindowError> {
    let anchor = default_anchor(today);
    generate_window(&anchor.format("%Y-%m-%d").to_string(), WINDOW_DAYS)
}

pub fn window_for_today() -> Result<Vec<i64>, WindowError> {
    window_before(Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_day_window_has_84_points() {
        let window = generate_window("2024-03-01", 7).unwrap();
        assert_eq!(window.len(), 84);
    }

    #[test]
    fn test_window_steps_are_two_hours() {
        let window = generate_window("2024-03-01", 7).unwrap();
        assert!(window.windows(2).all(|pair| pair[1] - pair[0] == 7200));
    }

    #[test]
    fn test_window_starts_at_anchor_midnight() {
        let window = generate_window("2024-03-01", 7).unwrap();
        // 2024-03-01T00:00:00Z
        assert_eq!(window[0], 1_709_251_200);
        assert_eq!(*window.last().unwrap(), 1_709_251_200 + 83 * 7200);
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        assert!(matches!(
            generate_window("03/01/2024", 7),
            Err(WindowError::InvalidDate { .. })
        ));
        assert!(generate_window("2024-02-30", 7).is_err());
    }

    #[test]
    fn test_zero_days_is_empty() {
        assert!(generate_window("2024-03-01", 0).unwrap().is_empty());
    }

    #[test]
    fn test_window_before_ends_before_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let window = window_before(today).unwrap();
        // 2024-03-08T00:00:00Z
        let today_midnight = 1_709_856_000;

        assert_eq!(window.len(), 84);
        assert_eq!(window[0], today_midnight - 7 * 86_400);
        assert_eq!(*window.last().unwrap(), today_midnight - 7200);
    }

    #[test]
    fn test_window_for_today_has_full_length() {
        assert_eq!(window_for_today().unwrap().len(), 84);
    }

    #[test]
    fn test_default_anchor_is_a_week_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(
            default_anchor(today),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }
}
