use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};

use crate::errors::AppError;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO-8601 timestamp into UTC.
///
/// Accepts a `Z` suffix or an explicit offset. Timestamps without any zone are taken as UTC.
/// Years are limited to four digits so stored values order correctly as text.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    let parsed = match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(_) => NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| AppError::BadRequest(format!("Invalid date format: {}", value)))?,
    };

    if !(0..=9999).contains(&parsed.year()) {
        return Err(AppError::BadRequest(format!("Year out of range: {}", value)));
    }
    Ok(parsed)
}

/// Whole seconds from `start` to `end`, rounded toward negative infinity.
pub fn duration_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let delta = end - start;
    let seconds = delta.num_seconds();
    if delta < Duration::seconds(seconds) {
        seconds - 1
    } else {
        seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn zulu_and_naive_forms_agree() {
        let zulu = parse_timestamp("2024-01-01T10:00:00Z").unwrap();
        let naive = parse_timestamp("2024-01-01T10:00:00").unwrap();
        assert_eq!(zulu, naive);
        assert_eq!(zulu, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let parsed = parse_timestamp("2024-01-01T19:00:00+09:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn fractional_seconds_are_accepted() {
        let parsed = parse_timestamp("2024-01-01T10:00:00.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn garbage_is_a_bad_request() {
        assert!(matches!(parse_timestamp("yesterday"), Err(AppError::BadRequest(_))));
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn five_digit_years_are_rejected() {
        assert!(matches!(parse_timestamp("+10000-01-01T10:00:00"), Err(AppError::BadRequest(_))));
        assert!(parse_timestamp("+10000-01-01T10:00:00Z").is_err());
        assert!(parse_timestamp("9999-12-31T23:59:59Z").is_ok());
    }

    #[test]
    fn duration_is_floored() {
        let start = parse_timestamp("2024-01-01T10:00:00Z").unwrap();
        let end = parse_timestamp("2024-01-01T10:30:00.900Z").unwrap();
        assert_eq!(duration_seconds(start, end), 1800);

        let backwards = parse_timestamp("2024-01-01T09:59:59.500Z").unwrap();
        assert_eq!(duration_seconds(start, backwards), -1);
        assert_eq!(duration_seconds(start, start), 0);
    }
}
