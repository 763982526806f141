//! # Temporal Helpers
//!
//! All instants are UTC. Vendor document-expiration dates arrive as strings
//! from onboarding forms and imports, so parsing is lenient about format but
//! strict about meaning: anything that cannot be read as an instant is an
//! error, never a guess.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ValidationError;

/// Milliseconds in one day.
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Parse an instant from RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// (read as UTC), or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidTimestamp {
            value: value.to_string(),
            reason: "empty".to_string(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(ValidationError::InvalidTimestamp {
        value: value.to_string(),
        reason: "expected RFC 3339 or YYYY-MM-DD".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_instant("2026-03-01T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn parses_bare_date_as_midnight_utc() {
        let dt = parse_instant("2026-03-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_datetime_as_utc() {
        let dt = parse_instant("2026-03-01T08:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_instant("next tuesday").is_err());
        assert!(parse_instant("").is_err());
        assert!(parse_instant("2026-13-45").is_err());
    }
}
