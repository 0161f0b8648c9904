//! Shared utility functions

use chrono::{DateTime, SecondsFormat, Utc};

/// Parse a datetime string (RFC3339 format) or return current time
///
/// Used for informational columns such as `created_at`. Columns that take
/// part in authorization decisions go through [`parse_datetime`] instead.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    parse_datetime(s).unwrap_or_else(Utc::now)
}

/// Parse a datetime string (RFC3339 format)
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Format a timestamp for storage
///
/// Always UTC with millisecond precision and a `Z` suffix, so stored values
/// are fixed width and compare lexicographically in SQL.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_parse_datetime_or_now() {
        let valid_time = "2024-01-01T12:00:00Z";
        let parsed = parse_datetime_or_now(valid_time);
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        // Invalid time should return current time (just check it doesn't panic)
        let now_before = Utc::now();
        let parsed = parse_datetime_or_now("invalid");
        let now_after = Utc::now();
        assert!(parsed >= now_before && parsed <= now_after);
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("not-a-date").is_none());
        assert!(parse_datetime("").is_none());
    }

    #[test]
    fn test_format_timestamp_orders_lexicographically() {
        let base = Utc.with_ymd_and_hms(2026, 1, 9, 23, 59, 59).unwrap();
        let earlier = format_timestamp(&base);
        let later = format_timestamp(&(base + Duration::milliseconds(1)));

        assert_eq!(earlier, "2026-01-09T23:59:59.000Z");
        assert_eq!(earlier.len(), later.len());
        assert!(earlier < later);
        assert_eq!(parse_datetime(&earlier), Some(base));
    }
}
