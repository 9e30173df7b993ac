use chrono::{DateTime, Utc};

/// Short relative age used as a post's display timestamp, e.g. `3h ago`.
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    let secs = (now - then).num_seconds();
    if secs < MINUTE {
        // Also covers timestamps slightly in the future
        return "just now".to_string();
    }

    match secs {
        s if s < HOUR => format!("{}m ago", s / MINUTE),
        s if s < DAY => format!("{}h ago", s / HOUR),
        s if s < 7 * DAY => format!("{}d ago", s / DAY),
        s if s < 30 * DAY => format!("{}w ago", s / (7 * DAY)),
        s if s < 365 * DAY => format!("{}mo ago", s / (30 * DAY)),
        s => format!("{}y ago", s / (365 * DAY)),
    }
}

pub fn from_unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(secs.trunc() as i64, 0)
}

pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Relative age for an optional timestamp, empty when unknown.
pub fn relative_or_empty(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    then.map(|then| format_relative_time(then, now))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        parse_rfc3339("2024-06-01T12:00:00Z").unwrap()
    }

    #[test]
    fn test_relative_buckets() {
        let now = now();
        assert_eq!(format_relative_time(now - Duration::seconds(30), now), "just now");
        assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative_time(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_relative_time(now - Duration::days(2), now), "2d ago");
        assert_eq!(format_relative_time(now - Duration::days(15), now), "2w ago");
        assert_eq!(format_relative_time(now - Duration::days(65), now), "2mo ago");
        assert_eq!(format_relative_time(now - Duration::days(800), now), "2y ago");
    }

    #[test]
    fn test_future_is_just_now() {
        let now = now();
        assert_eq!(format_relative_time(now + Duration::hours(1), now), "just now");
    }

    #[test]
    fn test_unix_seconds() {
        let dt = from_unix_seconds(1_717_243_200.0).unwrap();
        assert_eq!(dt, now());
        assert!(from_unix_seconds(0.0).is_none());
        assert!(from_unix_seconds(f64::NAN).is_none());
    }

    #[test]
    fn test_relative_or_empty() {
        assert_eq!(relative_or_empty(None, now()), "");
        assert_eq!(relative_or_empty(parse_rfc3339("garbage"), now()), "");
    }
}
